//! Commission settings repository using SQLite

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use fyxed_common::storage::error::StorageError;
use fyxed_core::SettingsRepository as SettingsRepositoryPort;
use fyxed_domain::{BasisPoints, CommissionRates, Result as DomainResult};
use rusqlite::params;
use tokio::task;

use super::columns::format_timestamp;
use super::manager::DbManager;
use crate::errors::{map_join_error, map_storage_error};

/// Single-row store for the commission rates in effect
pub struct SqliteSettingsRepository {
    db: Arc<DbManager>,
}

impl SqliteSettingsRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepositoryPort for SqliteSettingsRepository {
    async fn load_rates(&self) -> DomainResult<Option<CommissionRates>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<CommissionRates>> {
            let conn = db.get_connection()?;
            let result = conn.query_row(
                "SELECT seller_bps, leader_bps, sponsor_bps, fyxed_bps
                 FROM commission_settings WHERE id = 1",
                params![],
                |row| {
                    Ok(CommissionRates::new(
                        BasisPoints::new(row.get(0)?),
                        BasisPoints::new(row.get(1)?),
                        BasisPoints::new(row.get(2)?),
                        BasisPoints::new(row.get(3)?),
                    ))
                },
            );

            match result {
                Ok(rates) => Ok(Some(rates)),
                Err(StorageError::Rusqlite(rusqlite::Error::QueryReturnedNoRows)) => Ok(None),
                Err(err) => Err(map_storage_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save_rates(&self, rates: CommissionRates) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO commission_settings
                    (id, seller_bps, leader_bps, sponsor_bps, fyxed_bps, updated_at)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    seller_bps = excluded.seller_bps,
                    leader_bps = excluded.leader_bps,
                    sponsor_bps = excluded.sponsor_bps,
                    fyxed_bps = excluded.fyxed_bps,
                    updated_at = excluded.updated_at",
                params![
                    rates.seller.value(),
                    rates.leader.value(),
                    rates.sponsor.value(),
                    rates.fyxed.value(),
                    format_timestamp(&Utc::now()),
                ],
            )
            .map_err(map_storage_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}
