//! Sale repository implementation using SQLite

use std::sync::Arc;

use async_trait::async_trait;
use fyxed_common::storage::error::StorageError;
use fyxed_common::storage::Transaction;
use fyxed_core::{ComputedUpdate, SaleRepository as SaleRepositoryPort};
use fyxed_domain::{
    ComputedShares, FyxedError, Money, Result as DomainResult, Sale, SaleFilter, SaleStatus,
};
use rusqlite::types::Value;
use rusqlite::{params, Row, ToSql};
use tokio::task;
use tracing::{debug, info};

use super::columns::{format_timestamp, parse_text, parse_timestamp};
use super::manager::DbManager;
use crate::errors::{map_join_error, map_storage_error};

const SALE_COLUMNS: &str = "id, seller_id, amount, currency, status, created_at,
     seller_share, leader_id, leader_share, sponsor_id, sponsor_share, fyxed_share";

/// SQLite-backed implementation of `SaleRepository`
///
/// Multi-row writes run in one transaction and roll back on the first
/// failing row.
pub struct SqliteSaleRepository {
    db: Arc<DbManager>,
}

impl SqliteSaleRepository {
    /// Repository over the shared pool
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SaleRepositoryPort for SqliteSaleRepository {
    async fn list_sales(&self, filter: &SaleFilter) -> DomainResult<Vec<Sale>> {
        let db = Arc::clone(&self.db);
        let (sql, values) = build_list_query(filter);

        task::spawn_blocking(move || -> DomainResult<Vec<Sale>> {
            let conn = db.get_connection()?;
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();
            let mut stmt = conn.prepare(&sql).map_err(map_storage_error)?;
            stmt.query_map(&params, map_sale_row).map_err(map_storage_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_sale(&self, id: &str) -> DomainResult<Option<Sale>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<Sale>> {
            let conn = db.get_connection()?;
            let result = conn.query_row(
                &format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"),
                params![&id],
                map_sale_row,
            );

            match result {
                Ok(sale) => Ok(Some(sale)),
                Err(StorageError::Rusqlite(rusqlite::Error::QueryReturnedNoRows)) => Ok(None),
                Err(err) => Err(map_storage_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert_sales(&self, sales: Vec<Sale>) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<usize> {
            let mut conn = db.get_connection()?;
            let rows: Vec<Vec<Value>> = sales.iter().map(sale_values).collect();

            let tx = conn.transaction().map_err(map_storage_error)?;
            let inserted = tx
                .execute_many(
                    &format!(
                        "INSERT INTO sales ({SALE_COLUMNS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                    ),
                    rows.iter().map(|row| row.iter().map(|v| v as &dyn ToSql).collect()),
                )
                .map_err(map_storage_error)?;
            tx.commit().map_err(map_storage_error)?;

            debug!(sales = inserted, "Sales inserted");
            Ok(inserted)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_status(&self, id: &str, from: SaleStatus, to: SaleStatus) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_storage_error)?;

            let updated = tx
                .execute(
                    "UPDATE sales SET status = ?1 WHERE id = ?2 AND status = ?3",
                    params![to.to_string(), &id, from.to_string()],
                )
                .map_err(map_storage_error)?;
            if updated == 0 {
                return Err(match current_status(&tx, &id)? {
                    Some(status) => FyxedError::InvalidTransition { from: status, to: to.to_string() },
                    None => FyxedError::NotFound(format!("sale '{id}'")),
                });
            }

            tx.commit().map_err(map_storage_error)?;
            info!(sale_id = %id, from = %from, to = %to, "Sale status updated");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn apply_computed(&self, updates: Vec<ComputedUpdate>) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<usize> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_storage_error)?;

            for update in &updates {
                let shares = &update.computed;
                let updated = tx
                    .execute(
                        "UPDATE sales SET
                            seller_share = ?1, leader_id = ?2, leader_share = ?3,
                            sponsor_id = ?4, sponsor_share = ?5, fyxed_share = ?6
                         WHERE id = ?7",
                        params![
                            shares.seller_share.minor_units(),
                            &shares.leader_id,
                            shares.leader_share.minor_units(),
                            &shares.sponsor_id,
                            shares.sponsor_share.minor_units(),
                            shares.fyxed_share.minor_units(),
                            &update.sale_id,
                        ],
                    )
                    .map_err(map_storage_error)?;
                if updated == 0 {
                    return Err(FyxedError::NotFound(format!("sale '{}'", update.sale_id)));
                }
            }

            tx.commit().map_err(map_storage_error)?;
            Ok(updates.len())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_paid(&self, sale_ids: &[String]) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);
        let sale_ids = sale_ids.to_vec();

        task::spawn_blocking(move || -> DomainResult<usize> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_storage_error)?;
            let (approved, paid) = (SaleStatus::Approved.to_string(), SaleStatus::Paid.to_string());

            for id in &sale_ids {
                let updated = tx
                    .execute(
                        "UPDATE sales SET status = ?1 WHERE id = ?2 AND status = ?3",
                        params![&paid, id, &approved],
                    )
                    .map_err(map_storage_error)?;
                if updated == 0 {
                    return Err(match current_status(&tx, id)? {
                        Some(status) => FyxedError::InvalidTransition { from: status, to: paid },
                        None => FyxedError::NotFound(format!("sale '{id}'")),
                    });
                }
            }

            tx.commit().map_err(map_storage_error)?;
            Ok(sale_ids.len())
        })
        .await
        .map_err(map_join_error)?
    }
}

/// SQL and text parameters for a filtered listing
fn build_list_query(filter: &SaleFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    if let Some(from) = &filter.from {
        values.push(format_timestamp(from));
        clauses.push(format!("created_at >= ?{}", values.len()));
    }
    if let Some(to) = &filter.to {
        values.push(format_timestamp(to));
        clauses.push(format!("created_at < ?{}", values.len()));
    }
    if !filter.statuses.is_empty() {
        let mut placeholders = Vec::with_capacity(filter.statuses.len());
        for status in &filter.statuses {
            values.push(status.to_string());
            placeholders.push(format!("?{}", values.len()));
        }
        clauses.push(format!("status IN ({})", placeholders.join(", ")));
    }

    let mut sql = format!("SELECT {SALE_COLUMNS} FROM sales");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at, id");
    (sql, values)
}

fn current_status(tx: &Transaction<'_>, id: &str) -> DomainResult<Option<String>> {
    match tx.query_row("SELECT status FROM sales WHERE id = ?1", params![id], |row| row.get(0)) {
        Ok(status) => Ok(Some(status)),
        Err(StorageError::Rusqlite(rusqlite::Error::QueryReturnedNoRows)) => Ok(None),
        Err(err) => Err(map_storage_error(err)),
    }
}

fn sale_values(sale: &Sale) -> Vec<Value> {
    let computed = sale.computed.as_ref();
    let share = |pick: fn(&ComputedShares) -> Money| {
        computed.map_or(Value::Null, |c| Value::Integer(pick(c).minor_units()))
    };
    let party = |pick: fn(&ComputedShares) -> &Option<String>| {
        computed.and_then(|c| pick(c).clone()).map_or(Value::Null, Value::Text)
    };

    vec![
        Value::Text(sale.id.clone()),
        Value::Text(sale.seller_id.clone()),
        Value::Integer(sale.amount.minor_units()),
        Value::Text(sale.currency.clone()),
        Value::Text(sale.status.to_string()),
        Value::Text(format_timestamp(&sale.created_at)),
        share(|c| c.seller_share),
        party(|c| &c.leader_id),
        share(|c| c.leader_share),
        party(|c| &c.sponsor_id),
        share(|c| c.sponsor_share),
        share(|c| c.fyxed_share),
    ]
}

fn map_sale_row(row: &Row<'_>) -> rusqlite::Result<Sale> {
    let status: String = row.get(4)?;
    let created_at: String = row.get(5)?;

    let computed = match row.get::<_, Option<i64>>(6)? {
        Some(seller_share) => Some(ComputedShares {
            seller_share: Money::from_minor(seller_share),
            leader_id: row.get(7)?,
            leader_share: Money::from_minor(row.get(8)?),
            sponsor_id: row.get(9)?,
            sponsor_share: Money::from_minor(row.get(10)?),
            fyxed_share: Money::from_minor(row.get(11)?),
        }),
        None => None,
    };

    Ok(Sale {
        id: row.get(0)?,
        seller_id: row.get(1)?,
        amount: Money::from_minor(row.get(2)?),
        currency: row.get(3)?,
        status: parse_text(4, &status)?,
        created_at: parse_timestamp(5, &created_at)?,
        computed,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn unfiltered_listing_has_no_where_clause() {
        let (sql, values) = build_list_query(&SaleFilter::default());
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with("ORDER BY created_at, id"));
        assert!(values.is_empty());
    }

    #[test]
    fn placeholders_are_numbered_in_parameter_order() {
        let filter = SaleFilter {
            from: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            to: None,
            statuses: vec![SaleStatus::Open, SaleStatus::Approved],
        };

        let (sql, values) = build_list_query(&filter);
        assert!(sql.contains("created_at >= ?1 AND status IN (?2, ?3)"));
        assert_eq!(values[1..], ["open".to_string(), "approved".to_string()]);
    }
}
