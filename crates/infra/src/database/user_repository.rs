//! User repository implementation using SQLite

use std::sync::Arc;

use async_trait::async_trait;
use fyxed_common::storage::error::StorageError;
use fyxed_core::UserRepository as UserRepositoryPort;
use fyxed_domain::{Result as DomainResult, User, UserRole};
use rusqlite::{params, Row, ToSql};
use tokio::task;
use tracing::debug;

use super::columns::parse_text;
use super::manager::DbManager;
use crate::errors::{map_join_error, map_storage_error};

const USER_COLUMNS: &str = "id, name, role, sponsor_id";

/// SQLite-backed implementation of `UserRepository`
///
/// Users are listed in insertion order; upserts keep a user's original
/// position.
pub struct SqliteUserRepository {
    db: Arc<DbManager>,
}

impl SqliteUserRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepositoryPort for SqliteUserRepository {
    async fn list_users(&self) -> DomainResult<Vec<User>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<User>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY rowid"))
                .map_err(map_storage_error)?;
            stmt.query_map(&[], map_user_row).map_err(map_storage_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_user(&self, id: &str) -> DomainResult<Option<User>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<User>> {
            let conn = db.get_connection()?;
            let result = conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![&id],
                map_user_row,
            );

            match result {
                Ok(user) => Ok(Some(user)),
                Err(StorageError::Rusqlite(rusqlite::Error::QueryReturnedNoRows)) => Ok(None),
                Err(err) => Err(map_storage_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn upsert_users(&self, users: Vec<User>) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<usize> {
            let mut conn = db.get_connection()?;
            let roles: Vec<String> = users.iter().map(|user| user.role.to_string()).collect();

            let tx = conn.transaction().map_err(map_storage_error)?;
            let written = tx
                .execute_many(
                    "INSERT INTO users (id, name, role, sponsor_id) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        role = excluded.role,
                        sponsor_id = excluded.sponsor_id",
                    users.iter().zip(&roles).map(|(user, role)| {
                        vec![&user.id as &dyn ToSql, &user.name, role, &user.sponsor_id]
                    }),
                )
                .map_err(map_storage_error)?;
            tx.commit().map_err(map_storage_error)?;

            debug!(users = written, "Users upserted");
            Ok(written)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(2)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        role: parse_text::<UserRole>(2, &role)?,
        sponsor_id: row.get(3)?,
    })
}
