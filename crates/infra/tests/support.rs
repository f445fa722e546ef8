#![allow(dead_code)]

use std::sync::Arc;

use fyxed_common::testing::TempDir;
use fyxed_infra::database::{
    DbManager, SqliteSaleRepository, SqliteSettingsRepository, SqliteUserRepository,
};

/// Temporary migrated database that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new("infra-test").expect("temp dir should be created");
        let db_path = temp_dir.path().join("ledger.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn users(&self) -> SqliteUserRepository {
        SqliteUserRepository::new(Arc::clone(&self.manager))
    }

    pub fn sales(&self) -> SqliteSaleRepository {
        SqliteSaleRepository::new(Arc::clone(&self.manager))
    }

    pub fn settings(&self) -> SqliteSettingsRepository {
        SqliteSettingsRepository::new(Arc::clone(&self.manager))
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}
