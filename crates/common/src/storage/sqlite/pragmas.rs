//! SQLite pragma management
//!
//! Applied once to every connection the pool opens.

use rusqlite::Connection;

use super::config::SqlitePoolConfig;
use crate::storage::error::{StorageError, StorageResult};

/// Apply connection-level pragmas
///
/// - WAL journal with automatic checkpointing (when enabled)
/// - NORMAL synchronous mode
/// - foreign key enforcement switched explicitly on or off
/// - busy timeout for lock contention
pub fn apply_connection_pragmas(conn: &Connection, config: &SqlitePoolConfig) -> StorageResult<()> {
    let mut pragma_sql = String::new();

    if config.enable_wal {
        pragma_sql.push_str("PRAGMA journal_mode=WAL;\n");
        pragma_sql.push_str("PRAGMA wal_autocheckpoint=1000;\n");
    }

    pragma_sql.push_str("PRAGMA synchronous=NORMAL;\n");

    // The bundled SQLite defaults foreign keys to on
    if config.enable_foreign_keys {
        pragma_sql.push_str("PRAGMA foreign_keys=ON;\n");
    } else {
        pragma_sql.push_str("PRAGMA foreign_keys=OFF;\n");
    }

    conn.execute_batch(&pragma_sql)
        .map_err(|e| StorageError::Query(format!("Failed to apply pragmas: {e}")))?;

    conn.busy_timeout(config.busy_timeout)
        .map_err(|e| StorageError::Query(format!("Failed to set busy timeout: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = Connection::open_in_memory().unwrap();
        let config = SqlitePoolConfig { enable_wal: false, ..SqlitePoolConfig::default() };
        apply_connection_pragmas(&conn, &config).unwrap();

        let fk: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_foreign_keys_can_be_disabled() {
        let conn = Connection::open_in_memory().unwrap();
        let config = SqlitePoolConfig {
            enable_wal: false,
            enable_foreign_keys: false,
            ..SqlitePoolConfig::default()
        };
        apply_connection_pragmas(&conn, &config).unwrap();

        let fk: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
        assert_eq!(fk, 0);
    }
}
