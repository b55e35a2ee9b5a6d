//! `SQLite`-backed key-value table, the same shape mobile async storage uses.
//!
//! Methods are synchronous over an r2d2 pool; the async trait impl moves them
//! onto the blocking pool.

use std::path::Path;

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension as _, params};
use wildlog_core::env_parse_with_default;

use crate::error::{Result, StorageError};
use crate::migrations;
use crate::traits::KeyValueStore;

type PooledConn = PooledConnection<SqliteConnectionManager>;

#[derive(Clone, Debug)]
pub struct SqliteKvStore {
    pool: Pool<SqliteConnectionManager>,
}

fn init_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA busy_timeout = 5000;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}

fn db_pool_size() -> u32 {
    env_parse_with_default("WILDLOG_DB_POOL_SIZE", 4_u32).max(1)
}

/// Run a blocking closure on the tokio blocking pool.
async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Task(format!("spawn_blocking join error: {e}")))?
}

impl SqliteKvStore {
    /// Open the database file, creating the schema on first use.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or migrations fail.
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::io(format!("creating {}", parent.display()), e))?;
        }
        let manager = SqliteConnectionManager::file(db_path).with_init(init_connection);

        let pool_size = db_pool_size();
        let pool = Pool::builder().max_size(pool_size).build(manager)?;

        let conn = pool.get()?;
        migrations::run_migrations(&conn)
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        drop(conn);

        tracing::info!(pool_size, path = %db_path.display(), "SQLite key-value store initialized");
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConn> {
        Ok(self.pool.get()?)
    }

    /// # Errors
    /// Returns error if the query fails.
    pub fn get_item_blocking(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// # Errors
    /// Returns error if the upsert fails.
    pub fn set_item_blocking(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
               VALUES (?1, ?2, CAST(strftime('%s', 'now') AS INTEGER) * 1000)
               ON CONFLICT(key) DO UPDATE
                 SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    /// # Errors
    /// Returns error if the delete fails.
    pub fn remove_item_blocking(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let s = self.clone();
        let key = key.to_owned();
        blocking(move || s.get_item_blocking(&key)).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let s = self.clone();
        let key = key.to_owned();
        let value = value.to_owned();
        blocking(move || s.set_item_blocking(&key, &value)).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let s = self.clone();
        let key = key.to_owned();
        blocking(move || s.remove_item_blocking(&key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteKvStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteKvStore::new(&temp_dir.path().join("test.db")).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn upsert_replaces_value() {
        let (store, _temp_dir) = create_test_store();
        assert_eq!(store.get_item_blocking("@k").unwrap(), None);
        store.set_item_blocking("@k", "[]").unwrap();
        store.set_item_blocking("@k", "[{}]").unwrap();
        assert_eq!(store.get_item_blocking("@k").unwrap().as_deref(), Some("[{}]"));
        store.remove_item_blocking("@k").unwrap();
        assert_eq!(store.get_item_blocking("@k").unwrap(), None);
    }

    #[tokio::test]
    async fn async_calls_reach_same_table() {
        let (store, temp_dir) = create_test_store();
        store.set_item("@observations_v1", "[1]").await.unwrap();
        drop(store);

        let reopened = SqliteKvStore::new(&temp_dir.path().join("test.db")).unwrap();
        assert_eq!(reopened.get_item("@observations_v1").await.unwrap().as_deref(), Some("[1]"));
    }
}
