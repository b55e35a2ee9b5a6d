use rusqlite::Connection;

pub const SCHEMA_VERSION: i32 = 1;

/// Migration v1: key-value table
const V1: &str = "
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
);
";

pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    tracing::info!("Database schema version: {} (target: {})", current_version, SCHEMA_VERSION);

    if current_version < 1i32 {
        tracing::info!("Running migration v1: key-value table");
        conn.execute_batch(V1)?;
    }

    if current_version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    Ok(())
}
