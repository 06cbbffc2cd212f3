use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Check if the `log` table has an index on `operation`.
fn log_operation_index_exists(conn: &Connection) -> Result<bool> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='index' AND name='idx_log_operation'",
    )?;
    let exists: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Bring the schema up to date; run on every `DbPool::open`.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    // 1) log table
    ensure_log_table(conn)?;

    // 2) lookups by operation (log --print filters, stats)
    if !log_operation_index_exists(conn)? {
        conn.execute_batch("CREATE INDEX idx_log_operation ON log(operation);")?;
    }

    Ok(())
}
