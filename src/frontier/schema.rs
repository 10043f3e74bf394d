//! Frontier schema definitions
//!
//! Three fixed-name collections make up the frontier. The pending list and the
//! pending dedup set are only ever written together, inside one transaction.

/// SQL schema for the frontier database
pub const SCHEMA_SQL: &str = r#"
-- Pending URLs in discovery order; raw form plus its dedup key
CREATE TABLE IF NOT EXISTS queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    normalized TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_queue_normalized ON queue(normalized);

-- Dedup index over pending URLs
CREATE TABLE IF NOT EXISTS queue_set (
    url TEXT PRIMARY KEY
);

-- Terminal set of crawled URLs
CREATE TABLE IF NOT EXISTS crawled (
    url TEXT PRIMARY KEY
);
"#;

/// Initializes the frontier schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
