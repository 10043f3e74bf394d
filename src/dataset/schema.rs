//! Dataset schema definitions

/// SQL schema for the dataset database
///
/// List-valued fields are stored as JSON array strings.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS results (
    url TEXT PRIMARY KEY,
    favicon TEXT NULL,
    title TEXT NOT NULL DEFAULT '',
    headings TEXT NOT NULL DEFAULT '[]',
    content TEXT NOT NULL DEFAULT '[]',
    filters TEXT NOT NULL DEFAULT '["all"]',
    timestamp TEXT NOT NULL
);
"#;

/// Initializes the dataset schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_results_table_starts_empty() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
