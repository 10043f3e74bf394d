//! SQLite frontier implementation
//!
//! Every crawler process opens its own connection to the same database file. WAL mode
//! lets snapshots proceed while another process writes, and every mutation runs in an
//! IMMEDIATE transaction so the write lock is taken before any membership check.

use crate::frontier::schema::initialize_schema;
use crate::frontier::traits::{Frontier, FrontierError, FrontierResult};
use crate::state::UrlState;
use crate::url::normalize_url;
use rusqlite::{params, Connection, TransactionBehavior};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// SQLite frontier backend
///
/// The connection sits behind a mutex so a single handle can be shared by all workers
/// of a process. Lock scope never extends past one trait call.
pub struct SqliteFrontier {
    conn: Mutex<Connection>,
}

impl SqliteFrontier {
    /// Opens (or creates) the frontier database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `busy_timeout` - How long a connection waits on another process's write lock
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteFrontier)` - Database opened and schema ensured
    /// * `Err(FrontierError)` - Failed to open database
    pub fn open(path: &Path, busy_timeout: Duration) -> FrontierResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory frontier (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> FrontierResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn exists(conn: &Connection, sql: &str, key: &str) -> rusqlite::Result<bool> {
    conn.query_row(sql, params![key], |row| row.get(0))
}

impl Frontier for SqliteFrontier {
    // ===== Pending Management =====

    fn enqueue(&self, url: &str) -> FrontierResult<bool> {
        let key = normalize_url(url);
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let pending = exists(
            &tx,
            "SELECT EXISTS(SELECT 1 FROM queue_set WHERE url = ?1)",
            &key,
        )?;
        let crawled = exists(
            &tx,
            "SELECT EXISTS(SELECT 1 FROM crawled WHERE url = ?1)",
            &key,
        )?;
        if pending || crawled {
            return Ok(false);
        }

        tx.execute("INSERT INTO queue_set (url) VALUES (?1)", params![key])?;
        tx.execute(
            "INSERT INTO queue (url, normalized) VALUES (?1, ?2)",
            params![url, key],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn dequeue_snapshot(&self) -> FrontierResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT url FROM queue ORDER BY id")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(urls)
    }

    fn remove_pending(&self, url: &str) -> FrontierResult<()> {
        let key = normalize_url(url);
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM queue_set WHERE url = ?1", params![key])?;
        tx.execute("DELETE FROM queue WHERE normalized = ?1", params![key])?;
        tx.commit()?;
        Ok(())
    }

    fn complete(&self, url: &str) -> FrontierResult<()> {
        let key = normalize_url(url);
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM queue_set WHERE url = ?1", params![key])?;
        tx.execute("DELETE FROM queue WHERE normalized = ?1", params![key])?;
        tx.execute("INSERT OR IGNORE INTO crawled (url) VALUES (?1)", params![key])?;
        tx.commit()?;
        Ok(())
    }

    // ===== Read Accessors =====

    fn is_crawled(&self, url: &str) -> FrontierResult<bool> {
        let key = normalize_url(url);
        let conn = self.conn();
        Ok(exists(
            &conn,
            "SELECT EXISTS(SELECT 1 FROM crawled WHERE url = ?1)",
            &key,
        )?)
    }

    fn snapshot_crawled(&self) -> FrontierResult<HashSet<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT url FROM crawled")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<HashSet<String>, _>>()?;
        Ok(urls)
    }

    fn state_of(&self, url: &str) -> FrontierResult<Option<UrlState>> {
        let key = normalize_url(url);
        let conn = self.conn();
        let pending = exists(
            &conn,
            "SELECT EXISTS(SELECT 1 FROM queue_set WHERE url = ?1)",
            &key,
        )?;
        let crawled = exists(
            &conn,
            "SELECT EXISTS(SELECT 1 FROM crawled WHERE url = ?1)",
            &key,
        )?;

        match (pending, crawled) {
            (true, true) => Err(FrontierError::Inconsistent(format!(
                "{} is both pending and crawled",
                key
            ))),
            (true, false) => Ok(Some(UrlState::Pending)),
            (false, true) => Ok(Some(UrlState::Crawled)),
            (false, false) => Ok(None),
        }
    }

    fn pending_count(&self) -> FrontierResult<u64> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM queue", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn crawled_count(&self) -> FrontierResult<u64> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM crawled", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Administration =====

    fn ensure_start_url(&self, start_url: &str) -> FrontierResult<bool> {
        let key = normalize_url(start_url);
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let has_pending: bool =
            tx.query_row("SELECT EXISTS(SELECT 1 FROM queue)", [], |row| row.get(0))?;
        let has_crawled: bool =
            tx.query_row("SELECT EXISTS(SELECT 1 FROM crawled)", [], |row| row.get(0))?;
        if has_pending || has_crawled {
            return Ok(false);
        }

        tx.execute("INSERT INTO queue_set (url) VALUES (?1)", params![key])?;
        tx.execute(
            "INSERT INTO queue (url, normalized) VALUES (?1, ?2)",
            params![start_url, key],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn clear(&self) -> FrontierResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute_batch(
            "
            DELETE FROM queue;
            DELETE FROM queue_set;
            DELETE FROM crawled;
        ",
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_adds_once() {
        let frontier = SqliteFrontier::open_in_memory().unwrap();

        assert!(frontier.enqueue("https://a.example.com/x").unwrap());
        assert!(!frontier.enqueue("https://a.example.com/x").unwrap());
        assert!(!frontier.enqueue("https://a.example.com/x/").unwrap());

        assert_eq!(
            frontier.dequeue_snapshot().unwrap(),
            vec!["https://a.example.com/x".to_string()]
        );
    }

    #[test]
    fn test_snapshot_preserves_order_and_contents() {
        let frontier = SqliteFrontier::open_in_memory().unwrap();
        frontier.enqueue("https://a.example.com/1").unwrap();
        frontier.enqueue("https://a.example.com/2/").unwrap();
        frontier.enqueue("https://a.example.com/3").unwrap();

        let first = frontier.dequeue_snapshot().unwrap();
        let second = frontier.dequeue_snapshot().unwrap();

        assert_eq!(
            first,
            vec![
                "https://a.example.com/1".to_string(),
                "https://a.example.com/2/".to_string(),
                "https://a.example.com/3".to_string(),
            ]
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_complete_moves_to_crawled() {
        let frontier = SqliteFrontier::open_in_memory().unwrap();
        frontier.enqueue("https://a.example.com/x/").unwrap();

        frontier.complete("https://a.example.com/x").unwrap();

        assert!(frontier.dequeue_snapshot().unwrap().is_empty());
        assert!(frontier.is_crawled("https://a.example.com/x/").unwrap());
        assert_eq!(
            frontier.state_of("https://a.example.com/x").unwrap(),
            Some(UrlState::Crawled)
        );
        assert!(!frontier.enqueue("https://a.example.com/x").unwrap());
    }

    #[test]
    fn test_complete_is_idempotent() {
        let frontier = SqliteFrontier::open_in_memory().unwrap();
        frontier.complete("https://a.example.com/x").unwrap();
        frontier.complete("https://a.example.com/x").unwrap();

        assert_eq!(frontier.crawled_count().unwrap(), 1);
        assert_eq!(frontier.pending_count().unwrap(), 0);
    }

    #[test]
    fn test_remove_pending_allows_reenqueue() {
        let frontier = SqliteFrontier::open_in_memory().unwrap();
        frontier.enqueue("https://a.example.com/x").unwrap();

        frontier.remove_pending("https://a.example.com/x").unwrap();

        assert_eq!(frontier.state_of("https://a.example.com/x").unwrap(), None);
        assert!(frontier.dequeue_snapshot().unwrap().is_empty());
        assert!(frontier.enqueue("https://a.example.com/x").unwrap());
    }

    #[test]
    fn test_ensure_start_url_only_seeds_empty_frontier() {
        let frontier = SqliteFrontier::open_in_memory().unwrap();

        assert!(frontier.ensure_start_url("https://a.example.com/").unwrap());
        assert!(!frontier.ensure_start_url("https://a.example.com/").unwrap());
        assert_eq!(frontier.pending_count().unwrap(), 1);

        frontier.complete("https://a.example.com/").unwrap();
        assert!(!frontier.ensure_start_url("https://a.example.com/").unwrap());
        assert_eq!(frontier.pending_count().unwrap(), 0);
    }

    #[test]
    fn test_clear_wipes_everything() {
        let frontier = SqliteFrontier::open_in_memory().unwrap();
        frontier.enqueue("https://a.example.com/1").unwrap();
        frontier.complete("https://a.example.com/2").unwrap();

        frontier.clear().unwrap();

        assert_eq!(frontier.pending_count().unwrap(), 0);
        assert_eq!(frontier.crawled_count().unwrap(), 0);
        assert!(frontier.snapshot_crawled().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_crawled_is_normalized() {
        let frontier = SqliteFrontier::open_in_memory().unwrap();
        frontier.complete("https://a.example.com/x/").unwrap();
        frontier.complete("https://a.example.com/y").unwrap();

        let crawled = frontier.snapshot_crawled().unwrap();
        assert_eq!(crawled.len(), 2);
        assert!(crawled.contains("https://a.example.com/x"));
        assert!(crawled.contains("https://a.example.com/y"));
    }
}
