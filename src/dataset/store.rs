//! SQLite-backed dataset store
//!
//! Writers in every process serialize on an EXCLUSIVE transaction, which is the
//! cross-process lock around the read-merge-write cycle. A file that SQLite cannot read
//! is deleted and recreated empty instead of failing the caller.

use crate::dataset::schema::initialize_schema;
use crate::dataset::{CrawlRecord, DatasetError, DatasetResult};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// How long a writer waits for another process to release the dataset lock
const LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// Deduplicated append-only store of crawl results
pub struct Dataset {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl Dataset {
    /// Opens the dataset at `path`, creating it (and its parent directories) if missing
    ///
    /// A corrupt file is replaced by an empty dataset.
    ///
    /// # Returns
    ///
    /// * `Ok(Dataset)` - Dataset ready for reads and writes
    /// * `Err(DatasetError)` - The file could neither be opened nor recreated
    pub fn open(path: &Path) -> DatasetResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = match open_store(path) {
            Ok(conn) => conn,
            Err(e) if e.is_corruption() => {
                tracing::warn!(path = %path.display(), error = %e, "Dataset unreadable, recreating");
                remove_store_files(path)?;
                open_store(path)?
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    /// Appends a record unless one with the same URL already exists
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The record was persisted
    /// * `Ok(false)` - Empty record or duplicate URL; nothing was written
    pub fn write(&self, record: &CrawlRecord) -> DatasetResult<bool> {
        if record.is_empty() {
            tracing::debug!("Skipping empty record");
            return Ok(false);
        }

        let written = self.with_repair(|conn| merge_record(conn, record))?;
        if !written {
            tracing::debug!(url = %record.url, "Record already stored");
        }
        Ok(written)
    }

    /// Returns every record in insertion order
    pub fn read_all(&self) -> DatasetResult<Vec<CrawlRecord>> {
        self.with_repair(|conn| load_records(conn))
    }

    /// Number of stored records
    pub fn len(&self) -> DatasetResult<u64> {
        self.with_repair(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    pub fn is_empty(&self) -> DatasetResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Checks whether a record for `url` exists
    pub fn contains(&self, url: &str) -> DatasetResult<bool> {
        self.with_repair(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM results WHERE url = ?1",
                    params![url],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `op`, recreating the file and retrying once if it turns out to be corrupt
    fn with_repair<T>(
        &self,
        op: impl Fn(&mut Connection) -> DatasetResult<T>,
    ) -> DatasetResult<T> {
        let mut conn = self.conn();
        match op(&mut *conn) {
            Err(e) if e.is_corruption() => {
                tracing::warn!(path = %self.path.display(), error = %e, "Dataset unreadable, recreating");
                self.repair(&mut *conn)?;
                op(&mut *conn)
            }
            other => other,
        }
    }

    fn repair(&self, conn: &mut Connection) -> DatasetResult<()> {
        let stale = std::mem::replace(conn, Connection::open_in_memory()?);
        drop(stale);
        remove_store_files(&self.path)?;
        *conn = open_store(&self.path)?;
        Ok(())
    }
}

fn open_store(path: &Path) -> DatasetResult<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(LOCK_TIMEOUT)?;
    initialize_schema(&conn)?;
    Ok(conn)
}

fn remove_store_files(path: &Path) -> DatasetResult<()> {
    for suffix in ["", "-journal", "-wal", "-shm"] {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        match std::fs::remove_file(PathBuf::from(name)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Read-merge-write under the exclusive lock
fn merge_record(conn: &mut Connection, record: &CrawlRecord) -> DatasetResult<bool> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;

    let existing = load_records(&tx)?;
    let before = existing.len();

    let mut seen = HashSet::new();
    let merged: Vec<CrawlRecord> = existing
        .into_iter()
        .chain(std::iter::once(record.clone()))
        .filter(|r| seen.insert(r.url.clone()))
        .collect();

    if merged.len() == before {
        return Ok(false);
    }

    for row in &merged[before..] {
        tx.execute(
            "INSERT INTO results (url, favicon, title, headings, content, filters, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                row.url,
                row.favicon,
                row.title,
                serde_json::to_string(&row.headings)?,
                serde_json::to_string(&row.content)?,
                serde_json::to_string(&row.filters)?,
                row.timestamp,
            ],
        )?;
    }

    tx.commit()?;
    Ok(true)
}

fn load_records(conn: &Connection) -> DatasetResult<Vec<CrawlRecord>> {
    let mut stmt = conn.prepare(
        "SELECT url, favicon, title, headings, content, filters, timestamp
         FROM results ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(
            |(url, favicon, title, headings, content, filters, timestamp)| {
                Ok(CrawlRecord {
                    url,
                    favicon,
                    title,
                    headings: serde_json::from_str(&headings)?,
                    content: serde_json::from_str(&content)?,
                    filters: serde_json::from_str(&filters)?,
                    timestamp,
                })
            },
        )
        .collect::<Result<Vec<_>, DatasetError>>()
}
