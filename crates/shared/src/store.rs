use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;

use crate::models::PublishRecord;

/// Lookup key for "has this been published before".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupKey {
    Url(String),
    UrlTitleCategory {
        url: String,
        title: String,
        category: String,
    },
}

/// Persistence for publish records. Rows are only ever appended.
pub trait RecordStore {
    fn contains(&self, key: &DedupKey) -> Result<bool>;

    /// Append a record. Must be durable when this returns.
    fn insert(&self, record: &PublishRecord) -> Result<()>;
}

pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open record store: {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory record store")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS posts (
                 id           INTEGER PRIMARY KEY,
                 url          TEXT NOT NULL,
                 title        TEXT NOT NULL,
                 category     TEXT NOT NULL,
                 published_at TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS posts_url ON posts (url);",
        )
        .context("Failed to create posts table")?;

        Ok(Self { conn })
    }

    /// Most recent records first, optionally limited to one category.
    pub fn recent(&self, limit: usize, category: Option<&str>) -> Result<Vec<PublishRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, title, category, published_at
             FROM posts
             WHERE ?1 IS NULL OR category = ?1
             ORDER BY id DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![category, limit as i64], |row| {
            Ok(PublishRecord {
                url: row.get(0)?,
                title: row.get(1)?,
                category: row.get(2)?,
                published_at: row.get(3)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read publish records")
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
            .context("Failed to count publish records")?;
        Ok(count as usize)
    }
}

impl RecordStore for SqliteRecordStore {
    fn contains(&self, key: &DedupKey) -> Result<bool> {
        let found = match key {
            DedupKey::Url(url) => self
                .conn
                .query_row("SELECT 1 FROM posts WHERE url = ?1 LIMIT 1", [url], |_| Ok(()))
                .optional(),
            DedupKey::UrlTitleCategory {
                url,
                title,
                category,
            } => self
                .conn
                .query_row(
                    "SELECT 1 FROM posts
                     WHERE url = ?1 AND title = ?2 AND category = ?3
                     LIMIT 1",
                    params![url, title, category],
                    |_| Ok(()),
                )
                .optional(),
        };

        Ok(found.context("Failed to query publish records")?.is_some())
    }

    fn insert(&self, record: &PublishRecord) -> Result<()> {
        // Autocommit: the row is on disk before the next item is looked at.
        self.conn
            .execute(
                "INSERT INTO posts (url, title, category, published_at) VALUES (?1, ?2, ?3, ?4)",
                params![record.url, record.title, record.category, record.published_at],
            )
            .context("Failed to insert publish record")?;
        Ok(())
    }
}
