use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{PagebriefError, Result};
use crate::normalize::normalize_url;

/// Safely convert a Unix timestamp to DateTime<Utc>, falling back to current time if invalid
fn timestamp_to_datetime(timestamp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Value written for a (conversation, URL) pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedSummary {
    pub title: Option<String>,
    pub summary: String,
    pub content_hash: Option<String>,
    /// Truncated source text kept for follow-up questions
    pub raw_content: Option<String>,
}

/// A stored summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryCacheEntry {
    pub conversation_id: String,
    /// Normalized URL
    pub url: String,
    pub title: Option<String>,
    pub summary: String,
    pub content_hash: Option<String>,
    pub raw_content: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Summary store keyed by (conversation id, normalized URL).
///
/// At most one entry exists per key; `put` overwrites (last write wins).
pub trait SummaryCache: Send + Sync {
    fn get(&self, conversation_id: &str, url: &str) -> Result<Option<SummaryCacheEntry>>;
    fn put(&self, conversation_id: &str, url: &str, value: &CachedSummary) -> Result<()>;
}

/// Process-local cache, mainly for tests and one-shot CLI runs
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<(String, String), SummaryCacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SummaryCache for MemoryCache {
    fn get(&self, conversation_id: &str, url: &str) -> Result<Option<SummaryCacheEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| PagebriefError::CacheError("cache lock poisoned".into()))?;
        Ok(entries
            .get(&(conversation_id.to_string(), normalize_url(url)))
            .cloned())
    }

    fn put(&self, conversation_id: &str, url: &str, value: &CachedSummary) -> Result<()> {
        let url = normalize_url(url);
        let entry = SummaryCacheEntry {
            conversation_id: conversation_id.to_string(),
            url: url.clone(),
            title: value.title.clone(),
            summary: value.summary.clone(),
            content_hash: value.content_hash.clone(),
            raw_content: value.raw_content.clone(),
            created_at: Utc::now(),
        };
        self.entries
            .lock()
            .map_err(|_| PagebriefError::CacheError("cache lock poisoned".into()))?
            .insert((conversation_id.to_string(), url), entry);
        Ok(())
    }
}

/// SQLite-backed summary cache
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Open or create the cache database at the configured path
    pub fn open() -> Result<Self> {
        let db_path = Config::db_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(&db_path)?;
        embedded::migrations::runner().run(&mut conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        embedded::migrations::runner().run(&mut conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PagebriefError::CacheError("database lock poisoned".into()))
    }

    /// Number of summaries stored for a conversation
    pub fn count_for_conversation(&self, conversation_id: &str) -> Result<usize> {
        let count: i64 = self.lock()?.query_row(
            "SELECT COUNT(*) FROM url_summaries WHERE conversation_id = ?1",
            params![conversation_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl SummaryCache for SqliteCache {
    fn get(&self, conversation_id: &str, url: &str) -> Result<Option<SummaryCacheEntry>> {
        let url = normalize_url(url);
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT conversation_id, url, title, summary, content_hash, raw_content, created_at
                 FROM url_summaries WHERE conversation_id = ?1 AND url = ?2",
                params![conversation_id, url],
                |row| {
                    Ok(SummaryCacheEntry {
                        conversation_id: row.get(0)?,
                        url: row.get(1)?,
                        title: row.get(2)?,
                        summary: row.get(3)?,
                        content_hash: row.get(4)?,
                        raw_content: row.get(5)?,
                        created_at: timestamp_to_datetime(row.get::<_, i64>(6)?),
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn put(&self, conversation_id: &str, url: &str, value: &CachedSummary) -> Result<()> {
        let url = normalize_url(url);
        self.lock()?.execute(
            "INSERT INTO url_summaries
             (conversation_id, url, title, summary, content_hash, raw_content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(conversation_id, url) DO UPDATE SET
                title = excluded.title,
                summary = excluded.summary,
                content_hash = excluded.content_hash,
                raw_content = excluded.raw_content,
                created_at = excluded.created_at",
            params![
                conversation_id,
                url,
                value.title,
                value.summary,
                value.content_hash,
                value.raw_content,
                Utc::now().timestamp(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(text: &str) -> CachedSummary {
        CachedSummary {
            title: Some("Title".into()),
            summary: text.into(),
            content_hash: Some("abc".into()),
            raw_content: Some("raw".into()),
        }
    }

    #[test]
    fn test_sqlite_roundtrip_and_upsert() {
        let cache = SqliteCache::open_in_memory().unwrap();
        assert!(cache.get("c1", "https://example.com/a").unwrap().is_none());

        cache.put("c1", "https://example.com/a", &summary("first")).unwrap();
        cache.put("c1", "https://EXAMPLE.com/a#top", &summary("second")).unwrap();

        let entry = cache.get("c1", "https://example.com/a").unwrap().unwrap();
        assert_eq!(entry.summary, "second");
        assert_eq!(entry.url, "https://example.com/a");
        assert_eq!(cache.count_for_conversation("c1").unwrap(), 1);
    }

    #[test]
    fn test_sqlite_scoped_by_conversation() {
        let cache = SqliteCache::open_in_memory().unwrap();
        cache.put("c1", "https://example.com/a", &summary("one")).unwrap();
        assert!(cache.get("c2", "https://example.com/a").unwrap().is_none());
    }

    #[test]
    fn test_memory_cache_last_write_wins() {
        let cache = MemoryCache::new();
        cache.put("c", "https://example.com/", &summary("a")).unwrap();
        cache.put("c", "https://example.com", &summary("b")).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("c", "https://example.com").unwrap().unwrap().summary, "b");
    }
}
