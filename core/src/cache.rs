use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use thiserror::Error;

const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60); // 24 hours

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache read error: {0}")]
    Read(#[source] std::io::Error),

    #[error("Cache write error: {0}")]
    Write(#[source] std::io::Error),

    #[error("Cache entry is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Cache serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry {
    pub listing: Value,
    pub timestamp: u64,
    pub ttl_seconds: u64,
}

impl CacheEntry {
    pub fn new(listing: Value, ttl_seconds: u64) -> Self {
        Self {
            listing,
            timestamp: now_secs(),
            ttl_seconds,
        }
    }

    pub fn is_expired(&self) -> bool {
        if self.ttl_seconds == 0 {
            return true;
        }
        now_secs() > self.timestamp.saturating_add(self.ttl_seconds)
    }
}

fn now_secs() -> u64 {
    SystemTime::UNIX_EPOCH
        .elapsed()
        .unwrap_or_default()
        .as_secs()
}

/// Stores raw filter listings on disk, one file per filter category.
#[derive(Clone, Debug)]
pub struct SchemaCache {
    base_path: PathBuf,
    ttl: Duration,
}

impl SchemaCache {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn path_for(&self, category: &str) -> PathBuf {
        self.base_path
            .join("filters")
            .join(format!("{}.json", sanitize_cache_key(category)))
    }

    /// Returns the cached listing unless it is missing or expired.
    pub fn get(&self, category: &str) -> Result<Option<Value>, CacheError> {
        let path = self.path_for(category);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(CacheError::Read)?;
        let entry: CacheEntry = serde_json::from_str(&content).map_err(CacheError::Corrupt)?;

        if entry.is_expired() {
            return Ok(None);
        }

        Ok(Some(entry.listing))
    }

    pub fn set(&self, category: &str, listing: &Value) -> Result<(), CacheError> {
        let path = self.path_for(category);

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(CacheError::Write)?;
            }
        }

        let entry = CacheEntry::new(listing.clone(), self.ttl.as_secs());
        let content = serde_json::to_string_pretty(&entry).map_err(CacheError::Serialize)?;
        fs::write(&path, content).map_err(CacheError::Write)?;

        Ok(())
    }

    pub fn invalidate(&self, category: &str) -> Result<(), CacheError> {
        let path = self.path_for(category);
        if path.exists() {
            fs::remove_file(&path).map_err(CacheError::Write)?;
        }
        Ok(())
    }

    /// Removes expired or unreadable entries.
    pub fn clean_expired(&self) -> Result<usize, CacheError> {
        let dir = self.base_path.join("filters");

        if !dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&dir).map_err(CacheError::Read)? {
            let path = entry.map_err(CacheError::Read)?.path();
            if !path.is_file() {
                continue;
            }

            let stale = match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str::<CacheEntry>(&content)
                    .map(|e| e.is_expired())
                    .unwrap_or(true),
                Err(_) => true,
            };

            if stale {
                fs::remove_file(&path).map_err(CacheError::Write)?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

pub fn sanitize_cache_key(key: &str) -> String {
    key.replace('/', "-")
        .replace(':', "_")
        .replace(' ', "_")
        .to_lowercase()
}
