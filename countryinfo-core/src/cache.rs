//! On-disk JSON cache shared by the stores.
//!
//! Every key is one pretty-printed document `<dir>/<key>.json` holding the
//! value together with the time it was fetched. A document that cannot be
//! read or parsed is reported as a miss, so the next `collect` replaces it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{io::ErrorKind, path::PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub fetched_at: DateTime<Utc>,
    pub value: T,
}

/// Decides whether a cached entry may be served without refetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreshnessPolicy {
    /// Any cached entry is fresh.
    #[default]
    PresentIsFresh,
    /// Entries older than the given age are refetched.
    MaxAge(chrono::Duration),
    /// Every entry is refetched.
    AlwaysStale,
}

impl FreshnessPolicy {
    pub fn is_fresh(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            FreshnessPolicy::PresentIsFresh => true,
            FreshnessPolicy::MaxAge(max_age) => now - fetched_at <= *max_age,
            FreshnessPolicy::AlwaysStale => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonCache {
    dir: PathBuf,
}

impl JsonCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Returns the entry for `key`, or `None` when it is absent or unreadable.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let path = self.path_for(key);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable cache entry, ignoring");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(entry) => {
                tracing::debug!(key, "cache hit");
                Some(entry)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt cache entry, ignoring");
                None
            }
        }
    }

    /// Whether `key` holds a `T` that `policy` considers fresh.
    ///
    /// An entry whose value does not decode as `T` is stale, the same as one
    /// that `get::<T>` would not return.
    pub async fn is_fresh<T: DeserializeOwned>(&self, key: &str, policy: FreshnessPolicy) -> bool {
        if policy == FreshnessPolicy::AlwaysStale {
            return false;
        }

        match self.get::<T>(key).await {
            Some(entry) => policy.is_fresh(entry.fetched_at, Utc::now()),
            None => false,
        }
    }

    /// Writes `value` under `key`, replacing any previous entry.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.put_at(key, value, Utc::now()).await
    }

    pub(crate) async fn put_at<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        fetched_at: DateTime<Utc>,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create cache directory: {}", self.dir.display()))?;

        let entry = CacheEntry { fetched_at, value };
        let json = serde_json::to_vec_pretty(&entry).context("Failed to serialize cache entry")?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write cache file: {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to move cache file into place: {}", path.display()))?;

        tracing::debug!(key, "cache entry stored");
        Ok(())
    }
}
