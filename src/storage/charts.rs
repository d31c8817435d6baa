//! Charts cache (`charts_cache.json`), shared by all users

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::core::types::Track;
use crate::core::AppResult;

pub const CHARTS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// On-disk charts document: query -> tracks, plus the refresh time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsSnapshot {
    pub data: BTreeMap<String, Vec<Track>>,
    pub last_update: Option<String>,
}

impl ChartsSnapshot {
    pub fn last_update_time(&self) -> Option<NaiveDateTime> {
        self.last_update
            .as_deref()
            .and_then(|s| NaiveDateTime::parse_from_str(s, CHARTS_TIME_FORMAT).ok())
    }

    /// Stale when never refreshed, unparsable, or older than `ttl_hours`.
    pub fn is_stale(&self, now: NaiveDateTime, ttl_hours: i64) -> bool {
        match self.last_update_time() {
            Some(updated) => (now - updated).num_hours() >= ttl_hours,
            None => true,
        }
    }

    pub fn track_count(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }
}

pub struct ChartsCache {
    path: Option<PathBuf>,
    snapshot: Mutex<ChartsSnapshot>,
}

impl ChartsCache {
    /// Loads the cache file; missing or broken files give an empty (stale) cache.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshot = match fs_err::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("⚠️ Charts cache {} is broken ({}), ignoring", path.display(), e);
                ChartsSnapshot::default()
            }),
            Err(_) => ChartsSnapshot::default(),
        };
        Self {
            path: Some(path),
            snapshot: Mutex::new(snapshot),
        }
    }

    /// Cache that never touches disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            snapshot: Mutex::new(ChartsSnapshot::default()),
        }
    }

    pub async fn is_stale(&self, ttl_hours: i64) -> bool {
        self.snapshot.lock().await.is_stale(Local::now().naive_local(), ttl_hours)
    }

    pub async fn snapshot(&self) -> ChartsSnapshot {
        self.snapshot.lock().await.clone()
    }

    /// All cached tracks, query by query
    pub async fn all_tracks(&self) -> Vec<Track> {
        self.snapshot.lock().await.data.values().flatten().cloned().collect()
    }

    /// Replaces the data, stamps the refresh time and writes the file.
    pub async fn replace(&self, data: BTreeMap<String, Vec<Track>>) -> AppResult<()> {
        let body = {
            let mut snapshot = self.snapshot.lock().await;
            snapshot.data = data;
            snapshot.last_update = Some(Local::now().format(CHARTS_TIME_FORMAT).to_string());
            serde_json::to_string_pretty(&*snapshot)?
        };

        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs_err::create_dir_all(parent)?;
            }
            fs_err::write(path, body)?;
            log::info!("📊 Charts cache saved to {}", path.display());
        }
        Ok(())
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, CHARTS_TIME_FORMAT).expect("valid time")
    }

    #[test]
    fn test_staleness() {
        let mut snapshot = ChartsSnapshot::default();
        assert!(snapshot.is_stale(at("2024-05-01 12:00:00"), 24));

        snapshot.last_update = Some("2024-05-01 00:00:00".into());
        assert!(!snapshot.is_stale(at("2024-05-01 23:59:59"), 24));
        assert!(snapshot.is_stale(at("2024-05-02 00:00:00"), 24));
    }

    #[tokio::test]
    async fn test_replace_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("charts_cache.json");
        let cache = ChartsCache::load(&path);
        assert!(cache.is_stale(24).await);

        let mut data = BTreeMap::new();
        data.insert("drake".to_string(), vec![Track::new("a", "drake", 200, "https://x.y")]);
        cache.replace(data).await.expect("save");
        assert!(!cache.is_stale(24).await);

        let reloaded = ChartsCache::load(&path);
        assert_eq!(reloaded.all_tracks().await.len(), 1);
        assert!(reloaded.snapshot().await.last_update.is_some());
    }
}
