//! Sessions file (`user_data.json`)
//!
//! Layout: one top-level key per user id holding the session, plus the
//! reserved `_user_stats` key mapping user id to `UserStats`. The whole file
//! is rewritten on every flush (temp file, then rename).

use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::session::{UserSession, UserStats};
use super::SessionStore;
use crate::core::{AppError, AppResult};

const STATS_KEY: &str = "_user_stats";

#[derive(Serialize)]
struct Document<'a> {
    #[serde(rename = "_user_stats")]
    user_stats: BTreeMap<String, &'a UserStats>,
    #[serde(flatten)]
    users: BTreeMap<String, &'a UserSession>,
}

pub struct JsonFileStore {
    path: PathBuf,
    sessions: DashMap<i64, UserSession>,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens the file, starting empty when it is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sessions = match fs_err::read_to_string(&path) {
            Ok(raw) => parse_document(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No sessions file at {}, starting empty", path.display());
                DashMap::new()
            }
            Err(e) => {
                log::warn!("⚠️ Could not read {}: {}; starting empty", path.display(), e);
                DashMap::new()
            }
        };
        log::info!("✅ Loaded {} user sessions from {}", sessions.len(), path.display());

        Self {
            path,
            sessions,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the sessions file on disk, if it exists
    pub fn file_size(&self) -> Option<u64> {
        fs_err::metadata(&self.path).ok().map(|m| m.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn render(&self) -> AppResult<String> {
        let snapshot: BTreeMap<i64, UserSession> =
            self.sessions.iter().map(|e| (*e.key(), e.value().clone())).collect();
        let doc = Document {
            user_stats: snapshot.iter().map(|(id, s)| (id.to_string(), &s.stats)).collect(),
            users: snapshot.iter().map(|(id, s)| (id.to_string(), s)).collect(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

/// Parses the sessions document entry by entry, skipping broken ones.
fn parse_document(raw: &str) -> DashMap<i64, UserSession> {
    let sessions = DashMap::new();
    let root: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(raw) {
        Ok(root) => root,
        Err(e) => {
            log::warn!("⚠️ Sessions file is not valid JSON ({}), starting empty", e);
            return sessions;
        }
    };

    let mut stats: BTreeMap<String, UserStats> = BTreeMap::new();
    for (key, value) in root {
        if key == STATS_KEY {
            match serde_json::from_value(value) {
                Ok(parsed) => stats = parsed,
                Err(e) => log::warn!("⚠️ Ignoring malformed {}: {}", STATS_KEY, e),
            }
            continue;
        }
        let Ok(user_id) = key.parse::<i64>() else {
            log::warn!("⚠️ Ignoring non-numeric session key '{}'", key);
            continue;
        };
        match serde_json::from_value::<UserSession>(value) {
            Ok(session) => {
                sessions.insert(user_id, session);
            }
            Err(e) => log::warn!("⚠️ Ignoring malformed session for {}: {}", user_id, e),
        }
    }

    for (key, user_stats) in stats {
        if let Ok(user_id) = key.parse::<i64>() {
            sessions.entry(user_id).or_default().stats = user_stats;
        }
    }
    sessions
}

impl SessionStore for JsonFileStore {
    fn get(&self, user_id: i64) -> Option<UserSession> {
        self.sessions.get(&user_id).map(|s| s.clone())
    }

    fn put(&self, user_id: i64, session: UserSession) {
        self.sessions.insert(user_id, session);
    }

    fn update(&self, user_id: i64, f: &mut dyn FnMut(&mut UserSession)) {
        let mut entry = self.sessions.entry(user_id).or_default();
        f(entry.value_mut());
    }

    fn remove(&self, user_id: i64) -> Option<UserSession> {
        self.sessions.remove(&user_id).map(|(_, s)| s)
    }

    fn user_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.sessions.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    fn flush(&self) -> AppResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Config("sessions write lock poisoned".to_string()))?;

        let body = self.render()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs_err::write(&tmp, body)?;
        fs_err::rename(&tmp, &self.path)?;
        log::debug!("Saved {} sessions to {}", self.sessions.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Track;

    #[test]
    fn test_flush_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("user_data.json");

        let store = JsonFileStore::open(&path);
        store.update(42, &mut |s: &mut UserSession| {
            s.record_search("lofi", vec![Track::new("a", "b", 10, "https://x.y")]);
            s.preferences.language = "uk".into();
        });
        store.flush().expect("flush");

        let raw = fs_err::read_to_string(&path).expect("file written");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(json["_user_stats"]["42"]["searches"], 1);
        assert_eq!(json["42"]["search_query"], "lofi");

        let reloaded = JsonFileStore::open(&path);
        let session = reloaded.get(42).expect("session restored");
        assert_eq!(session.preferences.language, "uk");
        assert_eq!(session.stats.searches, 1);
        assert_eq!(session.search_results.len(), 1);
    }

    #[test]
    fn test_broken_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("user_data.json");
        fs_err::write(&path, "{ not json").expect("write");
        assert!(JsonFileStore::open(&path).is_empty());
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("user_data.json");
        fs_err::write(
            &path,
            r#"{"1": {"search_query": "ok"}, "2": "broken", "x": {}, "_user_stats": {"3": {"downloads": 2}}}"#,
        )
        .expect("write");

        let store = JsonFileStore::open(&path);
        assert_eq!(store.user_ids(), vec![1, 3]);
        assert_eq!(store.get(3).map(|s| s.stats.downloads), Some(2));
    }
}
