use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::session::UserSession;
use super::SessionStore;
use crate::core::AppResult;

/// Non-persistent store, used by the CLI and tests.
#[derive(Default)]
pub struct MemoryStore {
    sessions: DashMap<i64, UserSession>,
    flushes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `flush` was called
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl SessionStore for MemoryStore {
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
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{load_session, update_session};

    #[test]
    fn test_update_creates_and_flushes() {
        let store = MemoryStore::new();
        assert!(store.get(7).is_none());

        update_session(&store, 7, |s| s.preferences.language = "ru".into()).expect("update");
        assert_eq!(load_session(&store, 7).preferences.language, "ru");
        assert_eq!(store.flush_count(), 1);
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();
        store.put(1, UserSession::default());
        store.put(2, UserSession::default());
        assert!(store.remove(1).is_some());
        assert_eq!(store.user_ids(), vec![2]);
    }
}
