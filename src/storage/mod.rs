//! Per-user session persistence and the shared charts cache

pub mod charts;
pub mod json_store;
pub mod memory;
pub mod session;

pub use charts::{ChartsCache, ChartsSnapshot};
pub use json_store::JsonFileStore;
pub use memory::MemoryStore;
pub use session::{ListingKind, PlaylistListing, Preferences, UserSession, UserStats};

use crate::core::AppResult;

/// Keyed user session storage.
///
/// Reads return copies; writes go through `update` so a read-modify-write of
/// one user is never interleaved with another writer of the same user.
pub trait SessionStore: Send + Sync {
    fn get(&self, user_id: i64) -> Option<UserSession>;

    fn put(&self, user_id: i64, session: UserSession);

    /// Mutates the session in place, creating it first if needed.
    fn update(&self, user_id: i64, f: &mut dyn FnMut(&mut UserSession));

    fn remove(&self, user_id: i64) -> Option<UserSession>;

    fn user_ids(&self) -> Vec<i64>;

    /// Persists everything.
    fn flush(&self) -> AppResult<()>;
}

/// Session for `user_id`, or a fresh default one.
pub fn load_session(store: &dyn SessionStore, user_id: i64) -> UserSession {
    store.get(user_id).unwrap_or_default()
}

/// Applies `f` to the user's session and flushes the store.
pub fn update_session<F>(store: &dyn SessionStore, user_id: i64, f: F) -> AppResult<()>
where
    F: FnOnce(&mut UserSession),
{
    let mut f = Some(f);
    store.update(user_id, &mut |session: &mut UserSession| {
        if let Some(f) = f.take() {
            f(session);
        }
    });
    store.flush()
}
