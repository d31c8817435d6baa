//! Handler types and dependencies

use std::path::PathBuf;
use std::sync::Arc;

use teloxide::types::{ChatId, Message, User};
use unic_langid::LanguageIdentifier;

use crate::core::rate_limiter::RateLimiter;
use crate::download::{Discovery, DownloadOrchestrator};
use crate::i18n;
use crate::storage::SessionStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub store: Arc<dyn SessionStore>,
    pub orchestrator: Arc<DownloadOrchestrator>,
    pub discovery: Arc<Discovery>,
    pub rate_limiter: Arc<RateLimiter>,
    pub admin_ids: Arc<Vec<i64>>,
    /// Files reported by `/admin_files`
    pub data_files: Arc<Vec<PathBuf>>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(
        store: Arc<dyn SessionStore>,
        orchestrator: Arc<DownloadOrchestrator>,
        discovery: Arc<Discovery>,
        rate_limiter: Arc<RateLimiter>,
        admin_ids: Vec<i64>,
        data_files: Vec<PathBuf>,
    ) -> Self {
        Self {
            store,
            orchestrator,
            discovery,
            rate_limiter,
            admin_ids: Arc::new(admin_ids),
            data_files: Arc::new(data_files),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    pub fn lang(&self, chat_id: ChatId) -> LanguageIdentifier {
        i18n::user_lang(self.store.as_ref(), chat_id.0)
    }
}

/// Telegram user id of the sender, 0 when unavailable
pub fn sender_id(user: Option<&User>) -> i64 {
    user.and_then(|u| i64::try_from(u.id.0).ok()).unwrap_or(0)
}

/// First name of the message author, for greetings
pub fn first_name(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(|u| u.first_name.clone())
        .unwrap_or_else(|| "friend".to_string())
}
