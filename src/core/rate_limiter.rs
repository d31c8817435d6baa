use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Per-chat cooldown between two download requests.
///
/// A chat that just started a download is blocked until the cooldown expires,
/// which keeps a single user from hammering the download slots with taps.
#[derive(Clone)]
pub struct RateLimiter {
    /// Instant until which each chat is blocked
    limits: Arc<Mutex<HashMap<ChatId, Instant>>>,
    cooldown: Duration,
}

impl RateLimiter {
    /// Creates a rate limiter with the given cooldown.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cloudtune::core::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let limiter = RateLimiter::new(Duration::from_secs(3));
    /// ```
    pub fn new(cooldown: Duration) -> Self {
        Self {
            limits: Arc::new(Mutex::new(HashMap::new())),
            cooldown,
        }
    }

    /// Checks and, when allowed, starts a new cooldown in one step.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the chat may proceed, `Err(remaining)` otherwise.
    /// Expired cooldowns of other chats are dropped on the way.
    pub async fn try_acquire(&self, chat_id: ChatId) -> Result<(), Duration> {
        let mut limits = self.limits.lock().await;
        let now = Instant::now();
        limits.retain(|_, until| *until > now);
        if let Some(&until) = limits.get(&chat_id) {
            return Err(until - now);
        }
        limits.insert(chat_id, now + self.cooldown);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_try_acquire_blocks_second_call() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        assert!(limiter.try_acquire(ChatId(1)).await.is_ok());
        let remaining = limiter.try_acquire(ChatId(1)).await.expect_err("second call must be limited");
        assert!(remaining <= Duration::from_secs(5));
        // Other chats are independent
        assert!(limiter.try_acquire(ChatId(2)).await.is_ok());
    }

    #[tokio::test]
    async fn test_chat_may_proceed_after_cooldown() {
        let limiter = RateLimiter::new(Duration::from_millis(1));
        assert!(limiter.try_acquire(ChatId(7)).await.is_ok());
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(limiter.try_acquire(ChatId(7)).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_entries_are_pruned() {
        let limiter = RateLimiter::new(Duration::from_millis(1));
        for id in 0..50 {
            assert!(limiter.try_acquire(ChatId(id)).await.is_ok());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(limiter.try_acquire(ChatId(1000)).await.is_ok());

        let limits = limiter.limits.lock().await;
        assert_eq!(limits.len(), 1);
        assert!(limits.contains_key(&ChatId(1000)));
    }
}
