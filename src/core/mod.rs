//! Core utilities, configuration, and common functionality

pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod rate_limiter;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::DownloadLimits;
pub use error::{AppError, AppResult};
pub use logging::{init_logger, log_startup_configuration};
pub use types::{DurationFilter, SearchFilters, Track};
pub use utils::{escape_html, format_duration, shorten, truncate_chars};
