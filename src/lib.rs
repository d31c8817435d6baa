//! cloudtune - Telegram bot that finds tracks on SoundCloud and sends them as audio
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, shared types and helpers
//! - `storage`: per-user session store and the shared charts cache
//! - `download`: yt-dlp extraction, search, and the download orchestrator
//! - `telegram`: bot setup, dispatcher schema, menus and handlers

pub mod cli;
pub mod core;
pub mod download;
pub mod i18n;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult, Track};
pub use download::{DeliverySink, DownloadOrchestrator, SearchService};
pub use storage::{JsonFileStore, MemoryStore, SessionStore};
