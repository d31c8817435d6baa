//! Where the orchestrator reports to.
//!
//! `DeliverySink` is the only thing the orchestrator knows about chats: the
//! Telegram implementation edits a status message and uploads audio, tests
//! record every call.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::core::config::limits;
use crate::core::types::Track;
use crate::core::utils::{escape_html, format_duration, truncate_chars};
use crate::core::AppResult;
use crate::download::progress::Stage;

/// Audio attachment ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct AudioUpload {
    pub path: PathBuf,
    pub title: String,
    pub performer: String,
    /// HTML caption
    pub caption: String,
    pub duration: u32,
    pub size_mb: f64,
}

impl AudioUpload {
    pub fn new(path: PathBuf, track: &Track, size_mb: f64) -> Self {
        Self {
            path,
            title: truncate_chars(&track.title, limits::AUDIO_FIELD_MAX_CHARS),
            performer: truncate_chars(&track.artist, limits::AUDIO_FIELD_MAX_CHARS),
            caption: audio_caption(track, size_mb),
            duration: track.duration,
            size_mb,
        }
    }
}

/// `🎵 <b>title</b>` / artist / `MM:SS` / size
pub fn audio_caption(track: &Track, size_mb: f64) -> String {
    format!(
        "🎵 <b>{}</b>\n🎤 {}\n⏱️ {}\n💾 {:.1} MB",
        escape_html(&track.title),
        escape_html(&track.artist),
        format_duration(track.duration),
        size_mb
    )
}

#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Shows a stage transition. Failures to display are the sink's problem.
    async fn show_stage(&self, stage: &Stage, track: &Track);

    /// Offers the track page instead of a file that is over the limit.
    async fn offer_external_link(&self, track: &Track, size_mb: f64, limit_mb: f64);

    /// Uploads the audio file.
    async fn send_audio(&self, upload: AudioUpload) -> AppResult<()>;
}
