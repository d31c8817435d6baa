//! Extraction backend abstraction.
//!
//! The `Extractor` trait covers the three things the bot asks of yt-dlp:
//! search, a size/duration probe that fetches no payload, and a real download
//! into a directory. Calls are blocking; async callers run them through
//! `tokio::task::spawn_blocking`.

pub mod ytdlp;

use serde::Deserialize;
use std::path::Path;

use crate::download::error::ExtractorError;

pub use ytdlp::YtDlpExtractor;

/// Subset of the yt-dlp info dict the bot reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub uploader_id: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub filesize: Option<f64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
}

impl MediaInfo {
    /// Declared size, else the approximate one. Zero counts as unknown.
    pub fn declared_size_bytes(&self) -> Option<u64> {
        let positive = |v: Option<f64>| v.filter(|b| b.is_finite() && *b > 0.0).map(|b| b as u64);
        positive(self.filesize).or_else(|| positive(self.filesize_approx))
    }
}

/// Output of `scsearchN:` with `--flat-playlist`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchPlaylist {
    #[serde(default)]
    pub entries: Vec<Option<MediaInfo>>,
}

/// Blocking extraction backend.
pub trait Extractor: Send + Sync {
    /// Returns up to `limit` candidates for a free-text query, in backend order.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<MediaInfo>, ExtractorError>;

    /// Reads metadata (including size when declared) without fetching the payload.
    fn probe(&self, url: &str) -> Result<MediaInfo, ExtractorError>;

    /// Downloads the best audio of `url` into `output_dir` and returns what was written.
    fn download(&self, url: &str, output_dir: &Path) -> Result<MediaInfo, ExtractorError>;
}
