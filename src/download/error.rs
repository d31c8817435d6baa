use std::fmt;
use thiserror::Error;

/// Failures of a single yt-dlp invocation.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The binary could not be started
    #[error("failed to run yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),
    /// yt-dlp exited unsuccessfully
    #[error("yt-dlp exited with {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
    /// Output was not the JSON we asked for
    #[error("unexpected yt-dlp output: {0}")]
    Parse(#[from] serde_json::Error),
    /// Process-level deadline hit, the child was killed
    #[error("yt-dlp killed after {0}s")]
    TimedOut(u64),
}

/// Why a delivery attempt ended without an audio message.
///
/// Every variant is an expected outcome the user gets a status line for;
/// none of them escapes the handler.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryFailure {
    /// The track has no usable http(s) source URL
    MissingUrl,
    /// Estimated or actual size is over the limit
    TooLarge { size_mb: f64, limit_mb: f64 },
    /// Download did not finish within the selected timeout
    Timeout { secs: u64 },
    /// yt-dlp failed or the worker crashed
    Extraction(String),
    /// Download finished but left no Telegram-compatible audio file
    NoAudioFile,
    /// Telegram refused the upload
    SendFailed(String),
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryFailure::MissingUrl => write!(f, "track has no source URL"),
            DeliveryFailure::TooLarge { size_mb, limit_mb } => {
                write!(f, "file is {:.1} MB, limit {:.0} MB", size_mb, limit_mb)
            }
            DeliveryFailure::Timeout { secs } => write!(f, "download timed out after {}s", secs),
            DeliveryFailure::Extraction(msg) => write!(f, "{}", msg),
            DeliveryFailure::NoAudioFile => write!(f, "no compatible audio file found"),
            DeliveryFailure::SendFailed(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DeliveryFailure {}

impl DeliveryFailure {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DeliveryFailure::MissingUrl => "missing_url",
            DeliveryFailure::TooLarge { .. } => "too_large",
            DeliveryFailure::Timeout { .. } => "timeout",
            DeliveryFailure::Extraction(_) => "extraction",
            DeliveryFailure::NoAudioFile => "file_not_found",
            DeliveryFailure::SendFailed(_) => "send_failed",
        }
    }

    /// Size-limit outcomes are an expected branch, not an error.
    pub fn is_size_limit(&self) -> bool {
        matches!(self, DeliveryFailure::TooLarge { .. })
    }
}
