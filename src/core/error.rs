use thiserror::Error;

/// Centralized error types for the application
///
/// Everything that can fail inside a handler ends up here so the dispatcher
/// can log it and reply with a short status line.
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// yt-dlp failures (spawn, non-zero exit, unparsable output)
    #[error("Extractor error: {0}")]
    Extractor(String),

    /// An operation did not finish in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization of the data files
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or invalid startup configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl From<crate::download::ExtractorError> for AppError {
    fn from(err: crate::download::ExtractorError) -> Self {
        match err {
            crate::download::ExtractorError::TimedOut(secs) => {
                AppError::Timeout(format!("yt-dlp did not finish within {}s", secs))
            }
            other => AppError::Extractor(other.to_string()),
        }
    }
}

impl AppError {
    /// Short category name for logs
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Telegram(_) => "telegram",
            AppError::Extractor(_) => "extractor",
            AppError::Timeout(_) => "timeout",
            AppError::Io(_) => "io",
            AppError::Json(_) => "json",
            AppError::Url(_) => "url",
            AppError::Config(_) => "config",
            AppError::Validation(_) => "validation",
            AppError::Anyhow(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::ExtractorError;

    #[test]
    fn test_extractor_timeout_maps_to_timeout() {
        let err: AppError = ExtractorError::TimedOut(42).into();
        assert_eq!(err.category(), "timeout");
        assert!(err.to_string().contains("42s"));
    }

    #[test]
    fn test_extractor_failure_maps_to_extractor() {
        let err: AppError = ExtractorError::Failed {
            code: Some(1),
            stderr: "ERROR: Unable to download".to_string(),
        }
        .into();
        assert_eq!(err.category(), "extractor");
        assert!(err.to_string().contains("Unable to download"));
    }
}
