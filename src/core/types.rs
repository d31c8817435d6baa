//! Shared domain types: tracks and search filters

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

pub const UNKNOWN_TRACK: &str = "Unknown track";
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// One audio item found on SoundCloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default = "unknown_track")]
    pub title: String,
    #[serde(default = "unknown_artist")]
    pub artist: String,
    /// Seconds, 0 when unknown
    #[serde(default, deserialize_with = "seconds_from_number")]
    pub duration: u32,
    /// Page URL handed to yt-dlp; empty when the candidate had none
    #[serde(default)]
    pub webpage_url: String,
    /// Size declared by the search results, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesize_approx: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

fn unknown_track() -> String {
    UNKNOWN_TRACK.to_string()
}

fn unknown_artist() -> String {
    UNKNOWN_ARTIST.to_string()
}

/// Accepts integer, float or null durations (yt-dlp reports floats).
fn seconds_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.min(u32::MAX as f64) as u32)
        .unwrap_or(0))
}

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, duration: u32, webpage_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            duration,
            webpage_url: webpage_url.into(),
            filesize_approx: None,
            thumbnail: None,
        }
    }

    /// Parsed source URL; only http(s) URLs are downloadable.
    pub fn source_url(&self) -> Option<Url> {
        let url = Url::parse(self.webpage_url.trim()).ok()?;
        matches!(url.scheme(), "http" | "https").then_some(url)
    }

    pub fn has_source_url(&self) -> bool {
        self.source_url().is_some()
    }
}

/// Maximum duration bucket chosen in the settings menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DurationFilter {
    #[default]
    #[serde(rename = "no_filter")]
    NoFilter,
    #[serde(rename = "up_to_5min")]
    UpTo5Min,
    #[serde(rename = "up_to_10min")]
    UpTo10Min,
    #[serde(rename = "up_to_20min")]
    UpTo20Min,
}

impl DurationFilter {
    /// Upper bound in seconds, `None` for no filter
    pub fn max_secs(self) -> Option<u32> {
        match self {
            Self::NoFilter => None,
            Self::UpTo5Min => Some(300),
            Self::UpTo10Min => Some(600),
            Self::UpTo20Min => Some(1200),
        }
    }

    /// Stable key used in callbacks, locales and the sessions file
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoFilter => "no_filter",
            Self::UpTo5Min => "up_to_5min",
            Self::UpTo10Min => "up_to_10min",
            Self::UpTo20Min => "up_to_20min",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.as_str() == s)
    }

    pub fn all() -> &'static [Self] {
        &[Self::NoFilter, Self::UpTo5Min, Self::UpTo10Min, Self::UpTo20Min]
    }
}

/// Per-user search filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub duration: DurationFilter,
    pub music_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_url_requires_http() {
        assert!(Track::new("a", "b", 10, "https://soundcloud.com/x/y").has_source_url());
        assert!(!Track::new("a", "b", 10, "").has_source_url());
        assert!(!Track::new("a", "b", 10, "file:///etc/passwd").has_source_url());
        assert!(!Track::new("a", "b", 10, "not a url").has_source_url());
    }

    #[test]
    fn test_track_accepts_float_duration_and_missing_fields() {
        let track: Track = serde_json::from_str(r#"{"title":"Song","duration":215.7,"webpage_url":"https://x.y"}"#)
            .expect("valid track json");
        assert_eq!(track.duration, 215);
        assert_eq!(track.artist, UNKNOWN_ARTIST);

        let track: Track = serde_json::from_str(r#"{"title":"Song","duration":null}"#).expect("valid track json");
        assert_eq!(track.duration, 0);
        assert_eq!(track.webpage_url, "");
    }

    #[test]
    fn test_duration_filter_keys() {
        for filter in DurationFilter::all() {
            assert_eq!(DurationFilter::parse(filter.as_str()), Some(*filter));
        }
        assert_eq!(DurationFilter::parse("up_to_1min"), None);
        assert_eq!(DurationFilter::UpTo10Min.max_secs(), Some(600));
        assert_eq!(
            serde_json::to_string(&DurationFilter::UpTo5Min).expect("serializable"),
            "\"up_to_5min\""
        );
    }
}
