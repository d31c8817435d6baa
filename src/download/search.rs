//! SoundCloud search through the extractor
//!
//! Ranking is whatever yt-dlp returns; this module only normalizes the
//! candidates into `Track`s and applies the user's filters.

use lazy_regex::{regex, regex_replace_all};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::core::config::{self, search};
use crate::core::types::{SearchFilters, Track, UNKNOWN_ARTIST, UNKNOWN_TRACK};
use crate::core::{AppError, AppResult};
use crate::download::source::{Extractor, MediaInfo};

/// Words that mark talk content rather than music
const NON_MUSIC_WORDS: &[&str] = &["podcast", "interview", "lecture", "speech", "documentary", "concert"];

/// Music-only mode drops anything longer than this
const MUSIC_MAX_SECS: u32 = 3600;

/// Strips upload noise ("Official Video", "[HD]") from a title.
pub fn clean_title(raw: &str) -> String {
    let noise = regex!(r"(?i)\b(official music video|official video|lyric video|official audio|audio|hd|4k|1080p|720p)\b");
    let without_tags = noise.replace_all(raw, "");
    let without_empty = regex_replace_all!(r"\(\s*\)|\[\s*\]", &without_tags, "");
    let collapsed = regex_replace_all!(r"\s+", &without_empty, " ");
    collapsed.trim().to_string()
}

/// Converts one search entry into a `Track`; `None` when nothing usable remains.
pub fn track_from_entry(entry: MediaInfo) -> Option<Track> {
    let title = match entry.title.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            let cleaned = clean_title(raw);
            if cleaned.is_empty() {
                return None;
            }
            cleaned
        }
        _ => UNKNOWN_TRACK.to_string(),
    };

    let artist = [entry.uploader.as_deref(), entry.uploader_id.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_ARTIST)
        .to_string();

    let duration = entry
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d as u32)
        .unwrap_or(0);

    let filesize_approx = entry.declared_size_bytes();
    let webpage_url = entry.webpage_url.or(entry.url).unwrap_or_default();

    Some(Track {
        title,
        artist,
        duration,
        webpage_url,
        filesize_approx,
        thumbnail: entry.thumbnail,
    })
}

/// Applies the duration bucket and the music-only toggle.
/// Tracks with unknown duration pass the duration bucket.
pub fn matches_filters(track: &Track, filters: &SearchFilters) -> bool {
    if let Some(max) = filters.duration.max_secs() {
        if track.duration > max {
            return false;
        }
    }

    if filters.music_only {
        let title = track.title.to_lowercase();
        if NON_MUSIC_WORDS.iter().any(|w| title.contains(w)) {
            return false;
        }
        if track.duration > MUSIC_MAX_SECS {
            return false;
        }
    }

    true
}

/// Runs searches on the blocking pool behind their own concurrency gate.
#[derive(Clone)]
pub struct SearchService {
    extractor: Arc<dyn Extractor>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
    batch: usize,
}

impl SearchService {
    pub fn new(extractor: Arc<dyn Extractor>, max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            extractor,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
            batch: search::BATCH_SIZE,
        }
    }

    /// Service configured from the environment
    pub fn from_config(extractor: Arc<dyn Extractor>) -> Self {
        Self::new(
            extractor,
            config::queue::max_concurrent_searches(),
            config::timeouts::search(),
        )
    }

    /// Up to one batch of normalized tracks for `query`, in extractor order.
    pub async fn search(&self, query: &str) -> AppResult<Vec<Track>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("empty search query".to_string()));
        }

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| AppError::Extractor(format!("search gate closed: {}", e)))?;

        let extractor = Arc::clone(&self.extractor);
        let owned_query = query.to_string();
        let batch = self.batch;
        let task = tokio::task::spawn_blocking(move || extractor.search(&owned_query, batch));

        let entries = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_err)) => return Err(AppError::Extractor(format!("search worker failed: {}", join_err))),
            Err(_) => {
                log::warn!("⏰ Search for '{}' timed out after {:?}", query, self.timeout);
                return Err(AppError::Timeout(format!("search '{}'", query)));
            }
        };

        let tracks: Vec<Track> = entries.into_iter().filter_map(track_from_entry).collect();
        log::info!("🔍 Search '{}' returned {} tracks", query, tracks.len());
        Ok(tracks)
    }

    /// Like `search`, then drops tracks outside the user's filters.
    pub async fn search_filtered(&self, query: &str, filters: &SearchFilters) -> AppResult<Vec<Track>> {
        let tracks = self.search(query).await?;
        Ok(tracks.into_iter().filter(|t| matches_filters(t, filters)).collect())
    }

    /// First `limit` results for a discovery query; failures yield nothing.
    pub async fn top(&self, query: &str, limit: usize) -> Vec<Track> {
        match self.search(query).await {
            Ok(mut tracks) => {
                tracks.truncate(limit);
                tracks
            }
            Err(e) => {
                log::warn!("⚠️ Discovery query '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DurationFilter;

    #[test]
    fn test_clean_title_removes_noise() {
        assert_eq!(clean_title("Song Name (Official Video)"), "Song Name");
        assert_eq!(clean_title("Track [HD] [4K]"), "Track");
        assert_eq!(clean_title("Lofi   Beats   official AUDIO"), "Lofi Beats");
        assert_eq!(clean_title("Mix (Lyric Video) 1080p"), "Mix");
    }

    #[test]
    fn test_clean_title_keeps_words_containing_tags() {
        assert_eq!(clean_title("Audiomachine - Shadow"), "Audiomachine - Shadow");
        assert_eq!(clean_title("Shadows (Remix)"), "Shadows (Remix)");
    }

    #[test]
    fn test_entry_fallbacks() {
        let entry = MediaInfo {
            title: Some("Night Drive".into()),
            uploader_id: Some("synth-guy".into()),
            url: Some("https://soundcloud.com/synth-guy/night-drive".into()),
            ..Default::default()
        };
        let track = track_from_entry(entry).expect("usable entry");
        assert_eq!(track.artist, "synth-guy");
        assert_eq!(track.duration, 0);
        assert_eq!(track.webpage_url, "https://soundcloud.com/synth-guy/night-drive");

        let nameless = track_from_entry(MediaInfo::default()).expect("unknown title is kept");
        assert_eq!(nameless.title, UNKNOWN_TRACK);
        assert_eq!(nameless.artist, UNKNOWN_ARTIST);
    }

    #[test]
    fn test_entry_with_only_noise_is_dropped() {
        let entry = MediaInfo {
            title: Some("(Official Video) [HD]".into()),
            ..Default::default()
        };
        assert!(track_from_entry(entry).is_none());
    }

    #[test]
    fn test_duration_filter() {
        let filters = SearchFilters {
            duration: DurationFilter::UpTo5Min,
            music_only: false,
        };
        assert!(matches_filters(&Track::new("a", "b", 299, ""), &filters));
        assert!(matches_filters(&Track::new("a", "b", 0, ""), &filters));
        assert!(!matches_filters(&Track::new("a", "b", 301, ""), &filters));
    }

    #[test]
    fn test_music_only_filter() {
        let filters = SearchFilters {
            duration: DurationFilter::NoFilter,
            music_only: true,
        };
        assert!(!matches_filters(&Track::new("Tech Podcast #12", "b", 900, ""), &filters));
        assert!(!matches_filters(&Track::new("Mixtape", "b", 4000, ""), &filters));
        assert!(matches_filters(&Track::new("Mixtape", "b", 3000, ""), &filters));
    }
}
