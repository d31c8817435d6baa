//! What the bot remembers about a user

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::config::search::{DOWNLOAD_HISTORY_LIMIT, SEARCH_HISTORY_LIMIT};
use crate::core::types::{SearchFilters, Track};

/// Timestamp format of the stats block
pub const STATS_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Usage counters, stored under `_user_stats` in the sessions file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStats {
    pub searches: u64,
    pub downloads: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_search: Option<String>,
}

impl UserStats {
    fn touch(&mut self, now: &str) {
        if self.first_seen.is_none() {
            self.first_seen = Some(now.to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}

/// A mood playlist the user is paging through
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistListing {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tracks: Vec<Track>,
}

/// The four paged track lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Search,
    Charts,
    Playlist,
    Recommendations,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSession {
    pub filters: SearchFilters,
    pub search_query: String,
    pub search_results: Vec<Track>,
    pub current_page: usize,
    pub current_charts: Vec<Track>,
    pub charts_page: usize,
    pub current_playlist: Option<PlaylistListing>,
    pub playlist_page: usize,
    pub current_recommendations: Vec<Track>,
    pub recommendations_page: usize,
    /// Newest first, no duplicates
    pub search_history: Vec<String>,
    /// Oldest first
    pub download_history: Vec<Track>,
    pub preferences: Preferences,
    #[serde(skip)]
    pub stats: UserStats,
}

fn now_stamp() -> String {
    Local::now().format(STATS_TIME_FORMAT).to_string()
}

impl UserSession {
    /// Stores a new search listing and updates history and counters.
    pub fn record_search(&mut self, query: &str, results: Vec<Track>) {
        self.search_query = query.to_string();
        self.search_results = results;
        self.current_page = 0;

        self.search_history.retain(|q| q != query);
        self.search_history.insert(0, query.to_string());
        self.search_history.truncate(SEARCH_HISTORY_LIMIT);

        self.count_search();
    }

    /// Counts a search that leaves the listing and history alone (random picks).
    pub fn count_search(&mut self) {
        let now = now_stamp();
        self.stats.touch(&now);
        self.stats.searches += 1;
        self.stats.last_search = Some(now);
    }

    /// Appends to the bounded download history and bumps the counter.
    pub fn record_download(&mut self, track: Track) {
        self.download_history.push(track);
        if self.download_history.len() > DOWNLOAD_HISTORY_LIMIT {
            let excess = self.download_history.len() - DOWNLOAD_HISTORY_LIMIT;
            self.download_history.drain(..excess);
        }
        self.stats.touch(&now_stamp());
        self.stats.downloads += 1;
    }

    /// No search in the last `days` days, or never searched at all.
    pub fn is_inactive(&self, now: NaiveDateTime, days: i64) -> bool {
        let Some(last) = self.stats.last_search.as_deref() else {
            return true;
        };
        match NaiveDateTime::parse_from_str(last, STATS_TIME_FORMAT) {
            Ok(last) => (now - last).num_days() > days,
            Err(_) => true,
        }
    }

    pub fn listing(&self, kind: ListingKind) -> &[Track] {
        match kind {
            ListingKind::Search => &self.search_results,
            ListingKind::Charts => &self.current_charts,
            ListingKind::Playlist => self.current_playlist.as_ref().map(|p| p.tracks.as_slice()).unwrap_or(&[]),
            ListingKind::Recommendations => &self.current_recommendations,
        }
    }

    pub fn page(&self, kind: ListingKind) -> usize {
        match kind {
            ListingKind::Search => self.current_page,
            ListingKind::Charts => self.charts_page,
            ListingKind::Playlist => self.playlist_page,
            ListingKind::Recommendations => self.recommendations_page,
        }
    }

    pub fn set_page(&mut self, kind: ListingKind, page: usize) {
        match kind {
            ListingKind::Search => self.current_page = page,
            ListingKind::Charts => self.charts_page = page,
            ListingKind::Playlist => self.playlist_page = page,
            ListingKind::Recommendations => self.recommendations_page = page,
        }
    }

    /// Track at `index` of a listing, if still there
    pub fn listing_track(&self, kind: ListingKind, index: usize) -> Option<&Track> {
        self.listing(kind).get(index)
    }
}
