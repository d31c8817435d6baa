//! Charts, mood playlists, recommendations and random picks.
//!
//! Everything here is built from plain searches; there is no ranking of our own.

use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::discovery;
use crate::core::types::Track;
use crate::core::AppResult;
use crate::download::search::SearchService;
use crate::storage::ChartsCache;

pub const POPULAR_SEARCHES: &[&str] = &[
    "the weeknd",
    "taylor swift",
    "bad bunny",
    "ariana grande",
    "drake",
    "billie eilish",
    "ed sheeran",
    "dualipa",
    "post malone",
    "kanye west",
    "coldplay",
    "maroon 5",
    "bruno mars",
    "adele",
    "justin bieber",
    "kendrick lamar",
    "travis scott",
    "doja cat",
    "olivia rodrigo",
    "harry styles",
];

pub const RANDOM_SEARCHES: &[&str] = &[
    "lo fi beats",
    "chillhop",
    "deep house",
    "synthwave",
    "indie rock",
    "electronic music",
    "jazz lounge",
    "ambient",
    "study music",
    "focus music",
    "relaxing music",
    "instrumental",
    "acoustic",
    "piano covers",
    "guitar music",
    "vocal trance",
    "dubstep",
    "tropical house",
    "future bass",
    "retro wave",
    "city pop",
    "latin music",
    "reggeaton",
    "k-pop",
    "j-pop",
    "classical piano",
    "orchestral",
    "film scores",
    "video game music",
    "retro gaming",
    "chill beats",
    "lounge music",
    "smooth jazz",
    "progressive house",
    "techno music",
    "trance music",
    "hip hop instrumental",
    "rap beats",
];

/// A mood playlist; name and description live in the locale files
/// under `playlist-<id>-name` / `playlist-<id>-desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmartPlaylist {
    pub id: &'static str,
    pub queries: &'static [&'static str],
}

pub const SMART_PLAYLISTS: &[SmartPlaylist] = &[
    SmartPlaylist {
        id: "morning",
        queries: &["morning music", "wake up music", "positive morning", "upbeat acoustic", "fresh start"],
    },
    SmartPlaylist {
        id: "romance",
        queries: &["romantic music", "love songs", "slow dance", "intimate music", "couple music"],
    },
    SmartPlaylist {
        id: "nostalgia",
        queries: &["80s hits", "90s music", "retro classics", "oldies but goldies", "vintage hits"],
    },
    SmartPlaylist {
        id: "work_focus",
        queries: &["lo fi study", "focus music", "ambient study", "coding music", "deep work"],
    },
    SmartPlaylist {
        id: "workout",
        queries: &["workout music", "gym motivation", "edm workout", "hip hop workout", "energy music"],
    },
    SmartPlaylist {
        id: "relax",
        queries: &["chillhop", "ambient relax", "piano relax", "meditation music", "calm music"],
    },
    SmartPlaylist {
        id: "party",
        queries: &["party hits", "dance music", "club mix", "top hits", "festival music"],
    },
    SmartPlaylist {
        id: "road_trip",
        queries: &["road trip", "driving music", "travel mix", "adventure music", "scenic drive"],
    },
    SmartPlaylist {
        id: "sleep",
        queries: &["sleep music", "deep sleep", "calming sleep", "piano sleep", "ambient sleep"],
    },
    SmartPlaylist {
        id: "rainy_day",
        queries: &["rainy day music", "cozy jazz", "rain sounds lofi", "indie rainy day", "chill rainy"],
    },
    SmartPlaylist {
        id: "electronic",
        queries: &[
            "electronic music",
            "edm",
            "techno",
            "house music",
            "trance",
            "dubstep",
            "drum and bass",
            "synthwave",
        ],
    },
];

pub fn find_playlist(id: &str) -> Option<&'static SmartPlaylist> {
    SMART_PLAYLISTS.iter().find(|p| p.id == id)
}

pub fn random_query() -> &'static str {
    RANDOM_SEARCHES.choose(&mut rand::thread_rng()).copied().unwrap_or("lo fi beats")
}

/// Keeps the first track of each title.
fn dedup_by_title(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks.into_iter().filter(|t| seen.insert(t.title.clone())).collect()
}

fn shuffled(mut tracks: Vec<Track>, limit: usize) -> Vec<Track> {
    tracks.shuffle(&mut rand::thread_rng());
    tracks.truncate(limit);
    tracks
}

pub struct Discovery {
    search: SearchService,
    charts: Arc<ChartsCache>,
    refreshing: AtomicBool,
    pause: Duration,
}

impl Discovery {
    pub fn new(search: SearchService, charts: Arc<ChartsCache>) -> Self {
        Self {
            search,
            charts,
            refreshing: AtomicBool::new(false),
            pause: discovery::query_pause(),
        }
    }

    /// Pause between consecutive discovery queries
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }

    pub fn charts_cache(&self) -> &ChartsCache {
        &self.charts
    }

    /// Runs `queries` one after another, `per_query` results each.
    async fn collect(&self, queries: &[&str], per_query: usize) -> Vec<(String, Vec<Track>)> {
        let mut out = Vec::with_capacity(queries.len());
        for (i, query) in queries.iter().enumerate() {
            if i > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            out.push((query.to_string(), self.search.top(query, per_query).await));
        }
        out
    }

    /// Re-runs the chart queries and rewrites the cache.
    /// A refresh already in flight makes this a no-op.
    pub async fn refresh_charts(&self) -> AppResult<()> {
        if self.refreshing.swap(true, Ordering::SeqCst) {
            log::info!("📊 Charts refresh already running");
            return Ok(());
        }

        log::info!("📊 Refreshing charts");
        let queries = &POPULAR_SEARCHES[..discovery::CHARTS_QUERIES.min(POPULAR_SEARCHES.len())];
        let data: BTreeMap<String, Vec<Track>> = self
            .collect(queries, discovery::CHARTS_TRACKS_PER_QUERY)
            .await
            .into_iter()
            .filter(|(_, tracks)| !tracks.is_empty())
            .collect();

        let result = if data.is_empty() {
            log::warn!("⚠️ Charts refresh returned nothing, keeping old cache");
            Ok(())
        } else {
            self.charts.replace(data).await
        };
        self.refreshing.store(false, Ordering::SeqCst);
        result
    }

    /// Chart listing, refreshing the cache first when it is stale.
    pub async fn charts_tracks(&self, force_refresh: bool) -> Vec<Track> {
        if force_refresh || self.charts.is_stale(discovery::CHARTS_TTL_HOURS).await {
            if let Err(e) = self.refresh_charts().await {
                log::error!("❌ Charts refresh failed: {}", e);
            }
        }
        shuffled(self.charts.all_tracks().await, discovery::LISTING_LIMIT)
    }

    /// Tracks for a mood playlist: its first few queries, shuffled.
    pub async fn playlist_tracks(&self, playlist: &SmartPlaylist) -> Vec<Track> {
        let queries = &playlist.queries[..discovery::PLAYLIST_QUERIES.min(playlist.queries.len())];
        let tracks: Vec<Track> = self
            .collect(queries, discovery::PLAYLIST_TRACKS_PER_QUERY)
            .await
            .into_iter()
            .flat_map(|(_, tracks)| tracks)
            .collect();
        shuffled(tracks, discovery::LISTING_LIMIT)
    }

    async fn popular_tracks(&self, limit: usize) -> Vec<Track> {
        let queries = &POPULAR_SEARCHES[..discovery::POPULAR_QUERIES.min(POPULAR_SEARCHES.len())];
        let tracks: Vec<Track> = self
            .collect(queries, discovery::POPULAR_TRACKS_PER_QUERY)
            .await
            .into_iter()
            .flat_map(|(_, tracks)| tracks)
            .collect();
        shuffled(tracks, limit)
    }

    /// Recent downloads mixed with popular tracks; popular only without history.
    pub async fn recommendations(&self, download_history: &[Track]) -> Vec<Track> {
        let limit = discovery::LISTING_LIMIT;
        if download_history.is_empty() {
            return shuffled(dedup_by_title(self.popular_tracks(limit).await), limit);
        }

        let recent_start = download_history.len().saturating_sub(discovery::RECENT_DOWNLOADS);
        let mut tracks: Vec<Track> = download_history[recent_start..].iter().rev().cloned().collect();
        tracks.extend(self.popular_tracks(limit / 2).await);
        shuffled(dedup_by_title(tracks), limit)
    }

    /// Searches `query` and picks one downloadable result at random.
    pub async fn random_track(&self, query: &str) -> AppResult<Option<Track>> {
        let tracks = self.search.search(query).await?;
        let candidates: Vec<&Track> = tracks.iter().filter(|t| t.has_source_url()).collect();
        Ok(candidates.choose(&mut rand::thread_rng()).map(|t| (*t).clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlists_are_unique_and_findable() {
        let mut ids: Vec<_> = SMART_PLAYLISTS.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 11);
        assert!(find_playlist("rainy_day").is_some());
        assert!(find_playlist("unknown").is_none());
        assert!(SMART_PLAYLISTS.iter().all(|p| p.queries.len() >= discovery::PLAYLIST_QUERIES));
    }

    #[test]
    fn test_random_query_comes_from_list() {
        for _ in 0..20 {
            assert!(RANDOM_SEARCHES.contains(&random_query()));
        }
    }

    #[test]
    fn test_dedup_by_title_keeps_first() {
        let tracks = vec![
            Track::new("same", "a", 1, "https://x.y/1"),
            Track::new("other", "b", 1, "https://x.y/2"),
            Track::new("same", "c", 1, "https://x.y/3"),
        ];
        let deduped = dedup_by_title(tracks);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].artist, "a");
    }
}
