//! Integration tests for charts, mood playlists, recommendations and random picks
//!
//! Run with: cargo test --test discovery_test

mod mocks;

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

use cloudtune::download::discovery::find_playlist;
use cloudtune::download::{Discovery, MediaInfo, SearchService};
use cloudtune::storage::ChartsCache;
use cloudtune::Track;

use mocks::{entry, MockExtractor};

fn results() -> Vec<MediaInfo> {
    vec![
        entry("Sunset Boulevard", "beachhouse", 210.0, None),
        entry("Morning Dew (Official Video)", "fieldnotes", 185.0, None),
        entry("City Lights", "neonrider", 240.0, None),
    ]
}

fn discovery(extractor: MockExtractor, charts: Arc<ChartsCache>) -> Discovery {
    let search = SearchService::new(Arc::new(extractor), 3, Duration::from_secs(5));
    Discovery::new(search, charts).with_pause(Duration::ZERO)
}

#[tokio::test]
async fn test_stale_charts_are_refreshed_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("charts_cache.json");
    let charts = Arc::new(ChartsCache::load(&path));
    let discovery = discovery(MockExtractor::new().with_search_results(results()), charts);

    let tracks = discovery.charts_tracks(false).await;
    // 5 chart queries, 3 results each
    assert_eq!(tracks.len(), 15);
    assert!(tracks.iter().any(|t| t.title == "Morning Dew"));

    let reloaded = ChartsCache::load(&path);
    assert!(!reloaded.is_stale(24).await);
    assert_eq!(reloaded.snapshot().await.track_count(), 15);
}

#[tokio::test]
async fn test_empty_refresh_keeps_previous_charts() {
    let charts = Arc::new(ChartsCache::in_memory());
    let discovery = discovery(MockExtractor::new(), Arc::clone(&charts));

    assert!(discovery.charts_tracks(true).await.is_empty());
    assert!(charts.snapshot().await.last_update.is_none());
}

#[tokio::test]
async fn test_playlist_runs_its_first_queries() {
    let discovery = discovery(
        MockExtractor::new().with_search_results(results()),
        Arc::new(ChartsCache::in_memory()),
    );
    let playlist = find_playlist("rainy_day").unwrap();

    let tracks = discovery.playlist_tracks(playlist).await;
    assert_eq!(tracks.len(), 9);
}

#[tokio::test]
async fn test_recommendations_mix_history_with_popular() {
    let discovery = discovery(
        MockExtractor::new().with_search_results(results()),
        Arc::new(ChartsCache::in_memory()),
    );
    let history = vec![
        Track::new("Old Favourite", "someone", 200, "https://soundcloud.com/someone/old-favourite"),
        Track::new("City Lights", "neonrider", 240, "https://soundcloud.com/neonrider/city-lights"),
    ];

    let tracks = discovery.recommendations(&history).await;
    let mut titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["City Lights", "Morning Dew", "Old Favourite", "Sunset Boulevard"]);
}

#[tokio::test]
async fn test_recommendations_without_history_are_popular_only() {
    let discovery = discovery(
        MockExtractor::new().with_search_results(results()),
        Arc::new(ChartsCache::in_memory()),
    );
    let tracks = discovery.recommendations(&[]).await;
    assert_eq!(tracks.len(), 3);
}

#[tokio::test]
async fn test_random_track_skips_entries_without_url() {
    let mut entries = results();
    for e in entries.iter_mut().skip(1) {
        e.webpage_url = None;
    }
    let discovery = discovery(
        MockExtractor::new().with_search_results(entries),
        Arc::new(ChartsCache::in_memory()),
    );

    for _ in 0..5 {
        let picked = discovery.random_track("lo fi beats").await.unwrap().unwrap();
        assert_eq!(picked.title, "Sunset Boulevard");
    }
}

#[tokio::test]
async fn test_random_track_with_no_results_is_none() {
    let discovery = discovery(MockExtractor::new(), Arc::new(ChartsCache::in_memory()));
    assert!(discovery.random_track("lo fi beats").await.unwrap().is_none());
}
