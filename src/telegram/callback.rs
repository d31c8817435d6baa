//! Inline button payloads
//!
//! Every button carries `action[:param]` (at most 64 bytes, Telegram's limit).
//! The string is decoded once into a `CallbackAction` when the query arrives;
//! handlers only ever see the enum.

use crate::core::types::DurationFilter;
use crate::core::utils::truncate_bytes;
use crate::storage::ListingKind;

/// Telegram's hard limit for `callback_data`
pub const MAX_CALLBACK_BYTES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    BackToMain,
    StartSearch,
    NewSearch,
    RandomTrack,
    ShowCharts,
    RefreshCharts,
    MoodPlaylists,
    ShowRecommendations,
    RefreshRecommendations,
    Settings,
    LanguageMenu,
    SetLanguage(String),
    DurationMenu,
    SetDuration(DurationFilter),
    ToggleMusic,
    /// Open a mood playlist by id
    Playlist(String),
    /// Page of a listing
    Page(ListingKind, usize),
    /// Download track `index` of a listing
    Download(ListingKind, usize),
    /// Search again for a track that was too large
    SearchAlt(String),
    /// Page indicator button
    Noop,
}

fn page_action(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Search => "page",
        ListingKind::Charts => "charts_page",
        ListingKind::Playlist => "playlist_page",
        ListingKind::Recommendations => "rec_page",
    }
}

fn download_action(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Search => "download",
        ListingKind::Charts => "chart_download",
        ListingKind::Playlist => "playlist_download",
        ListingKind::Recommendations => "rec_download",
    }
}

impl CallbackAction {
    /// Decodes button data; `None` for anything unknown or malformed.
    pub fn parse(data: &str) -> Option<Self> {
        let (action, param) = match data.split_once(':') {
            Some((action, param)) => (action, Some(param)),
            None => (data, None),
        };
        let index = || param.and_then(|p| p.parse::<usize>().ok());

        let parsed = match (action, param) {
            ("back_to_main", None) => Self::BackToMain,
            ("start_search", None) => Self::StartSearch,
            ("new_search", None) => Self::NewSearch,
            ("random_track", None) => Self::RandomTrack,
            ("show_charts", None) => Self::ShowCharts,
            ("refresh_charts", None) => Self::RefreshCharts,
            ("mood_playlists", None) => Self::MoodPlaylists,
            ("show_recommendations", None) => Self::ShowRecommendations,
            ("refresh_recommendations", None) => Self::RefreshRecommendations,
            ("settings", None) => Self::Settings,
            ("language_menu", None) => Self::LanguageMenu,
            ("duration_menu", None) => Self::DurationMenu,
            ("toggle_music", None) => Self::ToggleMusic,
            ("current_page" | "charts_current_page" | "playlist_current_page" | "rec_current_page", _) => Self::Noop,
            ("set_language", Some(code)) if !code.is_empty() => Self::SetLanguage(code.to_string()),
            ("set_duration", Some(key)) => Self::SetDuration(DurationFilter::parse(key)?),
            ("playlist", Some(id)) if !id.is_empty() => Self::Playlist(id.to_string()),
            ("search_alt", Some(title)) if !title.trim().is_empty() => Self::SearchAlt(title.to_string()),
            ("page", Some(_)) => Self::Page(ListingKind::Search, index()?),
            ("charts_page", Some(_)) => Self::Page(ListingKind::Charts, index()?),
            ("playlist_page", Some(_)) => Self::Page(ListingKind::Playlist, index()?),
            ("rec_page", Some(_)) => Self::Page(ListingKind::Recommendations, index()?),
            ("download", Some(_)) => Self::Download(ListingKind::Search, index()?),
            ("chart_download", Some(_)) => Self::Download(ListingKind::Charts, index()?),
            ("playlist_download", Some(_)) => Self::Download(ListingKind::Playlist, index()?),
            ("rec_download", Some(_)) => Self::Download(ListingKind::Recommendations, index()?),
            _ => return None,
        };
        Some(parsed)
    }

    /// Encodes into button data, never longer than `MAX_CALLBACK_BYTES`.
    pub fn encode(&self) -> String {
        let data = match self {
            Self::BackToMain => "back_to_main".to_string(),
            Self::StartSearch => "start_search".to_string(),
            Self::NewSearch => "new_search".to_string(),
            Self::RandomTrack => "random_track".to_string(),
            Self::ShowCharts => "show_charts".to_string(),
            Self::RefreshCharts => "refresh_charts".to_string(),
            Self::MoodPlaylists => "mood_playlists".to_string(),
            Self::ShowRecommendations => "show_recommendations".to_string(),
            Self::RefreshRecommendations => "refresh_recommendations".to_string(),
            Self::Settings => "settings".to_string(),
            Self::LanguageMenu => "language_menu".to_string(),
            Self::SetLanguage(code) => format!("set_language:{}", code),
            Self::DurationMenu => "duration_menu".to_string(),
            Self::SetDuration(filter) => format!("set_duration:{}", filter.as_str()),
            Self::ToggleMusic => "toggle_music".to_string(),
            Self::Playlist(id) => format!("playlist:{}", id),
            Self::Page(kind, page) => format!("{}:{}", page_action(*kind), page),
            Self::Download(kind, index) => format!("{}:{}", download_action(*kind), index),
            Self::SearchAlt(title) => format!("search_alt:{}", title),
            Self::Noop => "current_page".to_string(),
        };
        truncate_bytes(&data, MAX_CALLBACK_BYTES).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_actions() {
        assert_eq!(
            CallbackAction::parse("chart_download:7"),
            Some(CallbackAction::Download(ListingKind::Charts, 7))
        );
        assert_eq!(
            CallbackAction::parse("rec_page:2"),
            Some(CallbackAction::Page(ListingKind::Recommendations, 2))
        );
        assert_eq!(CallbackAction::parse("page:x"), None);
        assert_eq!(CallbackAction::parse("download"), None);
    }

    #[test]
    fn test_parse_settings_actions() {
        assert_eq!(
            CallbackAction::parse("set_duration:up_to_10min"),
            Some(CallbackAction::SetDuration(DurationFilter::UpTo10Min))
        );
        assert_eq!(CallbackAction::parse("set_duration:forever"), None);
        assert_eq!(
            CallbackAction::parse("set_language:uk"),
            Some(CallbackAction::SetLanguage("uk".into()))
        );
    }

    #[test]
    fn test_page_indicators_are_noop() {
        for data in ["current_page", "charts_current_page", "rec_current_page"] {
            assert_eq!(CallbackAction::parse(data), Some(CallbackAction::Noop));
        }
    }

    #[test]
    fn test_unknown_data() {
        assert_eq!(CallbackAction::parse(""), None);
        assert_eq!(CallbackAction::parse("launch_rockets"), None);
        assert_eq!(CallbackAction::parse("back_to_main:extra"), None);
    }

    #[test]
    fn test_search_alt_fits_limit() {
        let action = CallbackAction::SearchAlt("Очень длинное название трека ".repeat(5));
        let encoded = action.encode();
        assert!(encoded.len() <= MAX_CALLBACK_BYTES);
        assert!(matches!(CallbackAction::parse(&encoded), Some(CallbackAction::SearchAlt(_))));
    }

    #[test]
    fn test_encode_parse_listing_buttons() {
        let kinds = [
            ListingKind::Search,
            ListingKind::Charts,
            ListingKind::Playlist,
            ListingKind::Recommendations,
        ];
        for kind in kinds {
            let download = CallbackAction::Download(kind, 12);
            assert_eq!(CallbackAction::parse(&download.encode()), Some(download));
        }
    }
}
