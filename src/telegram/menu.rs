//! Screens: text plus inline keyboard for every menu the bot shows

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use unic_langid::LanguageIdentifier;

use crate::core::config::search::RESULTS_PER_PAGE;
use crate::core::types::{DurationFilter, Track};
use crate::core::utils::{escape_html, format_duration, shorten};
use crate::download::discovery::SMART_PLAYLISTS;
use crate::i18n::{self, SUPPORTED_LANGS};
use crate::storage::{ListingKind, UserSession};
use crate::telegram::callback::CallbackAction;

/// Text and keyboard of one screen
pub type Screen = (String, InlineKeyboardMarkup);

fn button(text: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.into(), action.encode())
}

fn t(lang: &LanguageIdentifier, key: &str) -> String {
    i18n::t(lang, key)
}

fn on_off(lang: &LanguageIdentifier, value: bool) -> String {
    t(lang, if value { "on" } else { "off" })
}

/// Localized label of a duration bucket
pub fn duration_label(lang: &LanguageIdentifier, filter: DurationFilter) -> String {
    t(lang, &filter.as_str().replace('_', "-"))
}

/// Pages needed for `len` items, at least one
pub fn page_count(len: usize) -> usize {
    len.div_ceil(RESULTS_PER_PAGE).max(1)
}

pub fn main_menu(lang: &LanguageIdentifier, first_name: &str) -> Screen {
    let mut args = FluentArgs::new();
    args.set("name", escape_html(first_name));
    let text = format!(
        "<b>{}</b>\n\n{}\n{}",
        t(lang, "main-menu"),
        i18n::t_args(lang, "welcome", &args),
        t(lang, "choose-action")
    );
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            button(t(lang, "random-track"), CallbackAction::RandomTrack),
            button(t(lang, "search-music"), CallbackAction::StartSearch),
        ],
        vec![
            button(t(lang, "top-charts"), CallbackAction::ShowCharts),
            button(t(lang, "mood"), CallbackAction::MoodPlaylists),
        ],
        vec![
            button(t(lang, "recommendations"), CallbackAction::ShowRecommendations),
            button(t(lang, "settings"), CallbackAction::Settings),
        ],
    ]);
    (text, keyboard)
}

pub fn back_to_main_keyboard(lang: &LanguageIdentifier) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button(t(lang, "back-to-main"), CallbackAction::BackToMain)]])
}

pub fn search_prompt(lang: &LanguageIdentifier) -> Screen {
    let text = format!("<b>{}</b>\n\n{}", t(lang, "search-title"), t(lang, "enter-query"));
    (text, back_to_main_keyboard(lang))
}

pub fn settings_menu(lang: &LanguageIdentifier, session: &UserSession) -> Screen {
    let mut language = FluentArgs::new();
    language.set("language", i18n::language_name(&session.preferences.language).to_string());
    let mut notifications = FluentArgs::new();
    notifications.set("status", on_off(lang, true));
    let mut duration = FluentArgs::new();
    duration.set("filter", duration_label(lang, session.filters.duration));
    let mut music = FluentArgs::new();
    music.set("status", on_off(lang, session.filters.music_only));

    let text = format!(
        "<b>{}</b>\n\n{}\n{}\n{}\n{}",
        t(lang, "settings-title"),
        i18n::t_args(lang, "current-language", &language),
        i18n::t_args(lang, "notifications", &notifications),
        i18n::t_args(lang, "duration-filter", &duration),
        i18n::t_args(lang, "music-only", &music),
    );

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![button(t(lang, "change-language"), CallbackAction::LanguageMenu)],
        vec![button(t(lang, "duration-menu"), CallbackAction::DurationMenu)],
        vec![button(i18n::t_args(lang, "toggle-music", &music), CallbackAction::ToggleMusic)],
        vec![button(t(lang, "back-to-main"), CallbackAction::BackToMain)],
    ]);
    (text, keyboard)
}

pub fn language_menu(lang: &LanguageIdentifier, current: &str) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = SUPPORTED_LANGS
        .iter()
        .map(|(code, name)| {
            let prefix = if *code == current { "✅ " } else { "◯ " };
            vec![button(
                format!("{}{}", prefix, name),
                CallbackAction::SetLanguage(code.to_string()),
            )]
        })
        .collect();
    rows.push(vec![button(t(lang, "back-to-settings"), CallbackAction::Settings)]);
    (t(lang, "choose-language"), InlineKeyboardMarkup::new(rows))
}

pub fn language_changed(lang: &LanguageIdentifier) -> Screen {
    (
        t(lang, "language-changed"),
        InlineKeyboardMarkup::new(vec![vec![button(t(lang, "ok"), CallbackAction::BackToMain)]]),
    )
}

pub fn duration_menu(lang: &LanguageIdentifier, current: DurationFilter) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = DurationFilter::all()
        .iter()
        .map(|filter| {
            let prefix = if *filter == current { "✅ " } else { "◯ " };
            vec![button(
                format!("{}{}", prefix, duration_label(lang, *filter)),
                CallbackAction::SetDuration(*filter),
            )]
        })
        .collect();
    rows.push(vec![button(t(lang, "back-to-settings"), CallbackAction::Settings)]);
    let text = format!("<b>{}</b>\n\n{}", t(lang, "duration-title"), t(lang, "choose-duration"));
    (text, InlineKeyboardMarkup::new(rows))
}

pub fn mood_menu(lang: &LanguageIdentifier) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = SMART_PLAYLISTS
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|p| {
                    button(
                        t(lang, &format!("playlist-{}-name", p.id)),
                        CallbackAction::Playlist(p.id.to_string()),
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![button(t(lang, "back-to-main"), CallbackAction::BackToMain)]);
    let text = format!("<b>{}</b>\n\n{}", t(lang, "mood-title"), t(lang, "choose-mood"));
    (text, InlineKeyboardMarkup::new(rows))
}

/// `🎵 3. Title • Artist • 03:35`
fn track_button_label(index: usize, track: &Track) -> String {
    format!(
        "🎵 {}. {} • {} • {}",
        index + 1,
        shorten(&track.title, 30),
        shorten(&track.artist, 18),
        format_duration(track.duration)
    )
}

fn listing_title_key(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Search => "search-results",
        ListingKind::Charts => "charts-title",
        ListingKind::Playlist => "mood-title",
        ListingKind::Recommendations => "recommendations-title",
    }
}

fn listing_header(lang: &LanguageIdentifier, kind: ListingKind, session: &UserSession, page: usize, pages: usize) -> String {
    let tracks = session.listing(kind);
    let mut lines = Vec::new();

    match kind {
        ListingKind::Playlist => {
            let name = session
                .current_playlist
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| t(lang, "mood-title"));
            lines.push(format!("<b>{}</b>", escape_html(&name)));
        }
        _ => lines.push(format!("<b>{}</b>", t(lang, listing_title_key(kind)))),
    }

    match kind {
        ListingKind::Search => lines.push(format!("<code>{}</code>", escape_html(&session.search_query))),
        ListingKind::Playlist => {
            if let Some(playlist) = session.current_playlist.as_ref() {
                lines.push(format!("💡 {}", escape_html(&playlist.description)));
            }
        }
        ListingKind::Recommendations => {
            if session.download_history.is_empty() {
                lines.push(t(lang, "popular-picks"));
            } else {
                let mut args = FluentArgs::new();
                args.set("count", session.download_history.len().min(10));
                lines.push(i18n::t_args(lang, "based-on-downloads", &args));
            }
        }
        ListingKind::Charts => {}
    }

    let mut page_args = FluentArgs::new();
    page_args.set("current", page + 1);
    page_args.set("total", pages);
    let mut found_args = FluentArgs::new();
    found_args.set("count", tracks.len());

    lines.push(String::new());
    lines.push(i18n::t_args(lang, "page", &page_args));
    lines.push(i18n::t_args(lang, "found", &found_args));
    lines.join("\n")
}

fn listing_extra_rows(lang: &LanguageIdentifier, kind: ListingKind) -> Vec<Vec<InlineKeyboardButton>> {
    match kind {
        ListingKind::Search => vec![
            vec![button(t(lang, "new-search"), CallbackAction::NewSearch)],
            vec![
                button(t(lang, "random-track"), CallbackAction::RandomTrack),
                button(t(lang, "settings"), CallbackAction::Settings),
            ],
        ],
        ListingKind::Charts => vec![
            vec![button(t(lang, "refresh"), CallbackAction::RefreshCharts)],
            vec![
                button(t(lang, "recommendations"), CallbackAction::ShowRecommendations),
                button(t(lang, "new-search"), CallbackAction::NewSearch),
            ],
            vec![button(t(lang, "back-to-main"), CallbackAction::BackToMain)],
        ],
        ListingKind::Playlist => vec![
            vec![button(t(lang, "other-mood"), CallbackAction::MoodPlaylists)],
            vec![
                button(t(lang, "new-search"), CallbackAction::NewSearch),
                button(t(lang, "back-to-main"), CallbackAction::BackToMain),
            ],
        ],
        ListingKind::Recommendations => vec![
            vec![button(t(lang, "refresh"), CallbackAction::RefreshRecommendations)],
            vec![
                button(t(lang, "random-track"), CallbackAction::RandomTrack),
                button(t(lang, "top-charts"), CallbackAction::ShowCharts),
            ],
            vec![
                button(t(lang, "new-search"), CallbackAction::NewSearch),
                button(t(lang, "back-to-main"), CallbackAction::BackToMain),
            ],
        ],
    }
}

/// One page of a listing. `page` is clamped into range.
pub fn listing_page(lang: &LanguageIdentifier, kind: ListingKind, session: &UserSession, page: usize) -> Screen {
    let tracks = session.listing(kind);
    let pages = page_count(tracks.len());
    let page = page.min(pages - 1);
    let start = page * RESULTS_PER_PAGE;

    let mut rows: Vec<Vec<InlineKeyboardButton>> = tracks
        .iter()
        .enumerate()
        .skip(start)
        .take(RESULTS_PER_PAGE)
        .map(|(i, track)| vec![button(track_button_label(i, track), CallbackAction::Download(kind, i))])
        .collect();

    if pages > 1 {
        let mut nav = Vec::new();
        if page > 0 {
            nav.push(button(t(lang, "back"), CallbackAction::Page(kind, page - 1)));
        }
        nav.push(button(format!("{}/{}", page + 1, pages), CallbackAction::Noop));
        if page + 1 < pages {
            nav.push(button(t(lang, "next"), CallbackAction::Page(kind, page + 1)));
        }
        rows.push(nav);
    }
    rows.extend(listing_extra_rows(lang, kind));

    (
        listing_header(lang, kind, session, page, pages),
        InlineKeyboardMarkup::new(rows),
    )
}

/// Message sent after a download started from a listing
pub fn return_to_list(lang: &LanguageIdentifier, kind: ListingKind, page: usize) -> Screen {
    let (key, back) = match kind {
        ListingKind::Search => ("to-search-results", CallbackAction::Page(kind, page)),
        ListingKind::Charts => ("to-charts", CallbackAction::ShowCharts),
        ListingKind::Playlist => ("to-playlist", CallbackAction::Page(kind, page)),
        ListingKind::Recommendations => ("to-recommendations", CallbackAction::ShowRecommendations),
    };
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![button(t(lang, key), back)],
        vec![button(t(lang, "back-to-main"), CallbackAction::BackToMain)],
    ]);
    (t(lang, "download-success-return"), keyboard)
}

pub fn random_success(lang: &LanguageIdentifier) -> Screen {
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![button(t(lang, "random-track"), CallbackAction::RandomTrack)],
        vec![
            button(t(lang, "recommendations"), CallbackAction::ShowRecommendations),
            button(t(lang, "search-music"), CallbackAction::StartSearch),
        ],
    ]);
    (t(lang, "random-success"), keyboard)
}

/// Card shown instead of an upload that would exceed the limit.
pub fn too_large_card(lang: &LanguageIdentifier, track: &Track, size_mb: f64, limit_mb: f64) -> Screen {
    let mut size = FluentArgs::new();
    size.set("size", format!("{:.1}", size_mb));
    let mut limit = FluentArgs::new();
    limit.set("limit", format!("{:.0}", limit_mb));

    let mut lines = vec![
        t(lang, "file-too-large-title"),
        String::new(),
        format!("🎵 <b>{}</b>", escape_html(&track.title)),
        format!("🎤 {}", escape_html(&track.artist)),
    ];
    if size_mb > 0.0 {
        lines.push(i18n::t_args(lang, "file-size", &size));
    }
    lines.push(String::new());
    lines.push(i18n::t_args(lang, "file-too-large-limit", &limit));
    lines.push(String::new());
    lines.push(t(lang, "file-too-large-hint"));

    let mut rows = Vec::new();
    if let Some(url) = track.source_url() {
        rows.push(vec![InlineKeyboardButton::url(t(lang, "listen-online"), url)]);
    }
    rows.push(vec![button(
        t(lang, "find-other-version"),
        CallbackAction::SearchAlt(track.title.clone()),
    )]);
    rows.push(vec![button(t(lang, "random-track"), CallbackAction::RandomTrack)]);

    (lines.join("\n"), InlineKeyboardMarkup::new(rows))
}
