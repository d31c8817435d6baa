//! Search, charts, mood playlists, recommendations and downloads from them

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use unic_langid::LanguageIdentifier;

use super::types::{HandlerDeps, HandlerError};
use crate::core::config::search::MIN_QUERY_CHARS;
use crate::core::types::Track;
use crate::core::utils::escape_html;
use crate::download::discovery::{find_playlist, random_query};
use crate::download::{ProgressTracker, Stage};
use crate::i18n;
use crate::storage::{load_session, update_session, ListingKind, PlaylistListing};
use crate::telegram::menu;
use crate::telegram::sink::{edit_or_send, TelegramSink};
use crate::telegram::Bot;

fn store_update<F>(deps: &HandlerDeps, chat_id: ChatId, f: F)
where
    F: FnOnce(&mut crate::storage::UserSession),
{
    if let Err(e) = update_session(deps.store.as_ref(), chat_id.0, f) {
        log::error!("❌ Failed to save session for {}: {}", chat_id, e);
    }
}

/// Shows a page of a stored listing in place of `message_id`.
pub(super) async fn show_listing(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    kind: ListingKind,
    page: usize,
) -> Result<(), HandlerError> {
    let lang = deps.lang(chat_id);
    let session = load_session(deps.store.as_ref(), chat_id.0);
    if session.listing(kind).is_empty() {
        edit_or_send(
            bot,
            chat_id,
            message_id,
            i18n::t(&lang, "error-nothing-found"),
            Some(menu::back_to_main_keyboard(&lang)),
        )
        .await?;
        return Ok(());
    }

    let page = page.min(menu::page_count(session.listing(kind).len()) - 1);
    store_update(deps, chat_id, |s| s.set_page(kind, page));

    let (text, keyboard) = menu::listing_page(&lang, kind, &session, page);
    edit_or_send(bot, chat_id, message_id, text, Some(keyboard)).await?;
    Ok(())
}

/// Runs a search and shows the first page of results.
pub(super) async fn run_search(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    query: &str,
) -> Result<(), HandlerError> {
    let lang = deps.lang(chat_id);
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        bot.send_message(chat_id, i18n::t(&lang, "error-min-chars")).await?;
        return Ok(());
    }

    log::info!("🔍 User {} searches '{}'", chat_id, query);
    let status = edit_or_send(bot, chat_id, message_id, i18n::t(&lang, "searching"), None).await?;

    let filters = load_session(deps.store.as_ref(), chat_id.0).filters;
    let tracks = match deps.discovery.search().search_filtered(query, &filters).await {
        Ok(tracks) => tracks,
        Err(e) => {
            log::error!("❌ Search '{}' failed: {}", query, e);
            edit_or_send(
                bot,
                chat_id,
                Some(status),
                i18n::t(&lang, "error-search"),
                Some(menu::back_to_main_keyboard(&lang)),
            )
            .await?;
            return Ok(());
        }
    };

    if tracks.is_empty() {
        edit_or_send(
            bot,
            chat_id,
            Some(status),
            i18n::t(&lang, "error-nothing-found"),
            Some(menu::back_to_main_keyboard(&lang)),
        )
        .await?;
        return Ok(());
    }

    let owned_query = query.to_string();
    store_update(deps, chat_id, move |s| s.record_search(&owned_query, tracks));
    show_listing(bot, deps, chat_id, Some(status), ListingKind::Search, 0).await
}

pub(super) async fn show_charts(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    force_refresh: bool,
) -> Result<(), HandlerError> {
    let lang = deps.lang(chat_id);
    let status = edit_or_send(bot, chat_id, message_id, i18n::t(&lang, "loading-charts"), None).await?;

    let tracks = deps.discovery.charts_tracks(force_refresh).await;
    store_update(deps, chat_id, move |s| {
        s.current_charts = tracks;
        s.charts_page = 0;
    });
    show_listing(bot, deps, chat_id, Some(status), ListingKind::Charts, 0).await
}

pub(super) async fn show_playlist(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    playlist_id: &str,
) -> Result<(), HandlerError> {
    let lang = deps.lang(chat_id);
    let Some(playlist) = find_playlist(playlist_id) else {
        edit_or_send(
            bot,
            chat_id,
            message_id,
            i18n::t(&lang, "error-playlist-not-found"),
            Some(menu::back_to_main_keyboard(&lang)),
        )
        .await?;
        return Ok(());
    };

    let name = i18n::t(&lang, &format!("playlist-{}-name", playlist.id));
    let description = i18n::t(&lang, &format!("playlist-{}-desc", playlist.id));
    let mut args = FluentArgs::new();
    args.set("name", escape_html(&name));
    let status = edit_or_send(
        bot,
        chat_id,
        message_id,
        i18n::t_args(&lang, "creating-playlist", &args),
        None,
    )
    .await?;

    let tracks = deps.discovery.playlist_tracks(playlist).await;
    log::info!("🎭 Playlist '{}' for {}: {} tracks", playlist.id, chat_id, tracks.len());
    let listing = PlaylistListing {
        id: playlist.id.to_string(),
        name,
        description,
        tracks,
    };
    store_update(deps, chat_id, move |s| {
        s.current_playlist = Some(listing);
        s.playlist_page = 0;
    });
    show_listing(bot, deps, chat_id, Some(status), ListingKind::Playlist, 0).await
}

pub(super) async fn show_recommendations(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
) -> Result<(), HandlerError> {
    let lang = deps.lang(chat_id);
    let status = edit_or_send(
        bot,
        chat_id,
        message_id,
        i18n::t(&lang, "loading-recommendations"),
        None,
    )
    .await?;

    let history = load_session(deps.store.as_ref(), chat_id.0).download_history;
    let tracks = deps.discovery.recommendations(&history).await;
    store_update(deps, chat_id, move |s| {
        s.current_recommendations = tracks;
        s.recommendations_page = 0;
    });
    show_listing(bot, deps, chat_id, Some(status), ListingKind::Recommendations, 0).await
}

/// Applies the per-chat download cooldown; `false` means the user was told to wait.
async fn check_cooldown(bot: &Bot, deps: &HandlerDeps, chat_id: ChatId, lang: &LanguageIdentifier) -> Result<bool, HandlerError> {
    match deps.rate_limiter.try_acquire(chat_id).await {
        Ok(()) => Ok(true),
        Err(remaining) => {
            let mut args = FluentArgs::new();
            args.set("seconds", remaining.as_secs().max(1));
            bot.send_message(chat_id, i18n::t_args(lang, "error-rate-limit", &args))
                .await?;
            Ok(false)
        }
    }
}

/// Downloads track `index` of a listing and offers the way back to it.
pub(super) async fn download_from_listing(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    kind: ListingKind,
    index: usize,
) -> Result<(), HandlerError> {
    let lang = deps.lang(chat_id);
    let session = load_session(deps.store.as_ref(), chat_id.0);
    let Some(track) = session.listing_track(kind, index).cloned() else {
        bot.send_message(chat_id, i18n::t(&lang, "error-track-not-found")).await?;
        return Ok(());
    };

    if !check_cooldown(bot, deps, chat_id, &lang).await? {
        return Ok(());
    }

    let sink = TelegramSink::new(bot.clone(), chat_id, lang.clone());
    if deps.orchestrator.download_and_deliver(chat_id.0, &track, &sink).await {
        let (text, keyboard) = menu::return_to_list(&lang, kind, session.page(kind));
        bot.send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;
    }
    Ok(())
}

/// Picks a random query, then a random result, and delivers it.
pub(super) async fn random_track(bot: &Bot, deps: &HandlerDeps, chat_id: ChatId) -> Result<(), HandlerError> {
    let lang = deps.lang(chat_id);
    if !check_cooldown(bot, deps, chat_id, &lang).await? {
        return Ok(());
    }

    let query = random_query();
    log::info!("🎲 Random track for {} with query '{}'", chat_id, query);

    let mut args = FluentArgs::new();
    args.set("query", escape_html(query));
    let status = bot
        .send_message(chat_id, i18n::t_args(&lang, "random-searching", &args))
        .parse_mode(ParseMode::Html)
        .await?;

    // The searching message above is the Searching stage
    let mut tracker = ProgressTracker::new();
    tracker.advance(Stage::Searching);
    let sink = TelegramSink::new(bot.clone(), chat_id, lang.clone()).with_status_message(status.id);

    let track: Option<Track> = match deps.discovery.random_track(query).await {
        Ok(track) => track,
        Err(e) => {
            log::warn!("⚠️ Random search '{}' failed: {}", query, e);
            None
        }
    };
    let Some(track) = track else {
        let (_, keyboard) = menu::random_success(&lang);
        edit_or_send(
            bot,
            chat_id,
            Some(status.id),
            i18n::t(&lang, "random-not-found"),
            Some(keyboard),
        )
        .await?;
        return Ok(());
    };

    let mut found = FluentArgs::new();
    found.set("title", escape_html(&track.title));
    edit_or_send(
        bot,
        chat_id,
        Some(status.id),
        i18n::t_args(&lang, "random-found", &found),
        None,
    )
    .await?;

    if deps
        .orchestrator
        .deliver_tracked(chat_id.0, &track, &sink, &mut tracker)
        .await
    {
        store_update(deps, chat_id, |s| s.count_search());
        let (text, keyboard) = menu::random_success(&lang);
        bot.send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;
    }
    Ok(())
}
