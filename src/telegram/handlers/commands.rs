//! Slash commands and free-text messages

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use super::listings;
use super::settings;
use super::types::{first_name, HandlerDeps, HandlerError};
use crate::i18n;
use crate::storage::update_session;
use crate::telegram::bot::Command;
use crate::telegram::menu;
use crate::telegram::Bot;

/// Creates the session on first contact, taking the language from the Telegram client.
fn ensure_session(deps: &HandlerDeps, msg: &Message) {
    if deps.store.get(msg.chat.id.0).is_some() {
        return;
    }
    let language = msg
        .from
        .as_ref()
        .and_then(|u| u.language_code.as_deref())
        .and_then(i18n::is_language_supported)
        .unwrap_or("en");
    log::info!("👤 New user {} (language {})", msg.chat.id, language);
    if let Err(e) = update_session(deps.store.as_ref(), msg.chat.id.0, |s| {
        s.preferences.language = language.to_string()
    }) {
        log::error!("❌ Failed to create session for {}: {}", msg.chat.id, e);
    }
}

pub(super) async fn send_main_menu(bot: &Bot, deps: &HandlerDeps, msg: &Message) -> Result<(), HandlerError> {
    let lang = deps.lang(msg.chat.id);
    let (text, keyboard) = menu::main_menu(&lang, &first_name(msg));
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

pub(super) async fn handle_command(bot: &Bot, msg: &Message, cmd: Command, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    ensure_session(deps, msg);
    log::debug!("Command {:?} from chat {}", cmd, chat_id);

    match cmd {
        Command::Start => send_main_menu(bot, deps, msg).await,
        Command::Search(query) if !query.trim().is_empty() => {
            listings::run_search(bot, deps, chat_id, None, &query).await
        }
        Command::Search(_) => {
            let lang = deps.lang(chat_id);
            let (text, keyboard) = menu::search_prompt(&lang);
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
            Ok(())
        }
        Command::Charts => listings::show_charts(bot, deps, chat_id, None, false).await,
        Command::Random => listings::random_track(bot, deps, chat_id).await,
        Command::Mood => {
            let lang = deps.lang(chat_id);
            let (text, keyboard) = menu::mood_menu(&lang);
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
            Ok(())
        }
        Command::Recommendations => listings::show_recommendations(bot, deps, chat_id, None).await,
        Command::Settings => settings::show_settings(bot, deps, chat_id, None).await,
    }
}

/// Plain text is a search query; unknown slash commands get a hint.
pub(super) async fn handle_text(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    ensure_session(deps, msg);

    if text.starts_with('/') {
        let lang = deps.lang(msg.chat.id);
        bot.send_message(msg.chat.id, i18n::t(&lang, "error-unknown-command")).await?;
        return Ok(());
    }

    listings::run_search(bot, deps, msg.chat.id, None, text).await
}
