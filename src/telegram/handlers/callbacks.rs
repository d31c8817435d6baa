//! Inline button presses

use teloxide::prelude::*;

use super::listings;
use super::settings;
use super::types::{HandlerDeps, HandlerError};
use crate::i18n;
use crate::telegram::callback::CallbackAction;
use crate::telegram::menu;
use crate::telegram::sink::edit_or_send;
use crate::telegram::Bot;

pub(super) async fn handle_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(message) = q.message.as_ref() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = Some(message.id());
    let lang = deps.lang(chat_id);

    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        log::warn!("⚠️ Unknown callback data {:?} in chat {}", q.data, chat_id);
        bot.answer_callback_query(q.id.clone())
            .text(i18n::t(&lang, "error-unknown-command"))
            .await?;
        return Ok(());
    };

    // Answer first: downloads below can take minutes
    bot.answer_callback_query(q.id.clone()).await?;
    log::debug!("Callback {:?} from chat {}", action, chat_id);

    match action {
        CallbackAction::BackToMain => {
            let (text, keyboard) = menu::main_menu(&lang, &q.from.first_name);
            edit_or_send(bot, chat_id, message_id, text, Some(keyboard)).await?;
        }
        CallbackAction::StartSearch | CallbackAction::NewSearch => {
            let (text, keyboard) = menu::search_prompt(&lang);
            edit_or_send(bot, chat_id, message_id, text, Some(keyboard)).await?;
        }
        CallbackAction::RandomTrack => listings::random_track(bot, deps, chat_id).await?,
        CallbackAction::ShowCharts => listings::show_charts(bot, deps, chat_id, message_id, false).await?,
        CallbackAction::RefreshCharts => listings::show_charts(bot, deps, chat_id, message_id, true).await?,
        CallbackAction::MoodPlaylists => {
            let (text, keyboard) = menu::mood_menu(&lang);
            edit_or_send(bot, chat_id, message_id, text, Some(keyboard)).await?;
        }
        CallbackAction::ShowRecommendations | CallbackAction::RefreshRecommendations => {
            listings::show_recommendations(bot, deps, chat_id, message_id).await?
        }
        CallbackAction::Settings => settings::show_settings(bot, deps, chat_id, message_id).await?,
        CallbackAction::LanguageMenu => settings::show_language_menu(bot, deps, chat_id, message_id).await?,
        CallbackAction::SetLanguage(code) => settings::set_language(bot, deps, chat_id, message_id, &code).await?,
        CallbackAction::DurationMenu => settings::show_duration_menu(bot, deps, chat_id, message_id).await?,
        CallbackAction::SetDuration(filter) => {
            settings::set_duration(bot, deps, chat_id, message_id, filter).await?
        }
        CallbackAction::ToggleMusic => settings::toggle_music_only(bot, deps, chat_id, message_id).await?,
        CallbackAction::Playlist(id) => listings::show_playlist(bot, deps, chat_id, message_id, &id).await?,
        CallbackAction::Page(kind, page) => {
            listings::show_listing(bot, deps, chat_id, message_id, kind, page).await?
        }
        CallbackAction::Download(kind, index) => {
            listings::download_from_listing(bot, deps, chat_id, kind, index).await?
        }
        // Keeps the too-large card in place
        CallbackAction::SearchAlt(title) => listings::run_search(bot, deps, chat_id, None, &title).await?,
        CallbackAction::Noop => {}
    }
    Ok(())
}
