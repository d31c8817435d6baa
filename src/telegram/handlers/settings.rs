//! Settings screens: language, duration filter, music-only toggle

use teloxide::prelude::*;
use teloxide::types::MessageId;

use super::types::{HandlerDeps, HandlerError};
use crate::core::types::DurationFilter;
use crate::i18n;
use crate::storage::{load_session, update_session};
use crate::telegram::menu;
use crate::telegram::sink::edit_or_send;
use crate::telegram::Bot;

pub(super) async fn show_settings(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
) -> Result<(), HandlerError> {
    let lang = deps.lang(chat_id);
    let session = load_session(deps.store.as_ref(), chat_id.0);
    let (text, keyboard) = menu::settings_menu(&lang, &session);
    edit_or_send(bot, chat_id, message_id, text, Some(keyboard)).await?;
    Ok(())
}

pub(super) async fn show_language_menu(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
) -> Result<(), HandlerError> {
    let lang = deps.lang(chat_id);
    let session = load_session(deps.store.as_ref(), chat_id.0);
    let (text, keyboard) = menu::language_menu(&lang, &session.preferences.language);
    edit_or_send(bot, chat_id, message_id, text, Some(keyboard)).await?;
    Ok(())
}

pub(super) async fn set_language(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    code: &str,
) -> Result<(), HandlerError> {
    let Some(code) = i18n::is_language_supported(code) else {
        log::warn!("⚠️ Unsupported language '{}' requested by {}", code, chat_id);
        return show_language_menu(bot, deps, chat_id, message_id).await;
    };

    update_session(deps.store.as_ref(), chat_id.0, |s| s.preferences.language = code.to_string())?;
    log::info!("🌐 Chat {} switched language to {}", chat_id, code);

    let (text, keyboard) = menu::language_changed(&i18n::lang_from_code(code));
    edit_or_send(bot, chat_id, message_id, text, Some(keyboard)).await?;
    Ok(())
}

pub(super) async fn show_duration_menu(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
) -> Result<(), HandlerError> {
    let lang = deps.lang(chat_id);
    let session = load_session(deps.store.as_ref(), chat_id.0);
    let (text, keyboard) = menu::duration_menu(&lang, session.filters.duration);
    edit_or_send(bot, chat_id, message_id, text, Some(keyboard)).await?;
    Ok(())
}

pub(super) async fn set_duration(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    filter: DurationFilter,
) -> Result<(), HandlerError> {
    update_session(deps.store.as_ref(), chat_id.0, |s| s.filters.duration = filter)?;
    show_settings(bot, deps, chat_id, message_id).await
}

pub(super) async fn toggle_music_only(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    message_id: Option<MessageId>,
) -> Result<(), HandlerError> {
    update_session(deps.store.as_ref(), chat_id.0, |s| s.filters.music_only = !s.filters.music_only)?;
    show_settings(bot, deps, chat_id, message_id).await
}
