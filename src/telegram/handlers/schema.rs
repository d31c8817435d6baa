//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::admin::handle_admin_command;
use super::callbacks::handle_callback;
use super::commands::{handle_command, handle_text};
use super::types::{HandlerDeps, HandlerError};
use crate::i18n;
use crate::telegram::bot::Command;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same tree is used in production and in integration tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_admin = deps.clone();
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Hidden admin commands (not in Command enum)
        .branch(admin_handler(deps_admin))
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

/// Logs a failed handler and tells the user something went wrong.
async fn report_failure(bot: &Bot, deps: &HandlerDeps, chat_id: ChatId, what: &str, e: HandlerError) {
    log::error!("❌ {} failed in chat {}: {}", what, chat_id, e);
    let lang = deps.lang(chat_id);
    let _ = bot.send_message(chat_id, i18n::t(&lang, "error-generic")).await;
}

/// Handler for /admin_* commands
fn admin_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| text.starts_with("/admin_")).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_admin_command(&bot, &msg, &deps).await {
                    report_failure(&bot, &deps, msg.chat.id, "admin command", e).await;
                }
                Ok(())
            }
        })
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_command(&bot, &msg, cmd, &deps).await {
                    report_failure(&bot, &deps, msg.chat.id, "command", e).await;
                }
                Ok(())
            }
        },
    ))
}

/// Free text becomes a search
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_text(&bot, &msg, &deps).await {
                    report_failure(&bot, &deps, msg.chat.id, "search", e).await;
                }
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            if let Err(e) = handle_callback(&bot, &q, &deps).await {
                match q.message.as_ref().map(|m| m.chat().id) {
                    Some(chat_id) => report_failure(&bot, &deps, chat_id, "callback", e).await,
                    None => log::error!("❌ Callback without message failed: {}", e),
                }
            }
            Ok(())
        }
    })
}
