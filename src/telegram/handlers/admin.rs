//! Hidden admin commands: /admin_stats, /admin_cleanup, /admin_files, /admin_help

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use super::types::{sender_id, HandlerDeps, HandlerError};
use crate::core::config::admin::INACTIVE_DAYS;
use crate::core::utils::escape_html;
use crate::i18n;
use crate::storage::SessionStore;
use crate::telegram::Bot;

/// Totals over every stored session
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AdminStats {
    pub users: usize,
    pub searches: u64,
    pub downloads: u64,
    pub active_listings: usize,
}

pub fn collect_stats(store: &dyn SessionStore) -> AdminStats {
    let mut stats = AdminStats::default();
    for user_id in store.user_ids() {
        let Some(session) = store.get(user_id) else {
            continue;
        };
        stats.users += 1;
        stats.searches += session.stats.searches;
        stats.downloads += session.stats.downloads;
        if !session.search_results.is_empty() {
            stats.active_listings += 1;
        }
    }
    stats
}

/// Removes sessions without a search in the last `days` days. Admins are kept.
///
/// Returns `(removed, remaining)`.
pub fn cleanup_inactive(
    store: &dyn SessionStore,
    admin_ids: &[i64],
    now: NaiveDateTime,
    days: i64,
) -> (usize, usize) {
    let mut removed = 0;
    for user_id in store.user_ids() {
        if admin_ids.contains(&user_id) {
            continue;
        }
        let inactive = store.get(user_id).map(|s| s.is_inactive(now, days)).unwrap_or(false);
        if inactive && store.remove(user_id).is_some() {
            removed += 1;
        }
    }
    (removed, store.user_ids().len())
}

/// One line per data file with its size in KB
pub fn describe_files(paths: &[PathBuf]) -> String {
    let mut text = String::from("📁 <b>Data files</b>\n");
    for path in paths {
        let name = escape_html(&path.display().to_string());
        match fs_err::metadata(path) {
            Ok(meta) => text.push_str(&format!("\n• <code>{}</code>: {:.1} KB", name, meta.len() as f64 / 1024.0)),
            Err(_) => text.push_str(&format!("\n• <code>{}</code>: missing", name)),
        }
    }
    text
}

const ADMIN_HELP: &str = "🛠 <b>Admin commands</b>\n\n\
/admin_stats - usage statistics\n\
/admin_cleanup - remove sessions inactive for 30+ days\n\
/admin_files - data file sizes\n\
/admin_help - this message";

async fn stats_text(deps: &HandlerDeps) -> String {
    let stats = collect_stats(deps.store.as_ref());
    let charts = deps.discovery.charts_cache().snapshot().await;
    format!(
        "📊 <b>Bot statistics</b>\n\n\
👥 Users: {}\n\
🔍 Searches: {}\n\
📥 Downloads: {}\n\
📋 Users with search results: {}\n\
📈 Charts: {} tracks over {} queries (updated {})\n\
⏳ Free download slots: {}",
        stats.users,
        stats.searches,
        stats.downloads,
        stats.active_listings,
        charts.track_count(),
        charts.data.len(),
        charts.last_update.as_deref().unwrap_or("never"),
        deps.orchestrator.available_slots(),
    )
}

/// Routes a `/admin_*` message. Non-admins get the same answer as for an unknown command.
pub(super) async fn handle_admin_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = sender_id(msg.from.as_ref());
    let chat_id = msg.chat.id;
    if !deps.is_admin(user_id) {
        log::warn!("🚫 Non-admin {} tried {:?}", user_id, msg.text());
        let lang = deps.lang(chat_id);
        bot.send_message(chat_id, i18n::t(&lang, "command-not-found")).await?;
        return Ok(());
    }

    let command = msg
        .text()
        .and_then(|t| t.split_whitespace().next())
        .map(|c| c.split('@').next().unwrap_or(c))
        .unwrap_or_default();
    log::info!("🛠 Admin {} runs {}", user_id, command);

    let text = match command {
        "/admin_stats" => stats_text(deps).await,
        "/admin_cleanup" => {
            let now = Local::now().naive_local();
            let (removed, remaining) = cleanup_inactive(deps.store.as_ref(), &deps.admin_ids, now, INACTIVE_DAYS);
            deps.store.flush()?;
            log::info!("🧹 Removed {} inactive sessions, {} remain", removed, remaining);
            format!(
                "🧹 <b>Cleanup finished</b>\n\nRemoved: {}\nRemaining: {}",
                removed, remaining
            )
        }
        "/admin_files" => describe_files(&deps.data_files),
        "/admin_help" => ADMIN_HELP.to_string(),
        _ => {
            let lang = deps.lang(chat_id);
            i18n::t(&lang, "command-not-found")
        }
    };

    bot.send_message(chat_id, text).parse_mode(ParseMode::Html).await?;
    Ok(())
}
