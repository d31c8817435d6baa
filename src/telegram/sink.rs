//! `DeliverySink` backed by a Telegram chat

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, InputFile, MessageId, ParseMode};
use tokio::sync::Mutex;
use unic_langid::LanguageIdentifier;

use crate::core::types::Track;
use crate::core::AppResult;
use crate::download::delivery::{AudioUpload, DeliverySink};
use crate::download::progress::{render_status, Stage};
use crate::telegram::menu;
use crate::telegram::Bot;

/// Edits `message_id` if given, otherwise (or when the edit fails) sends a new
/// message. Returns the id of the message that now shows `text`.
pub async fn edit_or_send(
    bot: &Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
) -> ResponseResult<MessageId> {
    if let Some(msg_id) = message_id {
        let mut edit = bot.edit_message_text(chat_id, msg_id, text.clone()).parse_mode(ParseMode::Html);
        if let Some(kb) = keyboard.clone() {
            edit = edit.reply_markup(kb);
        }
        match edit.await {
            Ok(_) => return Ok(msg_id),
            Err(e) => {
                // Same text and keyboard as before
                if e.to_string().contains("message is not modified") {
                    return Ok(msg_id);
                }
                log::warn!("Failed to edit message: {}. Trying to send new one.", e);
            }
        }
    }

    let mut send = bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
    if let Some(kb) = keyboard {
        send = send.reply_markup(kb);
    }
    Ok(send.await?.id)
}

/// Reports one delivery attempt into a chat through a single status message.
pub struct TelegramSink {
    bot: Bot,
    chat_id: ChatId,
    lang: LanguageIdentifier,
    status_message: Mutex<Option<MessageId>>,
}

impl TelegramSink {
    pub fn new(bot: Bot, chat_id: ChatId, lang: LanguageIdentifier) -> Self {
        Self {
            bot,
            chat_id,
            lang,
            status_message: Mutex::new(None),
        }
    }

    /// Reuses an existing message (e.g. the random-track status) for stages.
    pub fn with_status_message(self, message_id: MessageId) -> Self {
        Self {
            status_message: Mutex::new(Some(message_id)),
            ..self
        }
    }

    async fn show(&self, text: String, keyboard: Option<InlineKeyboardMarkup>) {
        let current = *self.status_message.lock().await;
        match edit_or_send(&self.bot, self.chat_id, current, text, keyboard).await {
            Ok(id) => *self.status_message.lock().await = Some(id),
            Err(e) => log::warn!("⚠️ Could not update status in chat {}: {}", self.chat_id, e),
        }
    }
}

#[async_trait]
impl DeliverySink for TelegramSink {
    async fn show_stage(&self, stage: &Stage, track: &Track) {
        self.show(render_status(&self.lang, stage, &track.title), None).await;
    }

    async fn offer_external_link(&self, track: &Track, size_mb: f64, limit_mb: f64) {
        let (text, keyboard) = menu::too_large_card(&self.lang, track, size_mb, limit_mb);
        self.show(text, Some(keyboard)).await;
    }

    async fn send_audio(&self, upload: AudioUpload) -> AppResult<()> {
        log::info!("📤 Uploading {} ({:.1} MB) to chat {}", upload.path.display(), upload.size_mb, self.chat_id);
        self.bot
            .send_audio(self.chat_id, InputFile::file(upload.path))
            .title(upload.title)
            .performer(upload.performer)
            .caption(upload.caption)
            .parse_mode(ParseMode::Html)
            .duration(upload.duration)
            .await?;
        Ok(())
    }
}
