//! Outbound transport: maps [`Reply`] onto Telegram sendMessage calls.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup as ReplyKeyboardMarkup, ParseMode};

use promobot_core::{BotError, Chat, Keyboard, Reply, Transport};

/// Thin wrapper around [`teloxide::Bot`] implementing the core [`Transport`].
/// Production code sends through Telegram; tests substitute another impl.
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// The underlying bot for direct API use when needed.
    pub fn inner(&self) -> &Bot {
        &self.bot
    }
}

/// Reply-keyboard rows to Telegram markup.
fn markup(keyboard: &Keyboard) -> ReplyKeyboardMarkup {
    let rows = keyboard
        .rows
        .iter()
        .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>());
    ReplyKeyboardMarkup::new(rows).resize_keyboard()
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_reply(&self, chat: &Chat, reply: &Reply) -> promobot_core::Result<()> {
        let mut request = self.bot.send_message(ChatId(chat.id), reply.text.clone());
        if reply.html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = &reply.keyboard {
            if !keyboard.is_empty() {
                request = request.reply_markup(markup(keyboard));
            }
        }
        request
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(())
    }
}
