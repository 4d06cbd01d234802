//! Conversions from teloxide update types to the core [`Event`].

use teloxide::types::{CallbackQuery, Message, MessageOrigin};

use promobot_core::{ChannelRef, Chat, ChatKind, Event, User};

/// Wraps a Telegram user for conversion to the core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> TelegramUserWrapper<'a> {
    pub fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

fn chat_kind(chat: &teloxide::types::Chat) -> ChatKind {
    match chat.kind {
        teloxide::types::ChatKind::Private(_) => ChatKind::Private,
        teloxide::types::ChatKind::Public(ref public) => match public.kind {
            teloxide::types::PublicChatKind::Channel(_) => ChatKind::Channel,
            _ => ChatKind::Group,
        },
    }
}

fn forwarded_channel(message: &Message) -> Option<ChannelRef> {
    match message.forward_origin()? {
        MessageOrigin::Channel { chat, .. } => Some(ChannelRef {
            id: chat.id.0,
            username: chat.username().map(str::to_string),
            title: chat.title().map(str::to_string),
        }),
        _ => None,
    }
}

fn has_media(message: &Message) -> bool {
    message.photo().is_some()
        || message.video().is_some()
        || message.document().is_some()
        || message.audio().is_some()
        || message.voice().is_some()
        || message.animation().is_some()
        || message.sticker().is_some()
        || message.video_note().is_some()
}

/// Wraps a Telegram message (private chat message or channel post) for
/// conversion to the core [`Event`].
pub struct TelegramMessageWrapper<'a>(pub &'a Message);

impl<'a> TelegramMessageWrapper<'a> {
    pub fn to_event(&self) -> Event {
        let message = self.0;
        Event {
            user: message
                .from
                .as_ref()
                .map(|user| TelegramUserWrapper(user).to_core()),
            chat: Chat {
                id: message.chat.id.0,
                kind: chat_kind(&message.chat),
            },
            text: message.text().map(str::to_string),
            callback: None,
            forwarded_from: forwarded_channel(message),
            has_media: has_media(message),
        }
    }
}

/// Wraps a callback query (inline-button press) for conversion to the core
/// [`Event`].
pub struct TelegramCallbackWrapper<'a>(pub &'a CallbackQuery);

impl<'a> TelegramCallbackWrapper<'a> {
    pub fn to_event(&self) -> Event {
        let query = self.0;
        // When the original message is no longer accessible, fall back to the
        // presser's private chat.
        let chat = query
            .message
            .as_ref()
            .map(|message| {
                let chat = message.chat();
                Chat {
                    id: chat.id.0,
                    kind: chat_kind(chat),
                }
            })
            .unwrap_or(Chat {
                id: query.from.id.0 as i64,
                kind: ChatKind::Private,
            });

        Event {
            user: Some(TelegramUserWrapper(&query.from).to_core()),
            chat,
            text: None,
            callback: query.data.clone(),
            forwarded_from: None,
            has_media: false,
        }
    }
}
