//! Core types: event, user, chat, channel reference, and the per-user conversation record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Menu value every user starts in and returns to via the home action.
pub const MAIN_MENU: &str = "main";

/// User identity as supplied by the transport (id, username, names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Display name: first and last name joined; falls back to the username, then the id.
    pub fn full_name(&self) -> String {
        let joined = match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        };
        if !joined.trim().is_empty() {
            return joined.trim().to_string();
        }
        if let Some(username) = &self.username {
            return username.clone();
        }
        self.id.to_string()
    }
}

/// Chat kind as seen by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatKind {
    Private,
    Group,
    Channel,
}

/// Chat identity (id + kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub kind: ChatKind,
}

/// A channel referenced by an event: the forward origin of a message, or the posting chat itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: i64,
    pub username: Option<String>,
    pub title: Option<String>,
}

/// One inbound unit of work: a message, a callback action or a channel post, normalized by the
/// transport adapter. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Sender; `None` for anonymous channel posts.
    pub user: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    /// Callback token when the event came from an inline-button press.
    pub callback: Option<String>,
    /// Set when the message was forwarded from a channel.
    pub forwarded_from: Option<ChannelRef>,
    /// Photo, video, document or another non-text payload present.
    pub has_media: bool,
}

impl Event {
    /// First text token parsed as a `/command`, with any `@botname` suffix and trailing
    /// arguments stripped. `None` when the text does not start with a slash command.
    pub fn command(&self) -> Option<&str> {
        let first = self.text.as_deref()?.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Whether the event is a channel post (no live sender, posted by the channel itself).
    pub fn is_channel_post(&self) -> bool {
        self.chat.kind == ChatKind::Channel
    }
}

/// Per-user conversation state row. Created on first contact, mutated only through the
/// state setters, never deleted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: Option<String>,
    pub full_name: String,
    /// Current menu value; constrains which handlers are eligible.
    pub menu: String,
    /// Free-form slot for multi-step flows (e.g. the name of the group being managed).
    pub scratch: String,
    /// Conversation-scoped promo group selection, if any.
    pub current_group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
