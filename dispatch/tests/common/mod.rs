//! Shared test doubles for dispatcher and context tests.
//!
//! - [`MemoryConversationStore`]: in-memory `ConversationStore` with an upsert counter.
//! - [`RecordingTransport`]: records every reply instead of sending it.
//! - Event builders and a closure-backed [`Plugin`] for ad-hoc registrations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use dispatch::{Plugin, PluginHandle};
use promobot_core::{
    BotError, ChannelRef, Chat, ChatKind, ConversationStore, Event, Reply, Transport, User,
    UserRecord, MAIN_MENU,
};

/// In-memory `ConversationStore`. Tracks upsert calls so tests can assert the profile
/// upsert happens once per dispatch pass.
#[derive(Default)]
pub struct MemoryConversationStore {
    users: Mutex<HashMap<i64, UserRecord>>,
    channels: Mutex<HashMap<i64, ChannelRef>>,
    upsert_count: AtomicUsize,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a channel as already known to the bot.
    pub fn add_channel(&self, channel: ChannelRef) {
        self.channels.lock().unwrap().insert(channel.id, channel);
    }

    pub fn get_upsert_count(&self) -> usize {
        self.upsert_count.load(Ordering::SeqCst)
    }

    /// Stored menu value for a user, if the user exists.
    pub fn menu_of(&self, user_id: i64) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|r| r.menu.clone())
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn find_user(&self, id: i64) -> promobot_core::Result<Option<UserRecord>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn upsert_user(&self, user: &User) -> promobot_core::Result<UserRecord> {
        self.upsert_count.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        let record = users.entry(user.id).or_insert_with(|| UserRecord {
            id: user.id,
            username: None,
            full_name: String::new(),
            menu: MAIN_MENU.to_string(),
            scratch: String::new(),
            current_group_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        record.username = user.username.clone();
        record.full_name = user.full_name();
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn set_menu(&self, user_id: i64, menu: &str) -> promobot_core::Result<()> {
        match self.users.lock().unwrap().get_mut(&user_id) {
            Some(record) => {
                record.menu = menu.to_string();
                record.updated_at = Utc::now();
                Ok(())
            }
            None => Err(BotError::Storage(format!("User {} not found", user_id))),
        }
    }

    async fn set_scratch(&self, user_id: i64, scratch: &str) -> promobot_core::Result<()> {
        match self.users.lock().unwrap().get_mut(&user_id) {
            Some(record) => {
                record.scratch = scratch.to_string();
                record.updated_at = Utc::now();
                Ok(())
            }
            None => Err(BotError::Storage(format!("User {} not found", user_id))),
        }
    }

    async fn set_current_group(
        &self,
        user_id: i64,
        group_id: Option<i64>,
    ) -> promobot_core::Result<()> {
        match self.users.lock().unwrap().get_mut(&user_id) {
            Some(record) => {
                record.current_group_id = group_id;
                record.updated_at = Utc::now();
                Ok(())
            }
            None => Err(BotError::Storage(format!("User {} not found", user_id))),
        }
    }

    async fn known_channel(&self, chat_id: i64) -> promobot_core::Result<Option<ChannelRef>> {
        Ok(self.channels.lock().unwrap().get(&chat_id).cloned())
    }
}

/// Records every reply instead of sending it.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(i64, Reply)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(i64, Reply)> {
        self.sent.lock().unwrap().clone()
    }

    /// Just the reply texts, in send order.
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, reply)| reply.text.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_reply(&self, chat: &Chat, reply: &Reply) -> promobot_core::Result<()> {
        self.sent.lock().unwrap().push((chat.id, reply.clone()));
        Ok(())
    }
}

pub fn test_user(id: i64) -> User {
    User {
        id,
        username: Some(format!("user{}", id)),
        first_name: Some("Test".to_string()),
        last_name: None,
    }
}

pub fn text_event(user_id: i64, text: &str) -> Event {
    Event {
        user: Some(test_user(user_id)),
        chat: Chat {
            id: user_id,
            kind: ChatKind::Private,
        },
        text: Some(text.to_string()),
        callback: None,
        forwarded_from: None,
        has_media: false,
    }
}

pub fn callback_event(user_id: i64, token: &str) -> Event {
    let mut event = text_event(user_id, "");
    event.text = None;
    event.callback = Some(token.to_string());
    event
}

pub fn channel_post(chat_id: i64, text: &str) -> Event {
    Event {
        user: None,
        chat: Chat {
            id: chat_id,
            kind: ChatKind::Channel,
        },
        text: Some(text.to_string()),
        callback: None,
        forwarded_from: None,
        has_media: false,
    }
}

pub fn forwarded_event(user_id: i64, channel: ChannelRef) -> Event {
    let mut event = text_event(user_id, "");
    event.text = None;
    event.forwarded_from = Some(channel);
    event
}

struct ClosurePlugin {
    name: &'static str,
    setup: Box<dyn Fn(&mut PluginHandle<'_>) + Send + Sync>,
}

impl Plugin for ClosurePlugin {
    fn name(&self) -> &'static str {
        self.name
    }

    fn setup(self: Arc<Self>, handle: &mut PluginHandle<'_>) {
        (self.setup)(handle)
    }
}

/// A plugin whose `setup` is the given closure. Keeps registration-heavy tests short.
pub fn plugin(
    name: &'static str,
    setup: impl Fn(&mut PluginHandle<'_>) + Send + Sync + 'static,
) -> Arc<dyn Plugin> {
    Arc::new(ClosurePlugin {
        name,
        setup: Box::new(setup),
    })
}
