//! Full-stack harness for plugin flow tests: real SQLite storage behind the
//! dispatcher, a recording transport, and the complete plugin set loaded in
//! production order (builtins, manager, editor).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dispatch::{Dispatcher, RegistryBuilder};
use plugins::{Builtins, GroupEditor, GroupManager};
use promobot_core::{
    ChannelRef, Chat, ChatKind, ConversationStore, Event, Reply, Transport, User, UserRecord,
};
use storage::{
    init_schema, ChannelRepository, GroupRepository, ParticipantRepository,
    SqliteConversationStore, SqlitePoolManager,
};

/// Records every reply instead of sending it.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(i64, Reply)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
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

    /// Every reply in send order.
    pub fn replies(&self) -> Vec<Reply> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, reply)| reply.clone())
            .collect()
    }

    /// Rows of the keyboard attached to the most recent reply that carried one.
    pub fn last_keyboard(&self) -> Option<Vec<Vec<String>>> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|(_, reply)| reply.keyboard.as_ref().map(|k| k.rows.clone()))
    }

    /// The most recent reply, panicking if nothing was sent yet.
    pub fn last_reply(&self) -> Reply {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, reply)| reply.clone())
            .expect("No reply was sent")
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_reply(&self, chat: &Chat, reply: &Reply) -> promobot_core::Result<()> {
        self.sent.lock().unwrap().push((chat.id, reply.clone()));
        Ok(())
    }
}

/// A dispatcher wired to in-memory SQLite and the full plugin set, plus
/// handles to everything a flow test wants to poke at afterwards.
pub struct TestBot {
    pub dispatcher: Dispatcher,
    pub store: Arc<SqliteConversationStore>,
    pub transport: Arc<RecordingTransport>,
    pub groups: GroupRepository,
    pub channels: ChannelRepository,
    pub participants: ParticipantRepository,
}

impl TestBot {
    pub async fn new() -> Self {
        let pool_manager = SqlitePoolManager::new("sqlite::memory:")
            .await
            .expect("Failed to create pool manager");
        init_schema(&pool_manager)
            .await
            .expect("Failed to initialize schema");

        let store = Arc::new(SqliteConversationStore::new(pool_manager.clone()));
        let transport = Arc::new(RecordingTransport::new());
        let groups = GroupRepository::new(pool_manager.clone());
        let channels = ChannelRepository::new(pool_manager.clone());
        let participants = ParticipantRepository::new(pool_manager);

        let registry = RegistryBuilder::new()
            .load(Arc::new(Builtins))
            .load(Arc::new(GroupManager::new(groups.clone())))
            .load(Arc::new(GroupEditor::new(
                groups.clone(),
                channels.clone(),
                participants.clone(),
            )))
            .build()
            .expect("Failed to build registry");

        let dispatcher = Dispatcher::new(Arc::new(registry), store.clone(), transport.clone());

        Self {
            dispatcher,
            store,
            transport,
            groups,
            channels,
            participants,
        }
    }

    /// Dispatches a plain text message from the given user.
    pub async fn say(&self, user_id: i64, text: &str) {
        self.send(text_event(user_id, text)).await;
    }

    pub async fn send(&self, event: Event) {
        self.dispatcher
            .dispatch(event)
            .await
            .expect("Failed to dispatch event");
    }

    /// The stored conversation record; panics if the user was never seen.
    pub async fn record(&self, user_id: i64) -> UserRecord {
        self.store
            .find_user(user_id)
            .await
            .expect("Failed to load user")
            .expect("User was never stored")
    }

    pub async fn menu(&self, user_id: i64) -> String {
        self.record(user_id).await.menu
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

pub fn media_event(user_id: i64) -> Event {
    let mut event = text_event(user_id, "");
    event.text = None;
    event.has_media = true;
    event
}

pub fn forwarded_event(user_id: i64, channel: ChannelRef) -> Event {
    let mut event = text_event(user_id, "");
    event.text = None;
    event.forwarded_from = Some(channel);
    event
}

pub fn test_channel(id: i64, title: &str) -> ChannelRef {
    ChannelRef {
        id,
        username: None,
        title: Some(title.to_string()),
    }
}
