//! Command context: the per-invocation bundle handed to handlers.
//!
//! Construction resolves the sender (profile upsert — the only place user rows are
//! created) and the already-known channel record. One context is built per dispatch pass
//! and shared by every handler the pass invokes.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use promobot_core::{
    BotError, ChannelRef, Chat, ConversationStore, Event, Keyboard, Reply, Transport, User,
    UserRecord,
};

use crate::menu::Menu;
use crate::registry::Registry;

/// Outcome of context construction.
pub enum ContextBuild {
    Ready(Arc<CommandContext>),
    /// The event has no resolvable sender; the dispatch pass is dropped silently.
    Cancelled,
}

/// Everything a handler invocation needs: the event, the resolved user record (cached for
/// read-your-writes within the pass), the known channel if any, and write-through state
/// setters. State setters update the store first, then the cache, so a failed write never
/// leaves the cache ahead of the store.
pub struct CommandContext {
    event: Event,
    user: User,
    record: RwLock<UserRecord>,
    channel: Option<ChannelRef>,
    registry: Arc<Registry>,
    store: Arc<dyn ConversationStore>,
    transport: Arc<dyn Transport>,
}

impl CommandContext {
    /// Resolves the sender and builds the context. Returns [`ContextBuild::Cancelled`]
    /// when the event carries no sender (e.g. an anonymous channel post).
    pub async fn build(
        event: &Event,
        registry: Arc<Registry>,
        store: Arc<dyn ConversationStore>,
        transport: Arc<dyn Transport>,
    ) -> promobot_core::Result<ContextBuild> {
        let Some(user) = event.user.clone() else {
            return Ok(ContextBuild::Cancelled);
        };

        let record = store.upsert_user(&user).await?;
        let channel = store.known_channel(event.chat.id).await?;
        debug!(
            user_id = user.id,
            chat_id = event.chat.id,
            menu = %record.menu,
            known_channel = channel.is_some(),
            "step: context built"
        );

        Ok(ContextBuild::Ready(Arc::new(CommandContext {
            event: event.clone(),
            user,
            record: RwLock::new(record),
            channel,
            registry,
            store,
            transport,
        })))
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn chat(&self) -> &Chat {
        &self.event.chat
    }

    pub fn text(&self) -> Option<&str> {
        self.event.text.as_deref()
    }

    /// The channel record for the originating chat, when one is already known.
    pub fn channel(&self) -> Option<&ChannelRef> {
        self.channel.as_ref()
    }

    /// Current menu value, as cached in this context.
    pub async fn menu(&self) -> String {
        self.record.read().await.menu.clone()
    }

    /// Current scratch value, as cached in this context.
    pub async fn scratch(&self) -> String {
        self.record.read().await.scratch.clone()
    }

    /// Conversation-scoped promo group selection, as cached in this context.
    pub async fn current_group_id(&self) -> Option<i64> {
        self.record.read().await.current_group_id
    }

    /// Moves the user to `menu`. Panics on a value never declared to the registry —
    /// that is a programming error, not a user-input condition.
    pub async fn set_menu(&self, menu: Menu) -> promobot_core::Result<()> {
        assert!(
            self.registry.is_declared(menu),
            "menu '{}' was never declared by any plugin",
            menu
        );
        self.store.set_menu(self.user.id, menu.as_str()).await?;
        self.record.write().await.menu = menu.as_str().to_string();
        debug!(user_id = self.user.id, menu = %menu, "step: menu set");
        Ok(())
    }

    /// Stores a scratch value for the next step of a flow.
    pub async fn set_scratch(&self, value: &str) -> promobot_core::Result<()> {
        self.store.set_scratch(self.user.id, value).await?;
        self.record.write().await.scratch = value.to_string();
        Ok(())
    }

    /// Selects (or clears) the promo group the conversation is about.
    pub async fn set_current_group(&self, group_id: Option<i64>) -> promobot_core::Result<()> {
        self.store.set_current_group(self.user.id, group_id).await?;
        self.record.write().await.current_group_id = group_id;
        Ok(())
    }

    /// Sends a plain-text reply to the originating chat.
    pub async fn reply(&self, text: &str) -> promobot_core::Result<()> {
        self.reply_with(Reply::text(text)).await
    }

    /// Sends a reply with keyboard/HTML options.
    pub async fn reply_with(&self, reply: Reply) -> promobot_core::Result<()> {
        self.transport.send_reply(&self.event.chat, &reply).await
    }

    /// The home keyboard rendered from the registered start buttons.
    pub fn start_keyboard(&self) -> Keyboard {
        self.registry.start_keyboard()
    }

    /// Programmatic re-entry: runs the named handler's action with this context,
    /// bypassing predicates.
    pub async fn run_command(self: &Arc<Self>, name: &str) -> promobot_core::Result<()> {
        let action = self
            .registry
            .action(name)
            .ok_or_else(|| BotError::Dispatch(format!("No handler named '{}'", name)))?;
        info!(user_id = self.user.id, command = name, "step: run_command");
        action(Arc::clone(self)).await
    }

    /// Runs the designated home action with this context.
    pub async fn run_home(self: &Arc<Self>) -> promobot_core::Result<()> {
        info!(user_id = self.user.id, "step: run_home");
        (self.registry.home())(Arc::clone(self)).await
    }
}
