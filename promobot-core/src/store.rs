//! Conversation-state seam: per-user menu state and profile persistence.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChannelRef, User, UserRecord};

/// Per-user conversation state persistence. One row per user; every setter is a single
/// atomic update keyed by user id. Cross-call sequencing for concurrent events of the same
/// user is left to the store.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Looks up a user record by id.
    async fn find_user(&self, id: i64) -> Result<Option<UserRecord>>;

    /// Gets or creates the record for `user`, refreshing username and full name from the
    /// transport-supplied profile. The only place user rows are created.
    async fn upsert_user(&self, user: &User) -> Result<UserRecord>;

    /// Sets the current menu value.
    async fn set_menu(&self, user_id: i64, menu: &str) -> Result<()>;

    /// Sets the scratch slot.
    async fn set_scratch(&self, user_id: i64, scratch: &str) -> Result<()>;

    /// Sets or clears the conversation-scoped promo group reference.
    async fn set_current_group(&self, user_id: i64, group_id: Option<i64>) -> Result<()>;

    /// Returns the channel record for a chat id if one is already known.
    async fn known_channel(&self, chat_id: i64) -> Result<Option<ChannelRef>>;
}
