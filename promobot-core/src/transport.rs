//! Transport seam: sending replies back to the chat platform.

use async_trait::async_trait;

use crate::error::Result;
use crate::reply::Reply;
use crate::types::Chat;

/// Abstraction over the outbound side of the chat platform. Implementations map [`Reply`]
/// to transport-specific send calls (e.g. Telegram sendMessage with reply-keyboard markup).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a reply to the given chat.
    async fn send_reply(&self, chat: &Chat, reply: &Reply) -> Result<()>;
}
