//! # promobot-core
//!
//! Core types and traits for the promo bot: [`Event`], [`Reply`], [`Keyboard`], user and chat
//! types, the [`Transport`] and [`ConversationStore`] seams, and tracing initialization.
//! Transport-agnostic; used by dispatch, storage and promobot-telegram.

pub mod error;
pub mod logger;
pub mod reply;
pub mod store;
pub mod transport;
pub mod types;

pub use error::{BotError, Result};
pub use logger::init_tracing;
pub use reply::{Keyboard, Reply};
pub use store::ConversationStore;
pub use transport::Transport;
pub use types::{ChannelRef, Chat, ChatKind, Event, User, UserRecord, MAIN_MENU};
