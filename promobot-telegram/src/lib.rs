//! # promobot-telegram
//!
//! The Telegram edge of the bot: normalizes teloxide updates into core
//! events, sends replies back through the Bot API, and runs the long-polling
//! loop that feeds the routing dispatcher.
//!
//! ## Modules
//!
//! - [`adapters`] – teloxide update types to the core [`promobot_core::Event`]
//! - [`config`] – environment-driven bot configuration
//! - [`transport`] – outbound [`promobot_core::Transport`] over the Bot API
//! - [`runner`] – long-polling update loop

pub mod adapters;
pub mod config;
pub mod runner;
pub mod transport;

pub use adapters::{TelegramCallbackWrapper, TelegramMessageWrapper, TelegramUserWrapper};
pub use config::BotConfig;
pub use runner::{build_bot, run, schema};
pub use transport::TelegramTransport;
