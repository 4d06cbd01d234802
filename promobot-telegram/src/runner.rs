//! Long-polling runner: converts teloxide updates to core events and routes
//! them through the dispatcher. Calls get_me before starting and registers
//! slash commands for client-side autocomplete.

use anyhow::{Context, Result};
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tracing::{error, info, instrument, warn};

use dispatch::Dispatcher;
use promobot_core::Event;

use crate::adapters::{TelegramCallbackWrapper, TelegramMessageWrapper};
use crate::config::BotConfig;

/// Error type for update handlers.
type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Builds a [`Bot`] from config, pointing it at a custom API URL when one
/// is configured.
pub fn build_bot(config: &BotConfig) -> Result<Bot> {
    let mut bot = Bot::new(config.bot_token.clone());
    if let Some(url) = &config.telegram_api_url {
        let url = reqwest::Url::parse(url)
            .with_context(|| format!("Invalid Telegram API URL: {url}"))?;
        bot = bot.set_api_url(url);
    }
    Ok(bot)
}

/// The update handler tree: messages, channel posts, and callback queries
/// all normalize to [`Event`] and go through the same dispatcher. The same
/// schema serves production and integration tests.
pub fn schema(router: Dispatcher) -> UpdateHandler<HandlerError> {
    let router_messages = router.clone();
    let router_posts = router.clone();
    let router_callbacks = router;

    dptree::entry()
        .branch(message_handler(router_messages))
        .branch(channel_post_handler(router_posts))
        .branch(callback_handler(router_callbacks))
}

fn message_handler(router: Dispatcher) -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(move |msg: Message| {
        let router = router.clone();
        async move {
            match msg.text() {
                Some(text) => {
                    info!(
                        chat_id = msg.chat.id.0,
                        message_content = %text,
                        "Received message"
                    );
                }
                None => {
                    info!(chat_id = msg.chat.id.0, "Received non-text message");
                }
            }
            route(&router, TelegramMessageWrapper(&msg).to_event()).await;
            Ok(())
        }
    })
}

fn channel_post_handler(router: Dispatcher) -> UpdateHandler<HandlerError> {
    Update::filter_channel_post().endpoint(move |msg: Message| {
        let router = router.clone();
        async move {
            info!(chat_id = msg.chat.id.0, "Received channel post");
            route(&router, TelegramMessageWrapper(&msg).to_event()).await;
            Ok(())
        }
    })
}

fn callback_handler(router: Dispatcher) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, query: CallbackQuery| {
        let router = router.clone();
        async move {
            info!(
                user_id = query.from.id.0,
                data = ?query.data,
                "Received callback query"
            );
            // Stop the client-side loading spinner before handling.
            if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                error!(error = %e, "Failed to answer callback query");
            }
            route(&router, TelegramCallbackWrapper(&query).to_event()).await;
            Ok(())
        }
    })
}

async fn route(router: &Dispatcher, event: Event) {
    if let Err(e) = router.dispatch(event).await {
        error!(error = %e, "Dispatch failed");
    }
}

/// Starts long polling with the given bot and dispatcher. Blocks until the
/// process is interrupted.
#[instrument(skip(bot, router))]
pub async fn run(bot: Bot, router: Dispatcher) -> Result<()> {
    let me = bot
        .get_me()
        .await
        .context("Failed to reach the Telegram API")?;
    info!(username = ?me.user.username, "Bot connected");

    // Slash-command autocomplete in Telegram clients.
    let commands = vec![
        BotCommand::new("start", "Show the start menu"),
        BotCommand::new("new", "Create a new Promotion Group"),
        BotCommand::new("mygroups", "List and manage your Promotion Groups"),
        BotCommand::new("cancel", "Cancel the current action"),
        BotCommand::new("help", "Show all commands"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    teloxide::dispatching::Dispatcher::builder(bot, schema(router))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
