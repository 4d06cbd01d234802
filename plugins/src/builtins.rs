//! Built-in help and home handlers.

use std::sync::Arc;

use dispatch::{
    bind, callback_in, command, is_channel_post, text_is, text_is_ignore_case, CommandContext,
    HandlerDef, Placement, Plugin, PluginHandle, MAIN,
};
use promobot_core::Reply;

use crate::texts::{HELP_HTML, WELCOME_HTML};
use crate::CANCEL_WORDS;

/// Help text plus the start/home action. `start` is registered three ways
/// (slash commands, cancel words, callback tokens) sharing one action, and is
/// also the designated home action.
pub struct Builtins;

impl Builtins {
    async fn help(self: Arc<Self>, ctx: Arc<CommandContext>) -> promobot_core::Result<()> {
        ctx.reply_with(Reply::html(HELP_HTML)).await
    }

    /// Greets on /start, acknowledges cancel words, then always renders the
    /// start keyboard and resets the menu.
    async fn start(self: Arc<Self>, ctx: Arc<CommandContext>) -> promobot_core::Result<()> {
        if ctx.event().command() == Some("start") {
            ctx.reply_with(Reply::html(WELCOME_HTML)).await?;
        }

        if let Some(text) = ctx.text() {
            if crate::is_cancel_word(text) {
                ctx.reply("Current action was cancelled").await?;
            }
        }

        ctx.reply_with(Reply::text("What do you want to do?").keyboard(ctx.start_keyboard()))
            .await?;
        ctx.set_menu(MAIN).await
    }
}

impl Plugin for Builtins {
    fn name(&self) -> &'static str {
        "builtins"
    }

    fn setup(self: Arc<Self>, handle: &mut PluginHandle<'_>) {
        handle.add_start_button("Help", Placement::Header);

        handle.register(HandlerDef::new(
            "help",
            command("help") | text_is(["Help"]),
            bind(&self, Builtins::help),
        ));

        let start = bind(&self, Builtins::start);
        handle.register(HandlerDef::commands(
            "start",
            ["start", "reset", "cancel"],
            Arc::clone(&start),
        ));
        handle.register(HandlerDef::new(
            "start",
            text_is_ignore_case(CANCEL_WORDS) & !is_channel_post(),
            Arc::clone(&start),
        ));
        handle.register(HandlerDef::new(
            "start",
            callback_in(["home", "cancel"]),
            Arc::clone(&start),
        ));
        handle.register_home(start);
    }
}
