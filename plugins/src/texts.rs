//! Canned HTML reply texts for the built-in plugins.

/// Welcome message sent on /start.
pub const WELCOME_HTML: &str = "<b>Welcome to the Promotion Group Manager!</b>\n\
I keep track of promotion groups of Telegram channels for you.\n\
Use the buttons below, or send /help to see every command.";

/// Help text for /help and the Help button.
pub const HELP_HTML: &str = "<b>Commands</b>\n\
/start - Show the start menu\n\
/new - Create a new Promotion Group\n\
/mygroups - List and manage your Promotion Groups\n\
/cancel - Cancel the current action\n\
/help - Show this message";
