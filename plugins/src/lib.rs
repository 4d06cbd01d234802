//! # plugins
//!
//! The built-in plugin set for the promo bot: help and home handling, promo
//! group creation and listing, and the per-group editor flows. Load order is
//! builtins, manager, editor; the registry assigns evaluation groups in that
//! order.
//!
//! ## Modules
//!
//! - [`builtins`] – /help and the start/home action
//! - [`manager`] – group creation and listing
//! - [`editor`] – per-group management flows
//! - [`texts`] – canned HTML reply texts

pub mod builtins;
pub mod editor;
pub mod manager;
pub mod texts;

pub use builtins::Builtins;
pub use editor::GroupEditor;
pub use manager::GroupManager;

/// Words that bounce the user back to the start menu from anywhere. The start
/// action claims these in any letter case; free-text flows skip them silently.
pub const CANCEL_WORDS: [&str; 3] = ["cancel", "home", "reset"];

/// The fixed button vocabulary. Free-text flows refuse these as user-supplied
/// names so a button press can never be mistaken for input.
pub const RESERVED_WORDS: &[&str] = &[
    "cancel",
    "home",
    "reset",
    "Help",
    "New Group",
    "My Groups",
    "Back to list",
    "Edit Name",
    "Add Participant",
    "Enable",
    "Disable",
    "Delete",
    "Yes",
    "No",
];

/// Case-insensitive membership test against [`RESERVED_WORDS`].
pub fn is_reserved(text: &str) -> bool {
    RESERVED_WORDS.iter().any(|w| w.eq_ignore_ascii_case(text))
}

/// Case-insensitive membership test against [`CANCEL_WORDS`].
pub fn is_cancel_word(text: &str) -> bool {
    CANCEL_WORDS.iter().any(|w| w.eq_ignore_ascii_case(text))
}
