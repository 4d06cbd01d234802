//! Predicate algebra: composable boolean filters over an incoming event and the sender's
//! conversation-state snapshot.
//!
//! Primitives are pure functions `Event × StateView → bool`; combinators compose through
//! `&`, `|` and `!` so registrations read `text_is(["Yes"]) & menu(DELETE_CONFIRM)`.
//! Predicates never mutate state.

use std::ops::{BitAnd, BitOr, Not};

use promobot_core::{Event, UserRecord, MAIN_MENU};

use crate::menu::Menu;

/// Read-only snapshot of the sender's conversation state, taken once per dispatch pass.
/// Every predicate of the pass evaluates against the same snapshot, so a handler advancing
/// the menu cannot re-trigger later groups within the same event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateView {
    /// Sender's menu value; `None` when the event has no resolvable sender.
    pub menu: Option<String>,
}

impl StateView {
    /// Snapshot for a resolved sender. A sender without a stored record counts as MAIN.
    pub fn for_record(record: Option<&UserRecord>) -> Self {
        Self {
            menu: Some(
                record
                    .map(|r| r.menu.clone())
                    .unwrap_or_else(|| MAIN_MENU.to_string()),
            ),
        }
    }

    /// Snapshot for an event with no resolvable sender (e.g. an anonymous channel post).
    pub fn no_sender() -> Self {
        Self { menu: None }
    }
}

/// A predicate tree. Built once at registration time, evaluated per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Whole-text membership; an event without text never matches.
    TextEquals {
        words: Vec<String>,
        ignore_case: bool,
    },
    /// Sender's menu is one of the given values; an event without a sender never matches.
    MenuIn(Vec<Menu>),
    /// Chat kind is channel.
    IsChannelPost,
    /// A forwarded-from-channel reference is present.
    IsForwardedFromChannel,
    /// The media flag is set.
    IsMediaMessage,
    /// First token is a slash command (optional `@botname` suffix) in the set,
    /// compared case-insensitively.
    CommandIn(Vec<String>),
    /// Callback token is in the set.
    CallbackIn(Vec<String>),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Evaluates the tree against an event and a state snapshot. Pure; short-circuits
    /// And/Or the way `&&`/`||` do.
    pub fn eval(&self, event: &Event, state: &StateView) -> bool {
        match self {
            Predicate::TextEquals { words, ignore_case } => match event.text.as_deref() {
                Some(text) => {
                    if *ignore_case {
                        let text = text.to_lowercase();
                        words.iter().any(|w| *w == text)
                    } else {
                        words.iter().any(|w| w == text)
                    }
                }
                None => false,
            },
            Predicate::MenuIn(menus) => match state.menu.as_deref() {
                Some(current) => menus.iter().any(|m| m.as_str() == current),
                None => false,
            },
            Predicate::IsChannelPost => event.is_channel_post(),
            Predicate::IsForwardedFromChannel => event.forwarded_from.is_some(),
            Predicate::IsMediaMessage => event.has_media,
            Predicate::CommandIn(names) => match event.command() {
                Some(command) => names.iter().any(|n| n.eq_ignore_ascii_case(command)),
                None => false,
            },
            Predicate::CallbackIn(tokens) => match event.callback.as_deref() {
                Some(token) => tokens.iter().any(|t| t == token),
                None => false,
            },
            Predicate::And(a, b) => a.eval(event, state) && b.eval(event, state),
            Predicate::Or(a, b) => a.eval(event, state) || b.eval(event, state),
            Predicate::Not(inner) => !inner.eval(event, state),
        }
    }

    /// Collects every menu value referenced by a `MenuIn` node anywhere in the tree.
    /// Used by the registry's declared/reachable validation.
    pub fn referenced_menus(&self, out: &mut Vec<Menu>) {
        match self {
            Predicate::MenuIn(menus) => out.extend(menus.iter().copied()),
            Predicate::And(a, b) | Predicate::Or(a, b) => {
                a.referenced_menus(out);
                b.referenced_menus(out);
            }
            Predicate::Not(inner) => inner.referenced_menus(out),
            _ => {}
        }
    }
}

/// Whole-text match against one or more words, case-sensitive.
pub fn text_is<I, S>(words: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Predicate::TextEquals {
        words: words.into_iter().map(Into::into).collect(),
        ignore_case: false,
    }
}

/// Whole-text match against one or more words, case-insensitive.
/// Words are lowercased once here; the event text is lowercased per evaluation.
pub fn text_is_ignore_case<I, S>(words: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Predicate::TextEquals {
        words: words
            .into_iter()
            .map(|w| w.into().to_lowercase())
            .collect(),
        ignore_case: true,
    }
}

/// Sender is in the given menu.
pub fn menu(value: Menu) -> Predicate {
    Predicate::MenuIn(vec![value])
}

/// Sender is in one of the given menus.
pub fn menu_in<I>(menus: I) -> Predicate
where
    I: IntoIterator<Item = Menu>,
{
    Predicate::MenuIn(menus.into_iter().collect())
}

/// Event is a channel post.
pub fn is_channel_post() -> Predicate {
    Predicate::IsChannelPost
}

/// Event was forwarded from a channel.
pub fn forwarded_from_channel() -> Predicate {
    Predicate::IsForwardedFromChannel
}

/// Event carries a media payload.
pub fn is_media() -> Predicate {
    Predicate::IsMediaMessage
}

/// First token is the given slash command.
pub fn command(name: &str) -> Predicate {
    Predicate::CommandIn(vec![name.to_string()])
}

/// First token is one of the given slash commands.
pub fn command_in<I, S>(names: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Predicate::CommandIn(names.into_iter().map(Into::into).collect())
}

/// Callback token is one of the given values.
pub fn callback_in<I, S>(tokens: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Predicate::CallbackIn(tokens.into_iter().map(Into::into).collect())
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}
