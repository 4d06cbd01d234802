//! Menu values: the conversation states a user can be parked in.

use std::fmt;

use promobot_core::MAIN_MENU;

/// A conversation menu value. Plugins declare the values they use as module-level consts so
/// predicates and `set_menu` calls share one definition; the registry validates that every
/// referenced value is declared and every declared value is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Menu(&'static str);

/// The resting state: every new user starts here and the home action returns here.
pub const MAIN: Menu = Menu(MAIN_MENU);

impl Menu {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
