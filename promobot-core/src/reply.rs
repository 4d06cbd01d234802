//! Outbound reply payload and the reply-keyboard builder.

use serde::{Deserialize, Serialize};

/// A reply keyboard: rows of button labels. Built from a flat list chunked two per row,
/// with optional single header and footer rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<String>>,
}

impl Keyboard {
    /// Buttons per row when chunking a flat list.
    pub const COLUMNS: usize = 2;

    /// Builds a keyboard from a flat button list, [`Self::COLUMNS`] buttons per row.
    pub fn build<I, S>(buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let buttons: Vec<String> = buttons.into_iter().map(Into::into).collect();
        let rows = buttons
            .chunks(Self::COLUMNS)
            .map(|chunk| chunk.to_vec())
            .collect();
        Self { rows }
    }

    /// Prepends a header row; an empty row is skipped.
    pub fn header_row<I, S>(mut self, buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = buttons.into_iter().map(Into::into).collect();
        if !row.is_empty() {
            self.rows.insert(0, row);
        }
        self
    }

    /// Appends a footer row; an empty row is skipped.
    pub fn footer_row<I, S>(mut self, buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = buttons.into_iter().map(Into::into).collect();
        if !row.is_empty() {
            self.rows.push(row);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An outbound reply: text, an optional reply keyboard, and whether the text is HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
    pub html: bool,
}

impl Reply {
    /// Plain-text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            html: false,
        }
    }

    /// HTML-formatted reply.
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            html: true,
        }
    }

    /// Attaches a reply keyboard.
    pub fn keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}
