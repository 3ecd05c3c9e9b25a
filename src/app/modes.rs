//! Input mode and screen state types.
//!
//! The input mode decides how keystrokes are interpreted; the screen decides what
//! is drawn. They are independent: search mode only exists on the list screen,
//! and leaving the list for a detail screen resets it.
//!
//! # Example
//!
//! ```rust
//! use bookshelf::app::modes::{InputMode, Screen, SearchFocus};
//!
//! let input_mode = InputMode::Search(SearchFocus::Typing);
//! let screen = Screen::Detail(7);
//! assert!(input_mode.is_search());
//! assert_eq!(screen.book_id(), Some(7));
//! ```

use crate::domain::BookId;

/// Focus state within search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFocus {
    /// Characters go to the search text.
    Typing,
    /// The search text is kept; keys move the selection.
    Navigating,
}

/// Current input handling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Navigation and commands.
    #[default]
    Normal,
    /// Search field shown, with a focus state.
    Search(SearchFocus),
}

impl InputMode {
    #[must_use]
    pub const fn is_search(self) -> bool {
        matches!(self, Self::Search(_))
    }

    #[must_use]
    pub const fn is_typing(self) -> bool {
        matches!(self, Self::Search(SearchFocus::Typing))
    }
}

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// The library list.
    #[default]
    List,
    /// The detail screen of one book, stacked over the list.
    Detail(BookId),
}

impl Screen {
    #[must_use]
    pub const fn book_id(self) -> Option<BookId> {
        match self {
            Self::List => None,
            Self::Detail(id) => Some(id),
        }
    }
}
