//! Renderable snapshots of the application state.
//!
//! View models are computed by [`AppState::compute_viewmodel`] and contain only
//! display-ready data: labels are resolved, selection is marked, search matches
//! are located. Nothing here holds a reference back into the state, so a host can
//! keep a snapshot while the state moves on.
//!
//! [`AppState::compute_viewmodel`]: crate::app::AppState::compute_viewmodel

use crate::app::query::{FilterMode, SortKey};
use crate::domain::BookId;

/// What the host should draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenViewModel {
    Library(LibraryViewModel),
    Detail(DetailViewModel),
}

/// The library list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryViewModel {
    pub header: HeaderInfo,
    pub query_bar: QueryBarInfo,
    /// Visible window of the view collection.
    pub rows: Vec<BookRow>,
    /// Selection position within `rows`.
    pub selected_index: usize,
    /// Dismissible error from the last failed reload.
    pub banner: Option<String>,
    /// A reload is in flight.
    pub loading: bool,
    /// Shown instead of `rows` when the view collection is empty.
    pub empty_state: Option<EmptyState>,
    pub footer: FooterInfo,
}

/// One list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow {
    pub id: BookId,
    pub name: String,
    pub author: String,
    pub theme: String,
    pub year: i32,
    /// `(filled, empty)` star counts.
    pub stars: (u8, u8),
    pub read: bool,
    pub favorite: bool,
    /// An edit made from this row is in flight.
    pub pending: bool,
    /// The last edit made from this row failed.
    pub error: Option<String>,
    pub is_selected: bool,
    /// Character range of the search match inside `name`, `(start, end)` exclusive.
    pub highlight: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub title: String,
}

/// Search text, filter and sort as the query bar shows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBarInfo {
    pub search_text: String,
    /// Placeholder shown when `search_text` is empty.
    pub placeholder: String,
    /// The search field has keyboard focus.
    pub editing: bool,
    pub filter: FilterMode,
    /// Labels for every filter, in cycling order, with the active one marked.
    pub filters: Vec<(String, bool)>,
    pub sort: SortKey,
    pub sort_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterInfo {
    pub keybindings: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
    pub subtitle: String,
}

/// The detail screen of one book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailViewModel {
    pub header: HeaderInfo,
    /// `None` until the first fetch lands, or when the book does not exist.
    pub book: Option<BookDetail>,
    pub loading: bool,
    /// The server reported the book as missing.
    pub missing: bool,
    /// Fetch or edit failure to show above the record.
    pub error: Option<String>,
    pub notes: Vec<NoteRow>,
    pub notes_loading: bool,
    pub notes_error: Option<String>,
    pub footer: FooterInfo,
}

/// All fields of the book shown on the detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetail {
    pub id: BookId,
    pub name: String,
    pub author: String,
    pub editor: String,
    pub theme: String,
    pub year: i32,
    pub stars: (u8, u8),
    pub read: bool,
    pub favorite: bool,
    pub cover: Option<String>,
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    /// `dd/mm/yyyy`, empty when the server sent no date.
    pub date: String,
    pub content: String,
}
