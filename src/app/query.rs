//! Search, filter and sort pipeline for the library list.
//!
//! [`apply`] derives the ordered view collection from the authoritative collection
//! and the current [`QueryState`]. It runs in a fixed order: search narrows first,
//! then the filter, then the (more expensive) sort runs on what is left.
//!
//! The pipeline is a pure, total function. It never mutates its input and returns
//! the same sequence for the same inputs, including the relative order of records
//! whose sort keys compare equal. Unknown filter or sort names are rejected when
//! they are parsed, so they cannot reach [`apply`].
//!
//! # Example
//!
//! ```rust
//! use bookshelf::app::query::{apply, FilterMode, QueryState, SortKey};
//! use bookshelf::domain::Book;
//!
//! let books = vec![
//!     Book { id: Some(1), name: "Ada".into(), read: true, ..Default::default() },
//!     Book { id: Some(2), name: "Beta".into(), rating: 3, ..Default::default() },
//! ];
//! let state = QueryState { search_text: String::new(), filter: FilterMode::Unread, sort: SortKey::Name };
//!
//! let view = apply(&books, &state);
//! assert_eq!(view.len(), 1);
//! assert_eq!(view[0].id, Some(2));
//! ```

use crate::domain::error::LibraryError;
use crate::domain::Book;
use std::fmt;
use std::str::FromStr;

/// Which records survive the filter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    Read,
    Unread,
    Favorite,
}

impl FilterMode {
    /// Every mode, in the order a filter picker cycles through them.
    pub const ALL: [Self; 4] = [Self::All, Self::Read, Self::Unread, Self::Favorite];

    #[must_use]
    pub const fn keeps(self, book: &Book) -> bool {
        match self {
            Self::All => true,
            Self::Read => book.read,
            Self::Unread => !book.read,
            Self::Favorite => book.favorite,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Read => "read",
            Self::Unread => "unread",
            Self::Favorite => "favorite",
        }
    }

    /// Next mode in [`FilterMode::ALL`], wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl FromStr for FilterMode {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "read" => Ok(Self::Read),
            "unread" => Ok(Self::Unread),
            "favorite" | "fav" => Ok(Self::Favorite),
            other => Err(LibraryError::Config(format!("unknown filter mode: {other:?}"))),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field the view collection is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Author,
    Theme,
}

impl SortKey {
    pub const ALL: [Self; 3] = [Self::Name, Self::Author, Self::Theme];

    /// The raw field value this key sorts on.
    #[must_use]
    pub fn field(self, book: &Book) -> &str {
        match self {
            Self::Name => &book.name,
            Self::Author => &book.author,
            Self::Theme => &book.theme,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Author => "author",
            Self::Theme => "theme",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl FromStr for SortKey {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "author" => Ok(Self::Author),
            "theme" => Ok(Self::Theme),
            other => Err(LibraryError::Config(format!("unknown sort key: {other:?}"))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (search text, filter mode, sort key) tuple that governs the view collection.
///
/// Owned by the list screen; it survives re-renders and reloads and only changes on
/// explicit user input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryState {
    pub search_text: String,
    pub filter: FilterMode,
    pub sort: SortKey,
}

impl QueryState {
    /// Search text as used for matching: trimmed and lower-cased. Empty means no
    /// search.
    #[must_use]
    pub fn needle(&self) -> String {
        self.search_text.trim().to_lowercase()
    }
}

/// Derives the ordered view collection.
///
/// Works on anything that can be viewed as a [`Book`], so the controller can pass
/// its `Arc<Book>` collection and get shared handles back without copying records.
///
/// # Algorithm
///
/// 1. **Search**: keep records whose lower-cased `name` or `author` contains the
///    trimmed, lower-cased search text (skipped when that text is empty)
/// 2. **Filter**: keep records accepted by [`FilterMode::keeps`]
/// 3. **Sort**: stable ascending sort on the lower-cased [`SortKey::field`]
#[must_use]
pub fn apply<T>(collection: &[T], state: &QueryState) -> Vec<T>
where
    T: AsRef<Book> + Clone,
{
    let _span = tracing::trace_span!(
        "query_apply",
        total = collection.len(),
        filter = %state.filter,
        sort = %state.sort
    )
    .entered();

    let needle = state.needle();

    let mut view: Vec<T> = collection
        .iter()
        .filter(|item| {
            let book = item.as_ref();
            needle.is_empty()
                || book.name.to_lowercase().contains(&needle)
                || book.author.to_lowercase().contains(&needle)
        })
        .filter(|item| state.filter.keeps(item.as_ref()))
        .cloned()
        .collect();

    // sort_by_cached_key is stable, which keeps tied records in input order.
    view.sort_by_cached_key(|item| state.sort.field(item.as_ref()).to_lowercase());

    tracing::trace!(visible = view.len(), "query applied");
    view
}

/// Character range `(start, end)` of the first case-insensitive occurrence of the
/// search text in `text`, for highlighting a matched title.
///
/// Returns `None` when the search text is blank or does not occur in `text`.
///
/// # Examples
///
/// ```
/// use bookshelf::app::query::highlight_range;
///
/// assert_eq!(highlight_range("Le Petit Prince", " petit "), Some((3, 8)));
/// assert_eq!(highlight_range("Dune", "zzz"), None);
/// ```
#[must_use]
pub fn highlight_range(text: &str, search_text: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = search_text.trim().to_lowercase().chars().collect();
    if needle.is_empty() {
        return None;
    }

    // Compare per character so indices stay aligned with `text` even when
    // lower-casing changes byte lengths.
    let haystack: Vec<char> = text
        .chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect();

    haystack
        .windows(needle.len())
        .position(|window| window == needle.as_slice())
        .map(|start| (start, start + needle.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn book(id: i64, name: &str, author: &str, theme: &str, read: bool, favorite: bool) -> Book {
        Book {
            id: Some(id),
            name: name.to_string(),
            author: author.to_string(),
            theme: theme.to_string(),
            read,
            favorite,
            ..Book::default()
        }
    }

    fn sample() -> Vec<Book> {
        vec![
            book(1, "dune", "Herbert", "sf", true, false),
            book(2, "Ada", "Nabokov", "roman", false, true),
            book(3, "Carrie", "King", "horreur", false, false),
            book(4, "Beloved", "morrison", "roman", true, true),
            book(5, "Fondation", "Asimov", "SF", false, false),
            book(6, "", "", "", false, false),
        ]
    }

    fn ids<T: AsRef<Book>>(view: &[T]) -> Vec<i64> {
        view.iter().filter_map(|b| b.as_ref().id).collect()
    }

    fn every_state() -> Vec<QueryState> {
        let mut states = Vec::new();
        for search in ["", "  ", "a", "ROMAN", "her", "zzz"] {
            for filter in FilterMode::ALL {
                for sort in SortKey::ALL {
                    states.push(QueryState { search_text: search.to_string(), filter, sort });
                }
            }
        }
        states
    }

    #[test]
    fn unread_filter_sorted_by_name() {
        let books = vec![
            Book { id: Some(1), name: "Ada".into(), read: true, rating: 0, ..Book::default() },
            Book { id: Some(2), name: "Beta".into(), read: false, rating: 3, ..Book::default() },
        ];
        let state = QueryState { search_text: String::new(), filter: FilterMode::Unread, sort: SortKey::Name };

        assert_eq!(ids(&apply(&books, &state)), vec![2]);
    }

    #[test]
    fn reapplying_a_query_is_idempotent() {
        let books = sample();
        for state in every_state() {
            let once = apply(&books, &state);
            assert_eq!(apply(&once, &state), once, "state {state:?}");
        }
    }

    #[test]
    fn adjacent_pairs_are_ordered_case_insensitively() {
        let books = sample();
        for sort in SortKey::ALL {
            let state = QueryState { sort, ..QueryState::default() };
            let view = apply(&books, &state);
            for pair in view.windows(2) {
                let a = sort.field(&pair[0]).to_lowercase();
                let b = sort.field(&pair[1]).to_lowercase();
                assert!(a <= b, "{a:?} > {b:?} under {sort}");
            }
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let books = vec![
            book(10, "Same", "x", "roman", false, false),
            book(11, "same", "y", "Roman", false, false),
            book(12, "SAME", "x", "ROMAN", false, false),
        ];
        let state = QueryState { sort: SortKey::Name, ..QueryState::default() };
        assert_eq!(ids(&apply(&books, &state)), vec![10, 11, 12]);

        let reversed: Vec<Book> = books.iter().rev().cloned().collect();
        assert_eq!(ids(&apply(&reversed, &state)), vec![12, 11, 10]);

        let by_theme = QueryState { sort: SortKey::Theme, ..QueryState::default() };
        assert_eq!(ids(&apply(&books, &by_theme)), vec![10, 11, 12]);
    }

    #[test]
    fn search_result_is_an_ordered_subsequence() {
        let books = sample();
        for state in every_state() {
            let unsearched = QueryState { search_text: String::new(), ..state.clone() };
            let full = ids(&apply(&books, &unsearched));
            let narrowed = ids(&apply(&books, &state));

            let mut rest = full.iter();
            for id in &narrowed {
                assert!(rest.any(|f| f == id), "{narrowed:?} is not a subsequence of {full:?}");
            }
        }
    }

    #[test]
    fn search_matches_name_or_author_case_insensitively() {
        let books = sample();
        let state = QueryState { search_text: "  HER ".into(), ..QueryState::default() };
        // "Herbert" by author only.
        assert_eq!(ids(&apply(&books, &state)), vec![1]);

        let state = QueryState { search_text: "ar".into(), ..QueryState::default() };
        assert_eq!(ids(&apply(&books, &state)), vec![3]);
    }

    #[test]
    fn whitespace_search_is_no_search() {
        let books = sample();
        let blank = QueryState { search_text: " \t ".into(), ..QueryState::default() };
        assert_eq!(apply(&books, &blank), apply(&books, &QueryState::default()));
    }

    #[test]
    fn empty_collection_yields_empty_view() {
        let books: Vec<Book> = Vec::new();
        for state in every_state() {
            assert!(apply(&books, &state).is_empty());
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let books = sample();
        let before = books.clone();
        let _ = apply(&books, &QueryState { sort: SortKey::Author, ..QueryState::default() });
        assert_eq!(books, before);
    }

    #[test]
    fn shared_handles_come_back_pointer_equal() {
        let books: Vec<Arc<Book>> = sample().into_iter().map(Arc::new).collect();
        let view = apply(&books, &QueryState { filter: FilterMode::Favorite, ..QueryState::default() });
        assert_eq!(ids(&view), vec![2, 4]);
        assert!(Arc::ptr_eq(&view[0], &books[1]));
    }

    #[test]
    fn unknown_names_fail_to_parse() {
        assert!(matches!("rating".parse::<SortKey>(), Err(LibraryError::Config(_))));
        assert!(matches!("done".parse::<FilterMode>(), Err(LibraryError::Config(_))));
        assert_eq!("fav".parse::<FilterMode>().unwrap(), FilterMode::Favorite);
        assert_eq!("theme".parse::<SortKey>().unwrap(), SortKey::Theme);
    }

    #[test]
    fn highlight_uses_character_indices() {
        assert_eq!(highlight_range("Éloge de l'ombre", "de"), Some((6, 8)));
        assert_eq!(highlight_range("Dune", "   "), None);
    }
}
