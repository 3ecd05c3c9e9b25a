//! Book domain model, creation drafts and partial updates.
//!
//! The remote service is the source of truth for books; these types mirror its JSON
//! representation. Decoding is lenient about missing or `null` fields so that a record
//! never holds an "undefined" value: strings default to empty, numbers to zero and
//! flags to `false`. Ratings are clamped to `0..=5` on every path into the model.

use crate::domain::error::{LibraryError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Server-assigned book identifier.
pub type BookId = i64;

/// Highest rating a book can carry.
pub const MAX_RATING: u8 = 5;

/// A book record as stored by the remote library service.
///
/// `id` is `None` only for records that have not been created yet; once the server
/// assigns it, it never changes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BookId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub editor: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub theme: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: i32,
    #[serde(default, deserialize_with = "clamped_rating")]
    pub rating: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub favorite: bool,
    #[serde(default)]
    pub cover: Option<String>,
}

impl AsRef<Self> for Book {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl Book {
    /// Returns a copy of this record with every field set in `patch` applied.
    ///
    /// Used by child views to render an edit before the server has confirmed it.
    /// The identifier is never touched.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookshelf::domain::{Book, BookPatch};
    ///
    /// let book = Book { id: Some(1), name: "Ada".into(), ..Default::default() };
    /// let rated = book.with_patch(&BookPatch::rating(9));
    /// assert_eq!(rated.rating, 5);
    /// assert_eq!(rated.id, Some(1));
    /// ```
    #[must_use]
    pub fn with_patch(&self, patch: &BookPatch) -> Self {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name.clone_from(name);
        }
        if let Some(author) = &patch.author {
            next.author.clone_from(author);
        }
        if let Some(editor) = &patch.editor {
            next.editor.clone_from(editor);
        }
        if let Some(theme) = &patch.theme {
            next.theme.clone_from(theme);
        }
        if let Some(year) = patch.year {
            next.year = year;
        }
        if let Some(rating) = patch.rating {
            next.rating = rating.min(MAX_RATING);
        }
        if let Some(read) = patch.read {
            next.read = read;
        }
        if let Some(favorite) = patch.favorite {
            next.favorite = favorite;
        }
        if let Some(cover) = &patch.cover {
            next.cover.clone_from(cover);
        }
        next
    }

    /// Number of filled and empty stars, for rating widgets.
    #[must_use]
    pub const fn stars(&self) -> (u8, u8) {
        let filled = if self.rating > MAX_RATING { MAX_RATING } else { self.rating };
        (filled, MAX_RATING - filled)
    }
}

/// A book that has not been created yet.
///
/// Every field is present in the serialized form; absent form input becomes the
/// empty string, zero or `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub editor: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub cover: Option<String>,
}

impl BookDraft {
    /// Builds a draft from textual form input.
    ///
    /// Recognized keys: `name`, `author`, `editor`, `theme`, `year`, `rating`,
    /// `read`, `favorite`, `cover`. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Validation`] if `year` or `rating` is present but not
    /// numeric, or if a flag is not a recognizable boolean.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use bookshelf::domain::BookDraft;
    ///
    /// let mut fields = BTreeMap::new();
    /// fields.insert("name".to_string(), "Dune".to_string());
    /// fields.insert("year".to_string(), "1965".to_string());
    /// fields.insert("rating".to_string(), "8".to_string());
    ///
    /// let draft = BookDraft::from_fields(&fields)?;
    /// assert_eq!(draft.year, 1965);
    /// assert_eq!(draft.rating, 5);
    /// assert_eq!(draft.cover, None);
    /// # Ok::<(), bookshelf::LibraryError>(())
    /// ```
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Result<Self> {
        let text = |key: &str| fields.get(key).map(|v| v.trim().to_string()).unwrap_or_default();

        Ok(Self {
            name: text("name"),
            author: text("author"),
            editor: text("editor"),
            theme: text("theme"),
            year: parse_year(fields.get("year"))?.unwrap_or(0),
            rating: parse_rating(fields.get("rating"))?.unwrap_or(0),
            read: parse_flag("read", fields.get("read"))?.unwrap_or(false),
            favorite: parse_flag("favorite", fields.get("favorite"))?.unwrap_or(false),
            cover: fields
                .get("cover")
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        })
    }

    /// Materializes the draft as a record with the given server identifier.
    #[must_use]
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id: Some(id),
            name: self.name,
            author: self.author,
            editor: self.editor,
            theme: self.theme,
            year: self.year,
            rating: self.rating.min(MAX_RATING),
            read: self.read,
            favorite: self.favorite,
            cover: self.cover,
        }
    }
}

/// Partial update of a book. Only the fields that are set are sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    /// `Some(None)` clears the cover (serialized as `null`).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present_nullable")]
    pub cover: Option<Option<String>>,
}

impl BookPatch {
    /// Patch setting only the read flag.
    #[must_use]
    pub fn read(read: bool) -> Self {
        Self { read: Some(read), ..Self::default() }
    }

    /// Patch setting only the favorite flag.
    #[must_use]
    pub fn favorite(favorite: bool) -> Self {
        Self { favorite: Some(favorite), ..Self::default() }
    }

    /// Patch setting only the rating, clamped to `0..=5`.
    #[must_use]
    pub fn rating(stars: u8) -> Self {
        Self { rating: Some(stars.min(MAX_RATING)), ..Self::default() }
    }

    /// Returns `true` when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Builds a patch from textual edit-form input. Only the keys present are set;
    /// an empty `year` or `rating` leaves that field untouched and an empty `cover`
    /// clears it.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Validation`] for non-numeric `year`/`rating` or
    /// unrecognizable flags.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Result<Self> {
        let text = |key: &str| fields.get(key).map(|v| v.trim().to_string());

        Ok(Self {
            name: text("name"),
            author: text("author"),
            editor: text("editor"),
            theme: text("theme"),
            year: parse_year(fields.get("year"))?,
            rating: parse_rating(fields.get("rating"))?,
            read: parse_flag("read", fields.get("read"))?,
            favorite: parse_flag("favorite", fields.get("favorite"))?,
            cover: text("cover").map(|c| Some(c).filter(|c| !c.is_empty())),
        })
    }
}

fn parse_year(raw: Option<&String>) -> Result<Option<i32>> {
    match raw.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<i32>()
            .map(Some)
            .map_err(|_| LibraryError::Validation(format!("year must be a number, got {s:?}"))),
    }
}

fn parse_rating(raw: Option<&String>) -> Result<Option<u8>> {
    match raw.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(|n| Some(clamp_rating(n)))
            .map_err(|_| LibraryError::Validation(format!("rating must be a number, got {s:?}"))),
    }
}

fn parse_flag(key: &str, raw: Option<&String>) -> Result<Option<bool>> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(None),
        Some("true" | "yes" | "1" | "y") => Ok(Some(true)),
        Some("false" | "no" | "0" | "n") => Ok(Some(false)),
        Some(other) => Err(LibraryError::Validation(format!(
            "{key} must be true or false, got {other:?}"
        ))),
    }
}

fn clamp_rating(n: i64) -> u8 {
    u8::try_from(n.clamp(0, i64::from(MAX_RATING))).unwrap_or(0)
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn clamped_rating<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(|r| clamp_rating(r.unwrap_or(0)))
}

fn present_nullable<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
