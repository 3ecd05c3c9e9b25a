//! Remote book store abstraction.
//!
//! This module defines the [`BookStore`] trait, the CRUD contract of the library
//! service for books and their notes. The view-model never calls it directly: the
//! [`StoreWorker`](crate::store::StoreWorker) executes
//! [`StoreRequest`](crate::store::StoreRequest)s against whichever implementation
//! the host configured.
//!
//! # Implementations
//!
//! - [`HttpBookStore`](crate::store::HttpBookStore): JSON over HTTP (default)
//! - [`MemoryBookStore`](crate::store::MemoryBookStore): in-process, for tests and
//!   offline use

use crate::domain::error::Result;
use crate::domain::{Book, BookDraft, BookId, BookPatch, NewNote, Note};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query-string parameters forwarded verbatim to the list endpoint.
///
/// # Examples
///
/// ```
/// use bookshelf::store::ListParams;
///
/// let params = ListParams::new().with("read", "true");
/// assert_eq!(params.get("read"), Some("true"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListParams(BTreeMap<String, String>);

impl ListParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// CRUD access to the remote library.
///
/// Every method is one round trip. Implementations report failures with the
/// variants of [`LibraryError`](crate::LibraryError): `Network` when the request
/// could not complete, `NotFound` for unknown ids, `Server` for any other non-2xx
/// answer.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Lists books, filtered server-side by `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the answer cannot be decoded.
    async fn list_books(&self, params: &ListParams) -> Result<Vec<Book>>;

    /// Fetches one book.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown.
    async fn get_book(&self, id: BookId) -> Result<Book>;

    /// Creates a book and returns it with its server-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the draft.
    async fn create_book(&self, draft: &BookDraft) -> Result<Book>;

    /// Applies a partial update and returns the full canonical record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown, or the server's error otherwise.
    async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Book>;

    /// Deletes a book and returns the server's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is unknown, or the server's error otherwise.
    async fn delete_book(&self, id: BookId) -> Result<String>;

    /// Lists the notes attached to a book.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_notes(&self, book_id: BookId) -> Result<Vec<Note>>;

    /// Attaches a new note to a book.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the book is unknown.
    async fn create_note(&self, book_id: BookId, note: &NewNote) -> Result<Note>;
}
