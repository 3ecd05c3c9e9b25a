//! Domain layer for the bookshelf client.
//!
//! This module contains the record types exchanged with the remote library service,
//! independent of HTTP, async runtimes or rendering. Every other layer speaks in
//! these types.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`book`]: Book records, creation drafts and partial updates
//! - [`note`]: Reading notes attached to a book
//!
//! # Examples
//!
//! ```
//! use bookshelf::domain::{Book, BookPatch, Result};
//!
//! fn mark_read(book: &Book) -> Result<Book> {
//!     Ok(book.with_patch(&BookPatch::read(true)))
//! }
//! # assert!(mark_read(&Book::default()).unwrap().read);
//! ```

pub mod book;
pub mod error;
pub mod note;

pub use book::{Book, BookDraft, BookId, BookPatch, MAX_RATING};
pub use error::{LibraryError, Result};
pub use note::{NewNote, Note};
