//! In-process book store.
//!
//! Keeps books and notes in memory behind a `tokio` mutex. Used by the terminal host
//! when `api_url` is `memory:` and by tests that need a real [`BookStore`] without a
//! server. Ids are assigned sequentially and never reused.

use crate::domain::error::{LibraryError, Result};
use crate::domain::{Book, BookDraft, BookId, BookPatch, NewNote, Note};
use crate::store::backend::{BookStore, ListParams};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Shelf {
    books: BTreeMap<BookId, Book>,
    notes: Vec<Note>,
    next_book_id: BookId,
    next_note_id: i64,
}

impl Shelf {
    fn book(&self, id: BookId) -> Result<&Book> {
        self.books
            .get(&id)
            .ok_or_else(|| LibraryError::book_not_found(id))
    }
}

/// [`BookStore`] holding everything in memory.
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    shelf: Mutex<Shelf>,
}

impl MemoryBookStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `books`. Books without an id get one.
    #[must_use]
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let mut shelf = Shelf::default();
        for mut book in books {
            let id = book.id.unwrap_or(shelf.next_book_id + 1);
            book.id = Some(id);
            shelf.next_book_id = shelf.next_book_id.max(id);
            shelf.books.insert(id, book);
        }
        Self { shelf: Mutex::new(shelf) }
    }
}

/// Matches the boolean filters the list endpoint understands (`read`, `favorite`).
fn matches_params(book: &Book, params: &ListParams) -> bool {
    let flag = |key: &str, value: bool| {
        params
            .get(key)
            .map_or(true, |wanted| wanted.eq_ignore_ascii_case(&value.to_string()))
    };
    flag("read", book.read) && flag("favorite", book.favorite)
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn list_books(&self, params: &ListParams) -> Result<Vec<Book>> {
        let shelf = self.shelf.lock().await;
        Ok(shelf
            .books
            .values()
            .filter(|b| matches_params(b, params))
            .cloned()
            .collect())
    }

    async fn get_book(&self, id: BookId) -> Result<Book> {
        let shelf = self.shelf.lock().await;
        shelf.book(id).cloned()
    }

    async fn create_book(&self, draft: &BookDraft) -> Result<Book> {
        let mut shelf = self.shelf.lock().await;
        shelf.next_book_id += 1;
        let id = shelf.next_book_id;
        let book = draft.clone().into_book(id);
        shelf.books.insert(id, book.clone());
        tracing::debug!(book_id = id, "book created in memory");
        Ok(book)
    }

    async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Book> {
        let mut shelf = self.shelf.lock().await;
        let updated = shelf.book(id)?.with_patch(patch);
        shelf.books.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_book(&self, id: BookId) -> Result<String> {
        let mut shelf = self.shelf.lock().await;
        if shelf.books.remove(&id).is_none() {
            return Err(LibraryError::book_not_found(id));
        }
        shelf.notes.retain(|n| n.book_id != id);
        Ok("Livre supprimé".to_string())
    }

    async fn list_notes(&self, book_id: BookId) -> Result<Vec<Note>> {
        let shelf = self.shelf.lock().await;
        shelf.book(book_id)?;
        Ok(shelf.notes.iter().filter(|n| n.book_id == book_id).cloned().collect())
    }

    async fn create_note(&self, book_id: BookId, note: &NewNote) -> Result<Note> {
        let mut shelf = self.shelf.lock().await;
        shelf.book(book_id)?;
        shelf.next_note_id += 1;
        let id = shelf.next_note_id;
        let note = Note {
            id,
            book_id,
            content: note.content().to_string(),
            date: Some(Utc::now()),
        };
        shelf.notes.push(note.clone());
        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf() -> MemoryBookStore {
        MemoryBookStore::with_books([
            Book { name: "Ada".into(), read: true, ..Book::default() },
            Book { name: "Beta".into(), favorite: true, ..Book::default() },
        ])
    }

    #[tokio::test]
    async fn seeded_books_get_sequential_ids() {
        let store = shelf();
        let books = store.list_books(&ListParams::new()).await.unwrap();
        let ids: Vec<_> = books.iter().filter_map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let created = store.create_book(&BookDraft { name: "Gamma".into(), ..BookDraft::default() }).await.unwrap();
        assert_eq!(created.id, Some(3));
    }

    #[tokio::test]
    async fn list_honours_flag_params() {
        let store = shelf();
        let read = store.list_books(&ListParams::new().with("read", "true")).await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].name, "Ada");
    }

    #[tokio::test]
    async fn update_returns_the_full_record() {
        let store = shelf();
        let updated = store.update_book(2, &BookPatch::rating(4)).await.unwrap();
        assert_eq!(updated.name, "Beta");
        assert_eq!(updated.rating, 4);
        assert!(updated.favorite);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = shelf();
        assert!(matches!(store.get_book(9).await, Err(LibraryError::NotFound { id: 9, .. })));
        assert!(matches!(store.delete_book(9).await, Err(LibraryError::NotFound { .. })));
        let note = NewNote::new("orphan").unwrap();
        assert!(store.create_note(9, &note).await.is_err());
    }

    #[tokio::test]
    async fn deleting_a_book_drops_its_notes() {
        let store = shelf();
        store.create_note(1, &NewNote::new("first").unwrap()).await.unwrap();
        assert_eq!(store.list_notes(1).await.unwrap().len(), 1);

        store.delete_book(1).await.unwrap();
        assert!(store.list_notes(1).await.is_err());
    }
}
