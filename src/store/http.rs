//! JSON-over-HTTP book store.
//!
//! Talks to the library service's REST endpoints:
//!
//! | Operation     | Request                      |
//! |---------------|------------------------------|
//! | list books    | `GET /books?…`               |
//! | get book      | `GET /books/{id}`            |
//! | create book   | `POST /books`                |
//! | update book   | `PUT /books/{id}`            |
//! | delete book   | `DELETE /books/{id}`         |
//! | list notes    | `GET /books/{id}/notes`      |
//! | create note   | `POST /books/{id}/notes`     |
//!
//! Any non-2xx answer is a failure whatever its body looks like. When the body is a
//! JSON object with an `error` string, that string is what the user sees; otherwise
//! each operation has its own default message.

use crate::domain::error::{LibraryError, Result};
use crate::domain::{Book, BookDraft, BookId, BookPatch, NewNote, Note};
use crate::store::backend::{BookStore, ListParams};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::Instrument;
use url::Url;

#[derive(Debug, Clone, Copy)]
enum Operation {
    ListBooks,
    GetBook(BookId),
    CreateBook,
    UpdateBook(BookId),
    DeleteBook(BookId),
    ListNotes(BookId),
    CreateNote(BookId),
}

impl Operation {
    const fn name(self) -> &'static str {
        match self {
            Self::ListBooks => "list_books",
            Self::GetBook(_) => "get_book",
            Self::CreateBook => "create_book",
            Self::UpdateBook(_) => "update_book",
            Self::DeleteBook(_) => "delete_book",
            Self::ListNotes(_) => "list_notes",
            Self::CreateNote(_) => "create_note",
        }
    }

    const fn default_message(self) -> &'static str {
        match self {
            Self::ListBooks => "Erreur lors du chargement des livres",
            Self::GetBook(_) => "Livre introuvable",
            Self::CreateBook => "Erreur lors de l'ajout du livre",
            Self::UpdateBook(_) => "Erreur lors de la mise à jour",
            Self::DeleteBook(_) => "Erreur lors de la suppression",
            Self::ListNotes(_) => "Erreur lors du chargement des notes",
            Self::CreateNote(_) => "Erreur lors de l'ajout de la note",
        }
    }

    /// Error for a 404 on an operation that addresses a book by id.
    fn not_found(self, message: String) -> Option<LibraryError> {
        match self {
            Self::GetBook(id)
            | Self::UpdateBook(id)
            | Self::DeleteBook(id)
            | Self::ListNotes(id)
            | Self::CreateNote(id) => Some(LibraryError::NotFound { resource: "book", id, message }),
            Self::ListBooks | Self::CreateBook => None,
        }
    }
}

/// [`BookStore`] backed by the library service's REST API.
#[derive(Debug, Clone)]
pub struct HttpBookStore {
    client: Client,
    base: Url,
}

impl HttpBookStore {
    /// Creates a client for the service rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Config`] if `base_url` is not an absolute http(s) URL
    /// or the HTTP client cannot be built.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookshelf::store::HttpBookStore;
    /// use std::time::Duration;
    ///
    /// assert!(HttpBookStore::new("http://localhost:3000", Duration::from_secs(5)).is_ok());
    /// assert!(HttpBookStore::new("not a url", Duration::from_secs(5)).is_err());
    /// ```
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| LibraryError::Config(format!("invalid api_url {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(LibraryError::Config(format!("api_url must be an http(s) URL: {base_url}")));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LibraryError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| LibraryError::Config(format!("api_url cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends `request` and returns the body of a successful answer.
    async fn execute(&self, op: Operation, request: RequestBuilder) -> Result<String> {
        let span = tracing::debug_span!("http_request", operation = op.name());

        async move {
            let response = request
                .send()
                .await
                .map_err(|e| LibraryError::Network(e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| LibraryError::Network(e.to_string()))?;

            tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

            if status.is_success() {
                return Ok(body);
            }

            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(serde_json::Value::as_str).map(str::to_string))
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| op.default_message().to_string());

            if status == StatusCode::NOT_FOUND {
                if let Some(err) = op.not_found(message.clone()) {
                    return Err(err);
                }
            }

            Err(LibraryError::Server { status: status.as_u16(), message })
        }
        .instrument(span)
        .await
    }

    async fn fetch<T: DeserializeOwned>(&self, op: Operation, request: RequestBuilder) -> Result<T> {
        let body = self.execute(op, request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(operation = op.name(), error = %e, "undecodable response body");
            LibraryError::Server {
                status: StatusCode::OK.as_u16(),
                message: format!("{}: {e}", op.default_message()),
            }
        })
    }
}

#[async_trait]
impl BookStore for HttpBookStore {
    async fn list_books(&self, params: &ListParams) -> Result<Vec<Book>> {
        let mut url = self.endpoint(&["books"])?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
        self.fetch(Operation::ListBooks, self.client.get(url)).await
    }

    async fn get_book(&self, id: BookId) -> Result<Book> {
        let url = self.endpoint(&["books", &id.to_string()])?;
        self.fetch(Operation::GetBook(id), self.client.get(url)).await
    }

    async fn create_book(&self, draft: &BookDraft) -> Result<Book> {
        let url = self.endpoint(&["books"])?;
        self.fetch(Operation::CreateBook, self.client.post(url).json(draft)).await
    }

    async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Book> {
        let url = self.endpoint(&["books", &id.to_string()])?;
        self.fetch(Operation::UpdateBook(id), self.client.put(url).json(patch)).await
    }

    async fn delete_book(&self, id: BookId) -> Result<String> {
        let op = Operation::DeleteBook(id);
        let url = self.endpoint(&["books", &id.to_string()])?;
        let body = self.execute(op, self.client.delete(url)).await?;

        // The confirmation body is informational; an empty or odd body after a
        // 2xx still means the book is gone.
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(serde_json::Value::as_str).map(str::to_string))
            .unwrap_or_else(|| format!("book {id} deleted"));
        Ok(message)
    }

    async fn list_notes(&self, book_id: BookId) -> Result<Vec<Note>> {
        let url = self.endpoint(&["books", &book_id.to_string(), "notes"])?;
        self.fetch(Operation::ListNotes(book_id), self.client.get(url)).await
    }

    async fn create_note(&self, book_id: BookId, note: &NewNote) -> Result<Note> {
        let url = self.endpoint(&["books", &book_id.to_string(), "notes"])?;
        self.fetch(Operation::CreateNote(book_id), self.client.post(url).json(note)).await
    }
}
