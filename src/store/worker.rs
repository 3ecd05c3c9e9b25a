//! Executes store requests against a [`BookStore`].
//!
//! The worker is the only place where the view-model's requests turn into I/O. It
//! re-attaches the caller's trace context, runs the operation, and folds the result
//! into a [`StoreResponse`] that never panics and always carries the request id.

use crate::domain::error::Result;
use crate::store::backend::BookStore;
use crate::store::messages::{StoreRequest, StoreResponse};
use std::sync::Arc;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Runs [`StoreRequest`]s. Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct StoreWorker {
    store: Arc<dyn BookStore>,
}

impl std::fmt::Debug for StoreWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreWorker").finish_non_exhaustive()
    }
}

impl StoreWorker {
    #[must_use]
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Folds a store result into a response with consistent logging.
    fn handle_store_result<T, F>(operation: &str, request_id: u64, result: Result<T>, on_success: F) -> StoreResponse
    where
        F: FnOnce(T) -> StoreResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation, request_id, "store operation successful");
                on_success(value)
            }
            Err(e) => {
                tracing::debug!(operation, request_id, error = %e, "store operation failed");
                StoreResponse::failed(request_id, &e)
            }
        }
    }

    /// Executes one request and returns its response.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookshelf::store::{ListParams, MemoryBookStore, StoreRequest, StoreResponse, StoreWorker};
    /// use std::sync::Arc;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let worker = StoreWorker::new(Arc::new(MemoryBookStore::new()));
    /// let response = worker.handle_request(StoreRequest::list_books(1, ListParams::new())).await;
    /// assert!(matches!(response, StoreResponse::BooksLoaded { request_id: 1, .. }));
    /// # });
    /// ```
    pub async fn handle_request(&self, request: StoreRequest) -> StoreResponse {
        let operation = request.operation();
        let request_id = request.request_id();

        let span = tracing::debug_span!("store_request", operation, request_id);
        if let Some(parent) = request.trace_context().and_then(|ctx| ctx.to_otel_context()) {
            span.set_parent(parent);
        }

        self.dispatch(request).instrument(span).await
    }

    async fn dispatch(&self, request: StoreRequest) -> StoreResponse {
        let store = &self.store;
        let op = request.operation();

        match request {
            StoreRequest::ListBooks { request_id, params, .. } => Self::handle_store_result(
                op,
                request_id,
                store.list_books(&params).await,
                |books| {
                    tracing::debug!(count = books.len(), "books loaded");
                    StoreResponse::BooksLoaded { request_id, books }
                },
            ),
            StoreRequest::GetBook { request_id, id, .. } => {
                Self::handle_store_result(op, request_id, store.get_book(id).await, |book| {
                    StoreResponse::BookFetched { request_id, book }
                })
            }
            StoreRequest::CreateBook { request_id, draft, .. } => {
                Self::handle_store_result(op, request_id, store.create_book(&draft).await, |book| {
                    StoreResponse::BookCreated { request_id, book }
                })
            }
            StoreRequest::UpdateBook { request_id, id, patch, .. } => {
                Self::handle_store_result(op, request_id, store.update_book(id, &patch).await, |book| {
                    StoreResponse::BookUpdated { request_id, book }
                })
            }
            StoreRequest::DeleteBook { request_id, id, .. } => {
                Self::handle_store_result(op, request_id, store.delete_book(id).await, |message| {
                    StoreResponse::BookDeleted { request_id, id, message }
                })
            }
            StoreRequest::ListNotes { request_id, book_id, .. } => {
                Self::handle_store_result(op, request_id, store.list_notes(book_id).await, |notes| {
                    StoreResponse::NotesLoaded { request_id, book_id, notes }
                })
            }
            StoreRequest::CreateNote { request_id, book_id, note, .. } => {
                Self::handle_store_result(op, request_id, store.create_note(book_id, &note).await, |note| {
                    StoreResponse::NoteCreated { request_id, note }
                })
            }
        }
    }
}
