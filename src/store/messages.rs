//! Request and response protocol between the view-model and the store worker.
//!
//! The view-model never awaits anything. It emits a [`StoreRequest`] tagged with a
//! request id, the host executes it on the [`StoreWorker`](crate::store::StoreWorker),
//! and the matching [`StoreResponse`] comes back as an event carrying the same id.
//! Both directions are serde-serializable so a host may ship them across a thread
//! or process boundary. Requests also carry the caller's trace context so the
//! worker's spans join the trace of the event that caused them.

use crate::app::sync::RequestId;
use crate::domain::error::LibraryError;
use crate::domain::{Book, BookDraft, BookId, BookPatch, NewNote, Note};
use crate::store::backend::ListParams;
use serde::{Deserialize, Serialize};

/// Distributed tracing context carried across the request boundary.
///
/// Captures the current trace and span IDs from OpenTelemetry so the worker can
/// parent its spans under the span that issued the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking spans across the boundary.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Creates a trace context from the current tracing span.
    ///
    /// Returns `None` when no OpenTelemetry layer is installed or the current span
    /// context is invalid.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bookshelf::store::TraceContext;
    ///
    /// if let Some(ctx) = TraceContext::from_current() {
    ///     println!("Trace ID: {}", ctx.trace_id);
    /// }
    /// ```
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();
        let otel_context = span.context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }

    /// Rebuilds the remote parent context on the receiving side.
    #[must_use]
    pub fn to_otel_context(&self) -> Option<opentelemetry::Context> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_id = TraceId::from_hex(&self.trace_id).ok()?;
        let span_id = SpanId::from_hex(&self.parent_span_id).ok()?;

        let span_context = SpanContext::new(trace_id, span_id, TraceFlags::SAMPLED, true, TraceState::default());
        Some(opentelemetry::Context::current().with_remote_span_context(span_context))
    }
}

/// Generates `StoreRequest` constructors that attach the current trace context.
macro_rules! store_request_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl StoreRequest {
            $(
                #[doc = concat!("Create a ", stringify!($variant), " request with current trace context")]
                #[must_use]
                pub fn $builder_name(request_id: RequestId, $($field: $ty),*) -> Self {
                    Self::$variant {
                        request_id,
                        $($field,)*
                        trace_context: TraceContext::from_current(),
                    }
                }
            )*
        }
    };
}

store_request_builders! {
    list_books(ListBooks { params: ListParams }),
    get_book(GetBook { id: BookId }),
    create_book(CreateBook { draft: BookDraft }),
    update_book(UpdateBook { id: BookId, patch: BookPatch }),
    delete_book(DeleteBook { id: BookId }),
    list_notes(ListNotes { book_id: BookId }),
    create_note(CreateNote { book_id: BookId, note: NewNote }),
}

/// One remote operation to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreRequest {
    /// Fetch the whole collection.
    ListBooks {
        request_id: RequestId,
        params: ListParams,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Fetch one book.
    GetBook {
        request_id: RequestId,
        id: BookId,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Create a book from a draft.
    CreateBook {
        request_id: RequestId,
        draft: BookDraft,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Apply a partial update to one book.
    UpdateBook {
        request_id: RequestId,
        id: BookId,
        patch: BookPatch,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Delete one book.
    DeleteBook {
        request_id: RequestId,
        id: BookId,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Fetch the notes of one book.
    ListNotes {
        request_id: RequestId,
        book_id: BookId,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Attach a note to one book.
    CreateNote {
        request_id: RequestId,
        book_id: BookId,
        note: NewNote,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
}

impl StoreRequest {
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        match self {
            Self::ListBooks { request_id, .. }
            | Self::GetBook { request_id, .. }
            | Self::CreateBook { request_id, .. }
            | Self::UpdateBook { request_id, .. }
            | Self::DeleteBook { request_id, .. }
            | Self::ListNotes { request_id, .. }
            | Self::CreateNote { request_id, .. } => *request_id,
        }
    }

    #[must_use]
    pub const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::ListBooks { trace_context, .. }
            | Self::GetBook { trace_context, .. }
            | Self::CreateBook { trace_context, .. }
            | Self::UpdateBook { trace_context, .. }
            | Self::DeleteBook { trace_context, .. }
            | Self::ListNotes { trace_context, .. }
            | Self::CreateNote { trace_context, .. } => trace_context.as_ref(),
        }
    }

    /// Short operation name for logs.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::ListBooks { .. } => "list_books",
            Self::GetBook { .. } => "get_book",
            Self::CreateBook { .. } => "create_book",
            Self::UpdateBook { .. } => "update_book",
            Self::DeleteBook { .. } => "delete_book",
            Self::ListNotes { .. } => "list_notes",
            Self::CreateNote { .. } => "create_note",
        }
    }
}

/// Serializable form of a [`LibraryError`] for the trip back from the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreFailure {
    Network { message: String },
    NotFound { resource: String, id: i64, message: String },
    Validation { message: String },
    Server { status: u16, message: String },
    Config { message: String },
    Io { message: String },
}

impl StoreFailure {
    /// Message to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        LibraryError::from(self.clone()).user_message()
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<&LibraryError> for StoreFailure {
    fn from(err: &LibraryError) -> Self {
        match err {
            LibraryError::Network(message) => Self::Network { message: message.clone() },
            LibraryError::NotFound { resource, id, message } => Self::NotFound {
                resource: (*resource).to_string(),
                id: *id,
                message: message.clone(),
            },
            LibraryError::Validation(message) => Self::Validation { message: message.clone() },
            LibraryError::Server { status, message } => Self::Server { status: *status, message: message.clone() },
            LibraryError::Config(message) | LibraryError::Theme(message) => Self::Config { message: message.clone() },
            LibraryError::Io(e) => Self::Io { message: e.to_string() },
        }
    }
}

impl From<StoreFailure> for LibraryError {
    fn from(failure: StoreFailure) -> Self {
        match failure {
            StoreFailure::Network { message } => Self::Network(message),
            StoreFailure::NotFound { resource, id, message } => Self::NotFound {
                resource: if resource == "note" { "note" } else { "book" },
                id,
                message,
            },
            StoreFailure::Validation { message } => Self::Validation(message),
            StoreFailure::Server { status, message } => Self::Server { status, message },
            StoreFailure::Config { message } => Self::Config(message),
            StoreFailure::Io { message } => Self::Io(std::io::Error::other(message)),
        }
    }
}

/// Outcome of a [`StoreRequest`], tagged with the same request id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreResponse {
    BooksLoaded { request_id: RequestId, books: Vec<Book> },
    BookFetched { request_id: RequestId, book: Book },
    BookCreated { request_id: RequestId, book: Book },
    BookUpdated { request_id: RequestId, book: Book },
    BookDeleted { request_id: RequestId, id: BookId, message: String },
    NotesLoaded { request_id: RequestId, book_id: BookId, notes: Vec<Note> },
    NoteCreated { request_id: RequestId, note: Note },
    Failed { request_id: RequestId, error: StoreFailure },
}

impl StoreResponse {
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        match self {
            Self::BooksLoaded { request_id, .. }
            | Self::BookFetched { request_id, .. }
            | Self::BookCreated { request_id, .. }
            | Self::BookUpdated { request_id, .. }
            | Self::BookDeleted { request_id, .. }
            | Self::NotesLoaded { request_id, .. }
            | Self::NoteCreated { request_id, .. }
            | Self::Failed { request_id, .. } => *request_id,
        }
    }

    /// Builds the failure response for `request_id`.
    #[must_use]
    pub fn failed(request_id: RequestId, error: &LibraryError) -> Self {
        Self::Failed { request_id, error: StoreFailure::from(error) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_carry_the_request_id() {
        let request = StoreRequest::update_book(7, 2, BookPatch::read(true));
        assert_eq!(request.request_id(), 7);
        assert_eq!(request.operation(), "update_book");
        // No OpenTelemetry layer installed in unit tests.
        assert!(request.trace_context().is_none());
    }

    #[test]
    fn failures_survive_a_serialization_round() {
        let err = LibraryError::Server { status: 422, message: "Titre requis".into() };
        let response = StoreResponse::failed(3, &err);

        let json = serde_json::to_string(&response).unwrap();
        let back: StoreResponse = serde_json::from_str(&json).unwrap();

        let StoreResponse::Failed { error, .. } = back else {
            panic!("expected a failure, got {back:?}");
        };
        assert_eq!(error.user_message(), "Titre requis");
    }

    #[test]
    fn not_found_keeps_its_kind() {
        let failure = StoreFailure::from(&LibraryError::NotFound {
            resource: "book",
            id: 4,
            message: "Ce livre a été supprimé".into(),
        });
        assert!(failure.is_not_found());
        assert_eq!(failure.user_message(), "Ce livre a été supprimé");
        assert!(matches!(LibraryError::from(failure), LibraryError::NotFound { id: 4, .. }));
    }

    #[test]
    fn trace_context_parses_back_into_an_otel_context() {
        let ctx = TraceContext {
            trace_id: "4bf92f3577b34da6a3ce929d0e0e4736".into(),
            parent_span_id: "00f067aa0ba902b7".into(),
        };
        assert!(ctx.to_otel_context().is_some());

        let bad = TraceContext { trace_id: "zz".into(), parent_span_id: "00".into() };
        assert!(bad.to_otel_context().is_none());
    }
}
