//! Side effects requested by the event handler.
//!
//! [`handle_event`](crate::app::handle_event) never performs I/O. It returns
//! `Action`s and the host executes them in order: store requests go to a
//! [`StoreWorker`](crate::store::StoreWorker) and their responses come back as
//! [`Event::StoreResponse`](crate::app::Event::StoreResponse).
//!
//! # Example
//!
//! ```rust
//! use bookshelf::app::Action;
//! use bookshelf::store::{ListParams, StoreRequest};
//!
//! let actions = vec![
//!     Action::Dispatch(StoreRequest::list_books(1, ListParams::new())),
//!     Action::Notify { message: "Livre supprimé".to_string() },
//! ];
//! assert_eq!(actions.len(), 2);
//! ```

use crate::domain::BookId;
use crate::store::StoreRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Execute a store request and feed its response back as an event.
    Dispatch(StoreRequest),

    /// The detail screen of `id` closed itself (after its book was deleted).
    /// Hosts with their own navigation stack pop it.
    ExitDetail { id: BookId },

    /// Transient message for the user (edit failures, delete confirmations).
    Notify { message: String },

    /// Stop the host.
    Quit,
}

impl Action {
    /// The request this action dispatches, if any.
    #[must_use]
    pub const fn request(&self) -> Option<&StoreRequest> {
        match self {
            Self::Dispatch(request) => Some(request),
            _ => None,
        }
    }
}
