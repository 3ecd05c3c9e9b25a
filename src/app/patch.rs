//! Transient record copies held by child views.
//!
//! A child view (a list row or the detail screen) never edits the shared record.
//! It mounts a [`RecordEditor`] with its own copy, applies each edit to that copy
//! immediately so the change is visible at once, and sends the update. When the
//! server answers, [`RecordEditor::resolve`] produces a [`PatchReport`]:
//!
//! - [`PatchReport::Committed`] carries the server's canonical record upward, and
//!   the owner hands it to [`LibraryController::commit_patch`].
//! - [`PatchReport::Released`] is only an acknowledgement. The editor has already
//!   reverted its copy to the last known-good value and recorded the error; the
//!   owner calls [`LibraryController::release_patch`] so the ticket does not
//!   linger.
//!
//! Two editors showing the same book are independent. They converge on the next
//! reload, not before.
//!
//! [`LibraryController::commit_patch`]: crate::app::sync::LibraryController::commit_patch
//! [`LibraryController::release_patch`]: crate::app::sync::LibraryController::release_patch

use crate::app::sync::{PatchTicket, RequestId};
use crate::domain::error::Result;
use crate::domain::{Book, BookId, BookPatch};

/// Where an editor lives. One editor per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorSlot {
    /// A row of the library list.
    ListItem(BookId),
    /// The detail screen of one book.
    Detail(BookId),
}

impl EditorSlot {
    #[must_use]
    pub const fn book_id(self) -> BookId {
        match self {
            Self::ListItem(id) | Self::Detail(id) => id,
        }
    }
}

/// Message from an editor to the collection owner once a request settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchReport {
    /// The server accepted the update; `record` is its canonical copy.
    Committed { ticket: PatchTicket, record: Book },
    /// The update failed and was rolled back locally.
    Released { ticket: PatchTicket },
}

impl PatchReport {
    #[must_use]
    pub const fn ticket(&self) -> PatchTicket {
        match self {
            Self::Committed { ticket, .. } | Self::Released { ticket } => *ticket,
        }
    }
}

/// A child view's private copy of one record.
#[derive(Debug, Clone)]
pub struct RecordEditor {
    slot: EditorSlot,
    current: Book,
    last_good: Book,
    pending: Vec<(PatchTicket, BookPatch)>,
    error: Option<String>,
}

impl RecordEditor {
    #[must_use]
    pub fn mount(slot: EditorSlot, record: Book) -> Self {
        Self {
            slot,
            current: record.clone(),
            last_good: record,
            pending: Vec::new(),
            error: None,
        }
    }

    #[must_use]
    pub const fn slot(&self) -> EditorSlot {
        self.slot
    }

    /// The copy to render: the last known-good record with every in-flight edit
    /// applied on top.
    #[must_use]
    pub const fn current(&self) -> &Book {
        &self.current
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// `true` if `request_id` belongs to an edit made through this editor.
    #[must_use]
    pub fn tracks(&self, request_id: RequestId) -> bool {
        self.pending.iter().any(|(t, _)| t.request_id() == request_id)
    }

    /// Applies an edit to the transient copy ahead of the server's answer.
    pub fn begin(&mut self, ticket: PatchTicket, patch: BookPatch) -> &Book {
        self.current = self.current.with_patch(&patch);
        self.pending.push((ticket, patch));
        self.error = None;
        &self.current
    }

    /// Settles the edit sent as `request_id`. Returns `None` if this editor did not
    /// send it.
    pub fn resolve(&mut self, request_id: RequestId, result: Result<Book>) -> Option<PatchReport> {
        let idx = self.pending.iter().position(|(t, _)| t.request_id() == request_id)?;
        let (ticket, _) = self.pending.remove(idx);

        let report = match result {
            Ok(canonical) => {
                self.last_good = canonical.clone();
                PatchReport::Committed { ticket, record: canonical }
            }
            Err(e) => {
                tracing::debug!(slot = ?self.slot, error = %e, "edit failed, reverting transient copy");
                self.error = Some(e.user_message());
                PatchReport::Released { ticket }
            }
        };

        self.current = self
            .pending
            .iter()
            .fold(self.last_good.clone(), |book, (_, patch)| book.with_patch(patch));

        Some(report)
    }

    /// Adopts a newer authoritative copy. Ignored while edits are in flight, since
    /// their canonical responses will arrive anyway.
    pub fn refresh(&mut self, record: &Book) {
        if self.pending.is_empty() && self.current != *record {
            self.current = record.clone();
            self.last_good = record.clone();
        }
    }

    /// Tears the editor down and returns the tickets still in flight so the owner
    /// can release them.
    #[must_use]
    pub fn unmount(self) -> Vec<PatchTicket> {
        self.pending.into_iter().map(|(t, _)| t).collect()
    }
}
