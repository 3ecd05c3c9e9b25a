//! Authoritative book collection and its synchronization with the remote store.
//!
//! [`LibraryController`] owns the single in-memory copy of every book the list
//! knows about. It never performs I/O itself: callers ask it for a ticket before
//! sending a request and hand the response back with that ticket. Tickets carry a
//! monotonically increasing request id, which is what every ordering decision is
//! keyed on. Arrival order is never trusted.
//!
//! # Ordering rules
//!
//! - **Reloads**: only the most recently issued reload may replace the collection.
//!   A response for an older reload is discarded, even when it arrives last.
//! - **Patches**: each record remembers the request id of the server response it
//!   was last built from. A canonical record is only applied when its request is at
//!   least as new (last writer wins, per record).
//! - **Reloads racing patches**: while a patch is in flight for a record, an
//!   applied reload leaves that record alone and stashes its own copy. The patch's
//!   canonical response replaces the record when it commits; if the patch is
//!   released instead, the stashed copy is applied.
//! - **Removals**: a removed id is tombstoned with the removal's request id so an
//!   older reload still in flight cannot bring the record back.
//! - **Focus**: leaving the view cancels every reload issued so far; detaching
//!   ignores every completion from then on.
//!
//! # Example
//!
//! ```rust
//! use bookshelf::app::sync::{LibraryController, ReloadOutcome};
//! use bookshelf::domain::{Book, BookPatch};
//!
//! let mut library = LibraryController::new();
//! let ticket = library.on_view_entered();
//! let books = vec![
//!     Book { id: Some(1), name: "Ada".into(), ..Default::default() },
//!     Book { id: Some(2), name: "Beta".into(), ..Default::default() },
//! ];
//! assert_eq!(library.complete_reload(ticket, Ok(books)), ReloadOutcome::Applied);
//!
//! let patch = library.begin_patch(2);
//! let canonical = library.get(2).unwrap().with_patch(&BookPatch::rating(5));
//! library.commit_patch(patch, canonical);
//! assert_eq!(library.get(2).unwrap().rating, 5);
//! ```

use crate::domain::error::Result;
use crate::domain::{Book, BookId};
use crate::app::query::{self, QueryState};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Monotonic identifier attached to every request the view-model issues.
pub type RequestId = u64;

/// Handle for an issued reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReloadTicket(RequestId);

impl ReloadTicket {
    #[must_use]
    pub const fn request_id(self) -> RequestId {
        self.0
    }
}

/// Handle for an in-flight single-record update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchTicket {
    id: BookId,
    seq: RequestId,
}

impl PatchTicket {
    #[must_use]
    pub const fn book_id(self) -> BookId {
        self.id
    }

    #[must_use]
    pub const fn request_id(self) -> RequestId {
        self.seq
    }
}

/// Handle for an in-flight removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemovalTicket(PatchTicket);

impl RemovalTicket {
    #[must_use]
    pub const fn book_id(self) -> BookId {
        self.0.id
    }

    #[must_use]
    pub const fn request_id(self) -> RequestId {
        self.0.seq
    }
}

/// What [`LibraryController::complete_reload`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The collection was replaced.
    Applied,
    /// A newer reload was issued after this one; the response was dropped.
    Superseded,
    /// The view was left or detached before the response arrived.
    Cancelled,
    /// The reload failed; the previous collection is kept and the error is set.
    Failed,
}

/// What happened to a canonical record handed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The record was replaced (or inserted, for creations).
    Applied,
    /// A newer server response for the same record was already applied.
    Stale,
    /// The record is not in the collection (never loaded, or removed).
    Missing,
    /// The controller is detached.
    Ignored,
}

#[derive(Debug, Default)]
struct PendingRecord {
    seqs: BTreeSet<RequestId>,
    fallback: Option<(Arc<Book>, RequestId)>,
}

/// Owner of the authoritative book collection.
#[derive(Debug)]
pub struct LibraryController {
    books: Vec<Arc<Book>>,
    revisions: HashMap<BookId, RequestId>,
    pending: HashMap<BookId, PendingRecord>,
    tombstones: HashMap<BookId, RequestId>,
    next_seq: RequestId,
    latest_reload: Option<RequestId>,
    reload_floor: RequestId,
    loading: bool,
    loaded: bool,
    detached: bool,
    error: Option<String>,
}

impl Default for LibraryController {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            revisions: HashMap::new(),
            pending: HashMap::new(),
            tombstones: HashMap::new(),
            next_seq: 1,
            latest_reload: None,
            reload_floor: 0,
            loading: false,
            loaded: false,
            detached: false,
            error: None,
        }
    }

    /// Reserves the next request id. Used for requests that are not reloads or
    /// patches (creation, detail fetch, notes).
    pub fn issue_request_id(&mut self) -> RequestId {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// The authoritative collection, in server order plus local insertions.
    #[must_use]
    pub fn books(&self) -> &[Arc<Book>] {
        &self.books
    }

    #[must_use]
    pub fn get(&self, id: BookId) -> Option<&Arc<Book>> {
        self.books.iter().find(|b| b.id == Some(id))
    }

    /// Derives the view collection for `state`.
    #[must_use]
    pub fn view(&self, state: &QueryState) -> Vec<Arc<Book>> {
        query::apply(&self.books, state)
    }

    /// `true` while the latest reload is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// `true` once any reload has been applied.
    #[must_use]
    pub const fn has_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub const fn is_detached(&self) -> bool {
        self.detached
    }

    /// `true` while at least one update or removal is in flight for `id`.
    #[must_use]
    pub fn is_pending(&self, id: BookId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Message of the last reload failure, until dismissed or a reload succeeds.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Issues a reload. Any reload issued earlier is superseded.
    pub fn begin_reload(&mut self) -> ReloadTicket {
        let seq = self.issue_request_id();
        self.latest_reload = Some(seq);
        self.loading = true;
        tracing::debug!(request_id = seq, "reload issued");
        ReloadTicket(seq)
    }

    /// The list became visible: issue a reload.
    pub fn on_view_entered(&mut self) -> ReloadTicket {
        self.begin_reload()
    }

    /// The list lost visibility: every reload issued so far is cancelled.
    pub fn on_view_left(&mut self) {
        self.reload_floor = self.next_seq.saturating_sub(1);
        self.loading = false;
        tracing::debug!(floor = self.reload_floor, "in-flight reloads cancelled");
    }

    /// The owning view is gone. Every later completion is ignored.
    pub fn detach(&mut self) {
        self.detached = true;
        self.loading = false;
    }

    /// Hands a reload response back to the controller.
    pub fn complete_reload(&mut self, ticket: ReloadTicket, result: Result<Vec<Book>>) -> ReloadOutcome {
        let seq = ticket.0;
        let _span = tracing::debug_span!("complete_reload", request_id = seq).entered();

        if self.detached || seq <= self.reload_floor {
            tracing::debug!("reload completed after cancellation, ignoring");
            return ReloadOutcome::Cancelled;
        }
        if self.latest_reload != Some(seq) {
            tracing::debug!(latest = ?self.latest_reload, "stale reload response discarded");
            return ReloadOutcome::Superseded;
        }

        self.loading = false;

        match result {
            Ok(books) => {
                self.merge_reload(seq, books);
                self.loaded = true;
                self.error = None;
                ReloadOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, kept = self.books.len(), "reload failed, keeping previous collection");
                self.error = Some(e.user_message());
                ReloadOutcome::Failed
            }
        }
    }

    fn merge_reload(&mut self, seq: RequestId, incoming: Vec<Book>) {
        let mut next = Vec::with_capacity(incoming.len());
        let mut seen = HashSet::with_capacity(incoming.len());

        for book in incoming {
            let Some(id) = book.id else {
                tracing::debug!(name = %book.name, "skipping record without id");
                continue;
            };
            if !seen.insert(id) {
                continue;
            }
            if self.tombstones.get(&id).is_some_and(|&removed| removed > seq) {
                tracing::debug!(book_id = id, "record removed after reload was issued, skipping");
                continue;
            }

            let local = self.get(id).cloned();

            if let Some(pending) = self.pending.get_mut(&id) {
                let incoming = Arc::new(book);
                if pending.fallback.as_ref().map_or(true, |(_, at)| *at < seq) {
                    pending.fallback = Some((Arc::clone(&incoming), seq));
                }
                tracing::debug!(book_id = id, "patch in flight, keeping local record");
                next.push(local.unwrap_or(incoming));
                continue;
            }

            if let Some(local) = local {
                if self.revisions.get(&id).is_some_and(|&rev| rev > seq) {
                    next.push(local);
                    continue;
                }
                if *local == book {
                    self.revisions.insert(id, seq);
                    next.push(local);
                    continue;
                }
            }

            self.revisions.insert(id, seq);
            next.push(Arc::new(book));
        }

        // Records the reload did not mention but that a newer response (or an
        // in-flight patch) vouches for.
        for local in &self.books {
            let Some(id) = local.id else { continue };
            if seen.contains(&id) {
                continue;
            }
            let newer = self.revisions.get(&id).is_some_and(|&rev| rev > seq);
            if newer || self.pending.contains_key(&id) {
                next.push(Arc::clone(local));
            }
        }

        let kept: HashSet<BookId> = next.iter().filter_map(|b| b.id).collect();
        self.revisions
            .retain(|id, _| kept.contains(id) || self.pending.contains_key(id));
        self.tombstones.retain(|_, removed| *removed > seq);

        tracing::debug!(count = next.len(), "reload applied");
        self.books = next;
    }

    /// Registers an in-flight update for `id`.
    pub fn begin_patch(&mut self, id: BookId) -> PatchTicket {
        let seq = self.issue_request_id();
        self.pending.entry(id).or_default().seqs.insert(seq);
        tracing::debug!(book_id = id, request_id = seq, "patch issued");
        PatchTicket { id, seq }
    }

    /// Replaces exactly one record with the server's canonical copy.
    ///
    /// Every other record keeps its `Arc`, so views can detect the change by
    /// pointer comparison.
    pub fn commit_patch(&mut self, ticket: PatchTicket, canonical: Book) -> PatchOutcome {
        let PatchTicket { id, seq } = ticket;
        let _span = tracing::debug_span!("commit_patch", book_id = id, request_id = seq).entered();

        if self.detached {
            return PatchOutcome::Ignored;
        }

        if let Some(pending) = self.pending.get_mut(&id) {
            pending.seqs.remove(&seq);
            if pending.seqs.is_empty() {
                self.pending.remove(&id);
            }
        }

        if self.revisions.get(&id).is_some_and(|&rev| rev > seq) {
            tracing::debug!("newer response already applied, dropping canonical record");
            return PatchOutcome::Stale;
        }

        let Some(slot) = self.books.iter_mut().find(|b| b.id == Some(id)) else {
            tracing::debug!("patched record is not in the collection");
            return PatchOutcome::Missing;
        };

        let mut canonical = canonical;
        canonical.id = Some(id);
        *slot = Arc::new(canonical);
        self.revisions.insert(id, seq);
        PatchOutcome::Applied
    }

    /// Abandons an update after its request failed. The record is left as it was,
    /// unless a reload arrived meanwhile and this was the last patch in flight for
    /// it; then the reload's copy is applied now.
    pub fn release_patch(&mut self, ticket: PatchTicket) -> bool {
        let PatchTicket { id, seq } = ticket;

        let Some(pending) = self.pending.get_mut(&id) else {
            return false;
        };
        pending.seqs.remove(&seq);
        if !pending.seqs.is_empty() {
            return false;
        }
        let fallback = self.pending.remove(&id).and_then(|p| p.fallback);

        let Some((book, at)) = fallback else {
            return false;
        };
        if self.detached || self.revisions.get(&id).is_some_and(|&rev| rev > at) {
            return false;
        }

        tracing::debug!(book_id = id, reload = at, "applying reload copy held back by failed patch");
        match self.books.iter_mut().find(|b| b.id == Some(id)) {
            Some(slot) => *slot = book,
            None => self.books.push(book),
        }
        self.revisions.insert(id, at);
        true
    }

    /// Registers an in-flight removal for `id`.
    pub fn begin_removal(&mut self, id: BookId) -> RemovalTicket {
        RemovalTicket(self.begin_patch(id))
    }

    /// Removes the record after the server confirmed the deletion.
    pub fn commit_removal(&mut self, ticket: RemovalTicket) -> PatchOutcome {
        let PatchTicket { id, seq } = ticket.0;

        if self.detached {
            return PatchOutcome::Ignored;
        }

        self.pending.remove(&id);
        self.revisions.remove(&id);
        self.tombstones.insert(id, seq);

        let before = self.books.len();
        self.books.retain(|b| b.id != Some(id));
        if self.books.len() == before {
            PatchOutcome::Missing
        } else {
            tracing::debug!(book_id = id, "record removed");
            PatchOutcome::Applied
        }
    }

    /// Abandons a removal after its request failed.
    pub fn release_removal(&mut self, ticket: RemovalTicket) -> bool {
        self.release_patch(ticket.0)
    }

    /// Inserts a record the server just created. `request_id` must come from
    /// [`Self::issue_request_id`] before the creation request was sent.
    pub fn commit_created(&mut self, request_id: RequestId, book: Book) -> PatchOutcome {
        if self.detached {
            return PatchOutcome::Ignored;
        }
        let Some(id) = book.id else {
            tracing::warn!("server returned a created record without id");
            return PatchOutcome::Missing;
        };
        if self.revisions.get(&id).is_some_and(|&rev| rev > request_id) {
            return PatchOutcome::Stale;
        }

        let book = Arc::new(book);
        match self.books.iter_mut().find(|b| b.id == Some(id)) {
            Some(slot) => *slot = book,
            None => self.books.push(book),
        }
        self.revisions.insert(id, request_id);
        PatchOutcome::Applied
    }
}
