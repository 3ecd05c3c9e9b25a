//! Application state and view model computation.
//!
//! [`AppState`] ties the pieces together: the [`LibraryController`] that owns the
//! collection, the [`QueryState`] that shapes the visible list, the
//! [`RecordEditor`]s mounted by child views, and the table of requests in flight.
//! It is mutated only by [`handle_event`](crate::app::handle_event), which turns
//! each state transition into [`Action`]s for the host.
//!
//! # Request bookkeeping
//!
//! Every store request is registered under its request id together with what it
//! was for ([`InFlight`]). A response is matched to that entry, never to the kind
//! of response alone, so a response for a request that was abandoned (the detail
//! screen closed, the view lost focus) finds no entry and is dropped.
//!
//! # Example
//!
//! ```rust
//! use bookshelf::app::AppState;
//! use bookshelf::ui::{viewmodel::ScreenViewModel, Theme};
//!
//! let mut state = AppState::new(Theme::default());
//! let _reload = state.view_entered();
//!
//! let ScreenViewModel::Library(vm) = state.compute_viewmodel(24, 80) else {
//!     unreachable!();
//! };
//! assert!(vm.loading);
//! assert!(vm.rows.is_empty());
//! ```

use super::actions::Action;
use super::modes::{InputMode, Screen, SearchFocus};
use super::patch::{EditorSlot, PatchReport, RecordEditor};
use super::query::{self, FilterMode, QueryState, SortKey};
use super::sync::{LibraryController, PatchOutcome, PatchTicket, ReloadOutcome, ReloadTicket, RemovalTicket, RequestId};
use crate::domain::error::Result;
use crate::domain::{Book, BookDraft, BookId, BookPatch, LibraryError, NewNote, Note};
use crate::store::{ListParams, StoreRequest, StoreResponse};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{
    BookDetail, BookRow, DetailViewModel, EmptyState, FooterInfo, HeaderInfo, LibraryViewModel, NoteRow,
    QueryBarInfo, ScreenViewModel,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Rows taken by everything on the list screen except the book rows: header,
/// query bar, filter line, separator and a two-line footer.
pub const LIST_CHROME_ROWS: usize = 6;

const NOTE_REQUIRED: &str = "Veuillez entrer une note avant de valider.";

/// What a request in flight was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InFlight {
    Reload(ReloadTicket),
    Patch { slot: EditorSlot, ticket: PatchTicket },
    Removal(RemovalTicket),
    Create,
    FetchDetail(BookId),
    Notes(BookId),
    AddNote(BookId),
}

impl InFlight {
    /// Requests owned by the detail screen, dropped when it closes.
    const fn belongs_to_detail(&self) -> bool {
        matches!(
            self,
            Self::FetchDetail(_) | Self::Notes(_) | Self::AddNote(_) | Self::Patch { slot: EditorSlot::Detail(_), .. }
        )
    }
}

/// State of an open detail screen, apart from its record editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub id: BookId,
    pub loading: bool,
    pub missing: bool,
    pub error: Option<String>,
    pub notes: Vec<Note>,
    pub notes_loading: bool,
    pub notes_error: Option<String>,
}

impl DetailView {
    const fn new(id: BookId) -> Self {
        Self {
            id,
            loading: true,
            missing: false,
            error: None,
            notes: Vec::new(),
            notes_loading: true,
            notes_error: None,
        }
    }
}

/// Central application state container.
#[derive(Debug)]
pub struct AppState {
    /// Owner of the authoritative collection.
    pub library: LibraryController,

    /// Search text, filter and sort of the list screen.
    pub query: QueryState,

    pub screen: Screen,

    pub input_mode: InputMode,

    /// Selection within `visible`. Wraps around during navigation.
    pub selected_index: usize,

    /// The view collection: `library` run through the query pipeline.
    /// Recomputed by [`Self::refresh_view`].
    pub visible: Vec<Arc<Book>>,

    /// Transient copies held by list rows and the detail screen.
    pub editors: HashMap<EditorSlot, RecordEditor>,

    /// The open detail screen, if any.
    pub detail: Option<DetailView>,

    /// Server-side filters sent with every reload.
    pub list_params: ListParams,

    /// Passed in at construction, read by the renderer.
    pub theme: Theme,

    requests: HashMap<RequestId, InFlight>,
}

impl AppState {
    /// Creates an empty state. Nothing is loaded until the view is entered.
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self {
            library: LibraryController::new(),
            query: QueryState::default(),
            screen: Screen::List,
            input_mode: InputMode::Normal,
            selected_index: 0,
            visible: Vec::new(),
            editors: HashMap::new(),
            detail: None,
            list_params: ListParams::new(),
            theme,
            requests: HashMap::new(),
        }
    }

    /// What the request `request_id` was issued for, while it is in flight.
    #[must_use]
    pub fn in_flight(&self, request_id: RequestId) -> Option<InFlight> {
        self.requests.get(&request_id).copied()
    }

    /// Number of requests still awaiting a response.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    /// Re-derives `visible` from the library, keeping the selected book selected
    /// when it is still visible.
    pub fn refresh_view(&mut self) {
        let selected = self.selected_book().and_then(|b| b.id);
        self.visible = self.library.view(&self.query);

        self.selected_index = selected
            .and_then(|id| self.visible.iter().position(|b| b.id == Some(id)))
            .unwrap_or_else(|| self.selected_index.min(self.visible.len().saturating_sub(1)));
    }

    pub fn move_selection_down(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.selected_index = (self.selected_index + 1) % self.visible.len();
    }

    pub fn move_selection_up(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = self.visible.len() - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    #[must_use]
    pub fn selected_book(&self) -> Option<&Arc<Book>> {
        self.visible.get(self.selected_index)
    }

    /// The editor slot keyboard edits apply to: the detail screen when one is
    /// open, the selected row otherwise.
    #[must_use]
    pub fn focused_slot(&self) -> Option<EditorSlot> {
        match self.screen {
            Screen::Detail(id) => Some(EditorSlot::Detail(id)),
            Screen::List => self.selected_book().and_then(|b| b.id).map(EditorSlot::ListItem),
        }
    }

    /// The record a slot currently shows: its editor's copy, or the library's
    /// record for list rows without an editor.
    #[must_use]
    pub fn record_for(&self, slot: EditorSlot) -> Option<&Book> {
        if let Some(editor) = self.editors.get(&slot) {
            return Some(editor.current());
        }
        match slot {
            EditorSlot::ListItem(id) => self.library.get(id).map(|book| &**book),
            EditorSlot::Detail(_) => None,
        }
    }

    pub fn set_search_text(&mut self, text: String) {
        self.query.search_text = text;
        self.refresh_view();
    }

    pub fn set_filter(&mut self, filter: FilterMode) {
        self.query.filter = filter;
        self.refresh_view();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.query.sort = sort;
        self.refresh_view();
    }

    fn dispatch_reload(&mut self, ticket: ReloadTicket) -> Action {
        let request_id = ticket.request_id();
        self.requests.insert(request_id, InFlight::Reload(ticket));
        Action::Dispatch(StoreRequest::list_books(request_id, self.list_params.clone()))
    }

    /// Issues a reload, superseding any reload in flight.
    pub fn reload(&mut self) -> Action {
        let ticket = self.library.begin_reload();
        self.dispatch_reload(ticket)
    }

    /// The list became visible.
    pub fn view_entered(&mut self) -> Action {
        let ticket = self.library.on_view_entered();
        self.dispatch_reload(ticket)
    }

    /// The list lost visibility. Reloads in flight are cancelled.
    pub fn view_left(&mut self) {
        self.library.on_view_left();
        self.requests.retain(|_, flight| !matches!(flight, InFlight::Reload(_)));
    }

    /// The owner is gone: nothing in flight will be applied.
    pub fn detach(&mut self) {
        self.library.detach();
        self.requests.clear();
    }

    /// Applies `patch` to the copy shown by `slot` right away and sends it.
    ///
    /// A list row mounts its editor on first edit. The detail screen's editor is
    /// mounted when the screen opens; before its record is known there is nothing
    /// to edit and `None` is returned.
    pub fn edit(&mut self, slot: EditorSlot, patch: BookPatch) -> Option<Action> {
        let id = slot.book_id();
        if patch.is_empty() {
            return None;
        }

        if !self.editors.contains_key(&slot) {
            let EditorSlot::ListItem(_) = slot else {
                tracing::debug!(?slot, "detail record not loaded yet, edit dropped");
                return None;
            };
            let Some(record) = self.library.get(id) else {
                tracing::debug!(book_id = id, "edit for a book the list does not hold");
                return None;
            };
            let editor = RecordEditor::mount(slot, Book::clone(record));
            self.editors.insert(slot, editor);
        }

        let ticket = self.library.begin_patch(id);
        let editor = self.editors.get_mut(&slot)?;
        editor.begin(ticket, patch.clone());

        let request_id = ticket.request_id();
        self.requests.insert(request_id, InFlight::Patch { slot, ticket });
        Some(Action::Dispatch(StoreRequest::update_book(request_id, id, patch)))
    }

    /// Validates form input and sends the resulting update for `slot`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a numeric field does not parse.
    pub fn edit_fields(&mut self, slot: EditorSlot, fields: &std::collections::BTreeMap<String, String>) -> Result<Option<Action>> {
        let patch = BookPatch::from_fields(fields)?;
        Ok(self.edit(slot, patch))
    }

    /// Sends a deletion of `id`.
    pub fn remove(&mut self, id: BookId) -> Action {
        let ticket = self.library.begin_removal(id);
        let request_id = ticket.request_id();
        self.requests.insert(request_id, InFlight::Removal(ticket));
        Action::Dispatch(StoreRequest::delete_book(request_id, id))
    }

    /// Sends the creation of a new book.
    pub fn create(&mut self, draft: BookDraft) -> Action {
        let request_id = self.library.issue_request_id();
        self.requests.insert(request_id, InFlight::Create);
        Action::Dispatch(StoreRequest::create_book(request_id, draft))
    }

    /// Opens the detail screen of `id`, closing any other one first.
    ///
    /// The screen starts from the library's copy when there is one and always
    /// fetches the record and its notes.
    pub fn open_detail(&mut self, id: BookId) -> Vec<Action> {
        if self.detail.is_some() {
            self.teardown_detail();
        }

        self.screen = Screen::Detail(id);
        self.input_mode = InputMode::Normal;
        self.detail = Some(DetailView::new(id));

        let slot = EditorSlot::Detail(id);
        if let Some(record) = self.library.get(id) {
            let editor = RecordEditor::mount(slot, Book::clone(record));
            self.editors.insert(slot, editor);
        }

        let fetch = self.library.issue_request_id();
        self.requests.insert(fetch, InFlight::FetchDetail(id));
        let notes = self.library.issue_request_id();
        self.requests.insert(notes, InFlight::Notes(id));

        vec![
            Action::Dispatch(StoreRequest::get_book(fetch, id)),
            Action::Dispatch(StoreRequest::list_notes(notes, id)),
        ]
    }

    /// Closes the detail screen. The list regains focus, which reloads it.
    pub fn close_detail(&mut self) -> Vec<Action> {
        if self.detail.is_none() {
            return vec![];
        }
        self.teardown_detail();
        vec![self.view_entered()]
    }

    fn teardown_detail(&mut self) {
        let Some(detail) = self.detail.take() else {
            return;
        };
        self.screen = Screen::List;

        if let Some(editor) = self.editors.remove(&EditorSlot::Detail(detail.id)) {
            for ticket in editor.unmount() {
                self.library.release_patch(ticket);
            }
        }
        self.requests.retain(|_, flight| !flight.belongs_to_detail());
        tracing::debug!(book_id = detail.id, "detail screen closed");
    }

    /// Sends a note for the open detail screen.
    pub fn add_note(&mut self, book_id: BookId, content: &str) -> Option<Action> {
        let detail = self.detail.as_mut().filter(|d| d.id == book_id)?;

        let Ok(note) = NewNote::new(content) else {
            detail.notes_error = Some(NOTE_REQUIRED.to_string());
            return None;
        };
        detail.notes_error = None;

        let request_id = self.library.issue_request_id();
        self.requests.insert(request_id, InFlight::AddNote(book_id));
        Some(Action::Dispatch(StoreRequest::create_note(request_id, book_id, note)))
    }

    /// Dismisses the list banner and the focused editor's error.
    pub fn dismiss_errors(&mut self) {
        self.library.dismiss_error();
        if let Some(editor) = self.focused_slot().and_then(|slot| self.editors.get_mut(&slot)) {
            editor.dismiss_error();
        }
        if let Some(detail) = &mut self.detail {
            detail.error = None;
            detail.notes_error = None;
        }
    }

    /// Routes a store response to whatever issued its request.
    ///
    /// Returns `None` when the response belongs to no request in flight.
    pub fn apply_response(&mut self, response: StoreResponse) -> Option<Vec<Action>> {
        let request_id = response.request_id();
        let Some(flight) = self.requests.remove(&request_id) else {
            tracing::debug!(request_id, "response for an abandoned request, dropping");
            return None;
        };
        let _span = tracing::debug_span!("apply_response", request_id, ?flight).entered();

        let actions = match (flight, response) {
            (InFlight::Reload(ticket), StoreResponse::BooksLoaded { books, .. }) => {
                self.finish_reload(ticket, Ok(books));
                vec![]
            }
            (InFlight::Reload(ticket), StoreResponse::Failed { error, .. }) => {
                self.finish_reload(ticket, Err(error.into()));
                vec![]
            }
            (InFlight::Patch { slot, ticket }, StoreResponse::BookUpdated { book, .. }) => {
                self.finish_patch(slot, ticket, Ok(book))
            }
            (InFlight::Patch { slot, ticket }, StoreResponse::Failed { error, .. }) => {
                self.finish_patch(slot, ticket, Err(error.into()))
            }
            (InFlight::Removal(ticket), StoreResponse::BookDeleted { message, .. }) => {
                self.finish_removal(ticket, message)
            }
            (InFlight::Removal(ticket), StoreResponse::Failed { error, .. }) => {
                self.library.release_removal(ticket);
                let message = error.user_message();
                if let Some(detail) = self.detail.as_mut().filter(|d| d.id == ticket.book_id()) {
                    detail.error = Some(message.clone());
                }
                vec![Action::Notify { message }]
            }
            (InFlight::Create, StoreResponse::BookCreated { book, .. }) => {
                if self.library.commit_created(request_id, book) == PatchOutcome::Applied {
                    self.refresh_view();
                }
                vec![]
            }
            (InFlight::Create, StoreResponse::Failed { error, .. }) => {
                vec![Action::Notify { message: error.user_message() }]
            }
            (InFlight::FetchDetail(id), StoreResponse::BookFetched { book, .. }) => {
                self.finish_fetch(id, book);
                vec![]
            }
            (InFlight::FetchDetail(id), StoreResponse::Failed { error, .. }) => {
                if let Some(detail) = self.detail.as_mut().filter(|d| d.id == id) {
                    detail.loading = false;
                    if error.is_not_found() {
                        detail.missing = true;
                    } else {
                        detail.error = Some(error.user_message());
                    }
                }
                vec![]
            }
            (InFlight::Notes(id), StoreResponse::NotesLoaded { notes, .. }) => {
                if let Some(detail) = self.detail.as_mut().filter(|d| d.id == id) {
                    detail.notes = notes;
                    detail.notes_loading = false;
                }
                vec![]
            }
            (InFlight::Notes(id), StoreResponse::Failed { error, .. }) => {
                if let Some(detail) = self.detail.as_mut().filter(|d| d.id == id) {
                    detail.notes_loading = false;
                    detail.notes_error = Some(error.user_message());
                }
                vec![]
            }
            (InFlight::AddNote(id), StoreResponse::NoteCreated { note, .. }) => {
                if let Some(detail) = self.detail.as_mut().filter(|d| d.id == id) {
                    detail.notes.push(note);
                }
                vec![]
            }
            (InFlight::AddNote(id), StoreResponse::Failed { error, .. }) => {
                if let Some(detail) = self.detail.as_mut().filter(|d| d.id == id) {
                    detail.notes_error = Some(error.user_message());
                }
                vec![]
            }
            (flight, response) => {
                tracing::warn!(?flight, ?response, "response does not match its request, abandoning");
                self.abandon(flight);
                vec![]
            }
        };
        Some(actions)
    }

    fn abandon(&mut self, flight: InFlight) {
        match flight {
            InFlight::Patch { slot, ticket } => {
                if let Some(editor) = self.editors.get_mut(&slot) {
                    let report = editor.resolve(
                        ticket.request_id(),
                        Err(LibraryError::Server { status: 200, message: "unexpected response".into() }),
                    );
                    tracing::debug!(?report, ?slot, "abandoned edit released");
                }
                let reverted = self.library.release_patch(ticket);
                tracing::debug!(reverted, book_id = ticket.book_id(), "abandoned patch ticket released");
            }
            InFlight::Removal(ticket) => {
                let reverted = self.library.release_removal(ticket);
                tracing::debug!(reverted, book_id = ticket.book_id(), "abandoned removal released");
            }
            InFlight::Reload(ticket) => {
                let outcome = self.library.complete_reload(
                    ticket,
                    Err(LibraryError::Server { status: 200, message: "unexpected response".into() }),
                );
                tracing::debug!(?outcome, "abandoned reload settled");
            }
            InFlight::FetchDetail(_) | InFlight::Notes(_) | InFlight::AddNote(_) | InFlight::Create => {}
        }
    }

    fn finish_reload(&mut self, ticket: ReloadTicket, result: Result<Vec<Book>>) {
        match self.library.complete_reload(ticket, result) {
            ReloadOutcome::Applied => {
                // Idle row editors are discarded; the reload is their new truth.
                self.editors
                    .retain(|slot, editor| matches!(slot, EditorSlot::Detail(_)) || !editor.is_idle());
                for (slot, editor) in &mut self.editors {
                    if let Some(record) = self.library.get(slot.book_id()) {
                        editor.refresh(record);
                    }
                }
                self.refresh_view();
            }
            outcome => tracing::debug!(?outcome, "reload not applied"),
        }
    }

    fn finish_patch(&mut self, slot: EditorSlot, ticket: PatchTicket, result: Result<Book>) -> Vec<Action> {
        let Some(editor) = self.editors.get_mut(&slot) else {
            self.library.release_patch(ticket);
            return vec![];
        };

        match editor.resolve(ticket.request_id(), result) {
            Some(PatchReport::Committed { ticket, record }) => {
                let outcome = self.library.commit_patch(ticket, record);
                tracing::debug!(?outcome, book_id = ticket.book_id(), "patch committed");
                self.refresh_view();
                vec![]
            }
            Some(PatchReport::Released { ticket }) => {
                let message = editor.error().map(String::from);
                if self.library.release_patch(ticket) {
                    self.refresh_view();
                }
                message.map(|message| Action::Notify { message }).into_iter().collect()
            }
            None => {
                self.library.release_patch(ticket);
                vec![]
            }
        }
    }

    fn finish_removal(&mut self, ticket: RemovalTicket, message: String) -> Vec<Action> {
        let id = ticket.book_id();
        let outcome = self.library.commit_removal(ticket);
        tracing::debug!(?outcome, book_id = id, "removal committed");

        self.editors.retain(|slot, _| matches!(slot, EditorSlot::Detail(_)) || slot.book_id() != id);
        self.refresh_view();

        let mut actions = vec![Action::Notify { message }];
        if self.screen == Screen::Detail(id) {
            actions.push(Action::ExitDetail { id });
            actions.extend(self.close_detail());
        }
        actions
    }

    fn finish_fetch(&mut self, id: BookId, book: Book) {
        let Some(detail) = self.detail.as_mut().filter(|d| d.id == id) else {
            return;
        };
        detail.loading = false;
        detail.missing = false;

        let slot = EditorSlot::Detail(id);
        match self.editors.get_mut(&slot) {
            Some(editor) => editor.refresh(&book),
            None => {
                self.editors.insert(slot, RecordEditor::mount(slot, book));
            }
        }
    }

    /// Computes the view model for a `rows` × `cols` screen.
    ///
    /// On the list screen only a window of the view collection is returned,
    /// centred on the selection and shifted at either end so the window stays
    /// full, as long as there are enough books to fill it.
    #[must_use]
    pub fn compute_viewmodel(&self, rows: usize, cols: usize) -> ScreenViewModel {
        match self.screen {
            Screen::List => ScreenViewModel::Library(self.compute_library_viewmodel(rows)),
            Screen::Detail(id) => ScreenViewModel::Detail(self.compute_detail_viewmodel(id, cols)),
        }
    }

    fn compute_library_viewmodel(&self, rows: usize) -> LibraryViewModel {
        let banner = self.library.error().map(String::from);
        let available_rows = rows
            .saturating_sub(LIST_CHROME_ROWS + usize::from(banner.is_some()))
            .max(1);

        let mut visible_start = self.selected_index.saturating_sub(available_rows / 2);
        let visible_end = (visible_start + available_rows).min(self.visible.len());
        if visible_end - visible_start < available_rows && self.visible.len() >= available_rows {
            visible_start = visible_end.saturating_sub(available_rows);
        }

        let rows: Vec<BookRow> = self.visible[visible_start.min(visible_end)..visible_end]
            .iter()
            .enumerate()
            .filter_map(|(offset, book)| self.compute_row(book, visible_start + offset))
            .collect();

        let empty_state = (self.visible.is_empty() && !self.library.is_loading()).then(|| {
            if self.library.books().is_empty() {
                EmptyState {
                    message: "Aucun livre disponible".to_string(),
                    subtitle: "Ajoutez un livre pour commencer".to_string(),
                }
            } else {
                EmptyState {
                    message: "Aucun livre ne correspond".to_string(),
                    subtitle: "Modifiez la recherche ou le filtre".to_string(),
                }
            }
        });

        LibraryViewModel {
            header: HeaderInfo {
                title: format!(" Bibliothèque ({}) ", self.visible.len()),
            },
            query_bar: self.compute_query_bar(),
            rows,
            selected_index: self.selected_index.saturating_sub(visible_start),
            banner,
            loading: self.library.is_loading(),
            empty_state,
            footer: self.compute_footer(),
        }
    }

    fn compute_row(&self, book: &Arc<Book>, absolute_idx: usize) -> Option<BookRow> {
        let id = book.id?;
        let editor = self.editors.get(&EditorSlot::ListItem(id));
        let shown = editor.map_or(&**book, RecordEditor::current);

        Some(BookRow {
            id,
            name: shown.name.clone(),
            author: shown.author.clone(),
            theme: shown.theme.clone(),
            year: shown.year,
            stars: shown.stars(),
            read: shown.read,
            favorite: shown.favorite,
            pending: editor.is_some_and(|e| !e.is_idle()),
            error: editor.and_then(RecordEditor::error).map(String::from),
            is_selected: absolute_idx == self.selected_index,
            highlight: query::highlight_range(&shown.name, &self.query.search_text),
        })
    }

    fn compute_query_bar(&self) -> QueryBarInfo {
        QueryBarInfo {
            search_text: self.query.search_text.clone(),
            placeholder: "Rechercher par titre ou auteur".to_string(),
            editing: self.input_mode.is_typing(),
            filter: self.query.filter,
            filters: FilterMode::ALL
                .iter()
                .map(|&mode| (filter_label(mode).to_string(), mode == self.query.filter))
                .collect(),
            sort: self.query.sort,
            sort_label: format!("Trier : {}", sort_label(self.query.sort)),
        }
    }

    fn compute_footer(&self) -> FooterInfo {
        let keybindings = match self.input_mode {
            InputMode::Search(SearchFocus::Typing) => "Esc: quitter la recherche  Entrée: résultats  Tapez pour filtrer",
            InputMode::Search(SearchFocus::Navigating) => {
                "Esc: quitter la recherche  /: modifier  j/k: naviguer  Entrée: détails"
            }
            InputMode::Normal => {
                "j/k: naviguer  /: rechercher  Entrée: détails  r: lu  f: favori  0-5: note  t: filtre  s: tri  q: quitter"
            }
        };
        FooterInfo { keybindings: keybindings.to_string() }
    }

    fn compute_detail_viewmodel(&self, id: BookId, cols: usize) -> DetailViewModel {
        let editor = self.editors.get(&EditorSlot::Detail(id));
        let detail = self.detail.as_ref().filter(|d| d.id == id);

        let book = editor.map(|editor| {
            let shown = editor.current();
            BookDetail {
                id,
                name: shown.name.clone(),
                author: shown.author.clone(),
                editor: shown.editor.clone(),
                theme: shown.theme.clone(),
                year: shown.year,
                stars: shown.stars(),
                read: shown.read,
                favorite: shown.favorite,
                cover: shown.cover.clone(),
                pending: !editor.is_idle(),
            }
        });

        let title = book.as_ref().map_or_else(|| "Livre".to_string(), |b| b.name.clone());
        let title = crate::ui::helpers::truncate(&title, cols.saturating_sub(4));

        let error = detail
            .and_then(|d| d.error.clone())
            .or_else(|| editor.and_then(RecordEditor::error).map(String::from));

        DetailViewModel {
            header: HeaderInfo { title: format!(" {title} ") },
            book,
            loading: detail.is_some_and(|d| d.loading),
            missing: detail.is_some_and(|d| d.missing),
            error,
            notes: detail
                .map(|d| {
                    d.notes
                        .iter()
                        .map(|note| NoteRow { date: note.display_date(), content: note.content.clone() })
                        .collect()
                })
                .unwrap_or_default(),
            notes_loading: detail.is_some_and(|d| d.notes_loading),
            notes_error: detail.and_then(|d| d.notes_error.clone()),
            footer: FooterInfo {
                keybindings: "r: lu  f: favori  0-5: note  note <texte>: ajouter  d: supprimer  Esc: retour".to_string(),
            },
        }
    }
}

const fn filter_label(mode: FilterMode) -> &'static str {
    match mode {
        FilterMode::All => "Tous",
        FilterMode::Read => "Lus",
        FilterMode::Unread => "Non lus",
        FilterMode::Favorite => "Favoris",
    }
}

const fn sort_label(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Name => "Titre",
        SortKey::Author => "Auteur",
        SortKey::Theme => "Thème",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: BookId, name: &str) -> Book {
        Book {
            id: Some(id),
            name: name.into(),
            author: format!("{name} author"),
            ..Book::default()
        }
    }

    fn request_id(action: &Action) -> RequestId {
        action.request().map(StoreRequest::request_id).unwrap()
    }

    fn loaded(books: Vec<Book>) -> AppState {
        let mut state = AppState::new(Theme::default());
        let reload = state.view_entered();
        state.apply_response(StoreResponse::BooksLoaded { request_id: request_id(&reload), books });
        state
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut state = loaded(vec![book(1, "A"), book(2, "B"), book(3, "C")]);
        state.move_selection_up();
        assert_eq!(state.selected_index, 2);
        state.move_selection_down();
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn selection_follows_the_book_across_refreshes() {
        let mut state = loaded(vec![book(1, "Alpha"), book(2, "Beta"), book(3, "Gamma")]);
        state.selected_index = 2;
        state.set_search_text("a".into());
        state.set_sort(SortKey::Name);
        assert_eq!(state.selected_book().unwrap().id, Some(3));
    }

    #[test]
    fn viewmodel_window_stays_full_near_the_end() {
        let books = (1..=30).map(|i| book(i, &format!("Book {i:02}"))).collect();
        let mut state = loaded(books);
        state.selected_index = 29;

        let ScreenViewModel::Library(vm) = state.compute_viewmodel(16, 80) else {
            panic!("expected the list screen");
        };
        assert_eq!(vm.rows.len(), 10);
        assert_eq!(vm.selected_index, 9);
        assert!(vm.rows[9].is_selected);
        assert_eq!(vm.rows[9].name, "Book 30");
    }

    #[test]
    fn empty_states_distinguish_no_books_from_no_match() {
        let mut state = loaded(vec![]);
        let ScreenViewModel::Library(vm) = state.compute_viewmodel(24, 80) else { unreachable!() };
        assert_eq!(vm.empty_state.unwrap().message, "Aucun livre disponible");

        let mut state2 = loaded(vec![book(1, "Dune")]);
        state2.set_search_text("zzz".into());
        let ScreenViewModel::Library(vm) = state2.compute_viewmodel(24, 80) else { unreachable!() };
        assert_eq!(vm.empty_state.unwrap().message, "Aucun livre ne correspond");

        state.reload();
        let ScreenViewModel::Library(vm) = state.compute_viewmodel(24, 80) else { unreachable!() };
        assert!(vm.empty_state.is_none());
        assert!(vm.loading);
    }

    #[test]
    fn rows_show_the_editor_copy_while_pending() {
        let mut state = loaded(vec![book(1, "Dune")]);
        let action = state.edit(EditorSlot::ListItem(1), BookPatch::favorite(true)).unwrap();
        assert!(matches!(action, Action::Dispatch(StoreRequest::UpdateBook { id: 1, .. })));

        let ScreenViewModel::Library(vm) = state.compute_viewmodel(24, 80) else { unreachable!() };
        assert!(vm.rows[0].favorite);
        assert!(vm.rows[0].pending);
        assert!(!state.library.get(1).unwrap().favorite);
    }

    #[test]
    fn detail_edits_wait_for_the_record() {
        let mut state = AppState::new(Theme::default());
        let actions = state.open_detail(9);
        assert_eq!(actions.len(), 2);
        assert!(state.edit(EditorSlot::Detail(9), BookPatch::read(true)).is_none());

        let fetch = request_id(&actions[0]);
        state.apply_response(StoreResponse::BookFetched { request_id: fetch, book: book(9, "Solaris") });
        assert!(state.edit(EditorSlot::Detail(9), BookPatch::read(true)).is_some());
    }

    #[test]
    fn blank_note_is_rejected_locally() {
        let mut state = AppState::new(Theme::default());
        state.open_detail(4);
        assert!(state.add_note(4, "   ").is_none());
        assert_eq!(state.detail.as_ref().unwrap().notes_error.as_deref(), Some(NOTE_REQUIRED));
        assert!(state.add_note(5, "wrong book").is_none());
        assert!(state.add_note(4, "Relire le chapitre 3").is_some());
        assert!(state.detail.as_ref().unwrap().notes_error.is_none());
    }

    #[test]
    fn mismatched_response_releases_the_edit() {
        let mut state = loaded(vec![book(1, "Dune")]);
        let update = state.edit(EditorSlot::ListItem(1), BookPatch::read(true)).unwrap();

        let actions = state.apply_response(StoreResponse::BooksLoaded { request_id: request_id(&update), books: vec![] });

        assert_eq!(actions, Some(vec![]));
        assert!(!state.library.is_pending(1));
        assert_eq!(state.pending_requests(), 0);
        let editor = &state.editors[&EditorSlot::ListItem(1)];
        assert!(editor.is_idle());
        assert!(editor.error().is_some());
        assert!(!editor.current().read);
    }
}
