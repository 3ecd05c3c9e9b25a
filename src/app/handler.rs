//! Event types and the event handler.
//!
//! Every input the view-model reacts to is an [`Event`]: keystrokes and commands
//! from the host, focus changes, and the store responses the host feeds back.
//! [`handle_event`] applies one event to [`AppState`] and reports whether a
//! re-render is needed, plus the [`Action`]s the host must execute.

use super::actions::Action;
use super::modes::{InputMode, Screen, SearchFocus};
use super::patch::EditorSlot;
use super::query::{FilterMode, SortKey};
use super::state::AppState;
use crate::domain::error::Result;
use crate::domain::{BookDraft, BookId, BookPatch};
use crate::store::StoreResponse;
use std::collections::BTreeMap;

/// Inputs to the view-model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The list became visible (initial mount or returning to it).
    ViewEntered,
    /// The list lost visibility.
    ViewLeft,
    /// The owning view is gone for good.
    Detach,

    KeyDown,
    KeyUp,

    /// Open the search field, keeping the current search text.
    SearchMode,
    /// Move focus from the search field to the results.
    FocusResults,
    /// Close the search field and clear the search text.
    ExitSearch,
    Char(char),
    Backspace,
    /// Replace the search text in one go.
    SetSearch(String),

    SetFilter(FilterMode),
    SetSort(SortKey),
    CycleFilter,
    CycleSort,
    /// Explicit reload.
    Reload,

    /// Open the detail screen of the selected book.
    OpenSelected,
    OpenBook(BookId),
    CloseDetail,

    ToggleRead(EditorSlot),
    ToggleFavorite(EditorSlot),
    Rate { slot: EditorSlot, stars: u8 },
    /// Edit form submitted. Fields are raw text keyed by book field name.
    EditBook { slot: EditorSlot, fields: BTreeMap<String, String> },
    DeleteBook(BookId),
    /// Creation form submitted.
    CreateBook { fields: BTreeMap<String, String> },
    AddNote { book_id: BookId, content: String },

    DismissError,
    Quit,

    /// A store request completed.
    StoreResponse(StoreResponse),
}

/// Processes an event, mutates application state, and returns actions to execute.
///
/// The boolean is `true` when the state changed in a way the host should render.
///
/// # Errors
///
/// Form events ([`Event::EditBook`], [`Event::CreateBook`]) return a validation
/// error when a numeric field does not parse. Nothing is sent in that case and
/// the state is unchanged, so the form can show the error and stay open. Every
/// other failure is recorded in the state and rendered.
///
/// # Example
///
/// ```rust
/// use bookshelf::app::{handle_event, Action, AppState, Event};
/// use bookshelf::ui::Theme;
///
/// let mut state = AppState::new(Theme::default());
/// let (render, actions) = handle_event(&mut state, &Event::ViewEntered)?;
/// assert!(render);
/// assert!(matches!(actions.as_slice(), [Action::Dispatch(_)]));
/// # Ok::<(), bookshelf::LibraryError>(())
/// ```
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::ViewEntered => Ok((true, vec![state.view_entered()])),
        Event::ViewLeft => {
            state.view_left();
            Ok((true, vec![]))
        }
        Event::Detach => {
            state.detach();
            Ok((false, vec![]))
        }
        Event::KeyDown => {
            state.move_selection_down();
            Ok((true, vec![]))
        }
        Event::KeyUp => {
            state.move_selection_up();
            Ok((true, vec![]))
        }
        Event::SearchMode => {
            if state.screen != Screen::List {
                return Ok((false, vec![]));
            }
            tracing::debug!("entering search mode");
            state.input_mode = InputMode::Search(SearchFocus::Typing);
            Ok((true, vec![]))
        }
        Event::FocusResults => {
            if state.query.needle().is_empty() {
                state.input_mode = InputMode::Normal;
            } else {
                state.input_mode = InputMode::Search(SearchFocus::Navigating);
            }
            Ok((true, vec![]))
        }
        Event::ExitSearch => {
            tracing::debug!(query = %state.query.search_text, "exiting search mode");
            state.input_mode = InputMode::Normal;
            state.set_search_text(String::new());
            Ok((true, vec![]))
        }
        Event::Char(c) => {
            if !state.input_mode.is_typing() {
                return Ok((false, vec![]));
            }
            let mut text = state.query.search_text.clone();
            text.push(*c);
            tracing::trace!(query = %text, "search text updated");
            state.set_search_text(text);
            Ok((true, vec![]))
        }
        Event::Backspace => {
            if !state.input_mode.is_typing() {
                return Ok((false, vec![]));
            }
            let mut text = state.query.search_text.clone();
            text.pop();
            state.set_search_text(text);
            Ok((true, vec![]))
        }
        Event::SetSearch(text) => {
            if state.screen != Screen::List {
                return Ok((false, vec![]));
            }
            state.set_search_text(text.clone());
            Ok((true, vec![]))
        }
        Event::SetFilter(filter) => {
            state.set_filter(*filter);
            Ok((true, vec![]))
        }
        Event::SetSort(sort) => {
            state.set_sort(*sort);
            Ok((true, vec![]))
        }
        Event::CycleFilter => {
            state.set_filter(state.query.filter.next());
            Ok((true, vec![]))
        }
        Event::CycleSort => {
            state.set_sort(state.query.sort.next());
            Ok((true, vec![]))
        }
        Event::Reload => Ok((true, vec![state.reload()])),
        Event::OpenSelected => {
            let Some(id) = state.selected_book().and_then(|b| b.id) else {
                tracing::debug!("no book selected");
                return Ok((false, vec![]));
            };
            Ok((true, open(state, id)))
        }
        Event::OpenBook(id) => Ok((true, open(state, *id))),
        Event::CloseDetail => {
            let actions = state.close_detail();
            Ok((!actions.is_empty(), actions))
        }
        Event::ToggleRead(slot) => {
            let Some(read) = state.record_for(*slot).map(|b| b.read) else {
                return Ok((false, vec![]));
            };
            Ok(edited(state.edit(*slot, BookPatch::read(!read))))
        }
        Event::ToggleFavorite(slot) => {
            let Some(favorite) = state.record_for(*slot).map(|b| b.favorite) else {
                return Ok((false, vec![]));
            };
            Ok(edited(state.edit(*slot, BookPatch::favorite(!favorite))))
        }
        Event::Rate { slot, stars } => Ok(edited(state.edit(*slot, BookPatch::rating(*stars)))),
        Event::EditBook { slot, fields } => Ok(edited(state.edit_fields(*slot, fields)?)),
        Event::DeleteBook(id) => {
            tracing::debug!(book_id = id, "deleting book");
            Ok((true, vec![state.remove(*id)]))
        }
        Event::CreateBook { fields } => {
            let draft = BookDraft::from_fields(fields)?;
            tracing::debug!(name = %draft.name, "creating book");
            Ok((false, vec![state.create(draft)]))
        }
        Event::AddNote { book_id, content } => {
            let action = state.add_note(*book_id, content);
            Ok((true, action.into_iter().collect()))
        }
        Event::DismissError => {
            state.dismiss_errors();
            Ok((true, vec![]))
        }
        Event::Quit => Ok((false, vec![Action::Quit])),
        Event::StoreResponse(response) => Ok(state
            .apply_response(response.clone())
            .map_or((false, vec![]), |actions| (true, actions))),
    }
}

fn open(state: &mut AppState, id: BookId) -> Vec<Action> {
    tracing::debug!(book_id = id, "opening detail screen");
    let actions = state.open_detail(id);
    // The list is covered by the detail screen.
    state.view_left();
    actions
}

fn edited(action: Option<Action>) -> (bool, Vec<Action>) {
    action.map_or((false, vec![]), |action| (true, vec![action]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Book;
    use crate::store::StoreRequest;
    use crate::ui::Theme;

    fn dispatched(actions: &[Action]) -> Vec<&StoreRequest> {
        actions.iter().filter_map(Action::request).collect()
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::new(Theme::default());
        let (_, actions) = handle_event(&mut state, &Event::ViewEntered).unwrap();
        let request_id = dispatched(&actions)[0].request_id();
        let books = vec![
            Book { id: Some(1), name: "Dune".into(), author: "Herbert".into(), ..Book::default() },
            Book { id: Some(2), name: "Emma".into(), author: "Austen".into(), read: true, ..Book::default() },
        ];
        handle_event(&mut state, &Event::StoreResponse(StoreResponse::BooksLoaded { request_id, books })).unwrap();
        state
    }

    #[test]
    fn typing_filters_only_in_search_mode() {
        let mut state = loaded_state();
        handle_event(&mut state, &Event::Char('e')).unwrap();
        assert_eq!(state.query.search_text, "");

        handle_event(&mut state, &Event::SearchMode).unwrap();
        for c in "emm".chars() {
            handle_event(&mut state, &Event::Char(c)).unwrap();
        }
        assert_eq!(state.visible.len(), 1);

        handle_event(&mut state, &Event::Backspace).unwrap();
        assert_eq!(state.query.search_text, "em");

        handle_event(&mut state, &Event::ExitSearch).unwrap();
        assert_eq!(state.input_mode, InputMode::Normal);
        assert_eq!(state.visible.len(), 2);
    }

    #[test]
    fn focus_results_with_blank_search_leaves_search_mode() {
        let mut state = loaded_state();
        handle_event(&mut state, &Event::SearchMode).unwrap();
        handle_event(&mut state, &Event::Char(' ')).unwrap();
        handle_event(&mut state, &Event::FocusResults).unwrap();
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn cycling_filter_reshapes_the_view() {
        let mut state = loaded_state();
        handle_event(&mut state, &Event::CycleFilter).unwrap();
        assert_eq!(state.query.filter, FilterMode::Read);
        assert_eq!(state.visible.len(), 1);
        assert_eq!(state.visible[0].name, "Emma");
    }

    #[test]
    fn toggle_read_sends_the_inverse() {
        let mut state = loaded_state();
        let (_, actions) = handle_event(&mut state, &Event::ToggleRead(EditorSlot::ListItem(2))).unwrap();
        let requests = dispatched(&actions);
        let [StoreRequest::UpdateBook { id, patch, .. }] = requests.as_slice() else {
            panic!("expected one update, got {actions:?}");
        };
        assert_eq!(*id, 2);
        assert_eq!(*patch, BookPatch::read(false));
    }

    #[test]
    fn invalid_form_input_is_an_error_and_sends_nothing() {
        let mut state = loaded_state();
        let fields = BTreeMap::from([("name".to_string(), "X".to_string()), ("year".to_string(), "MCMXC".to_string())]);

        assert!(handle_event(&mut state, &Event::CreateBook { fields }).is_err());
        assert_eq!(state.pending_requests(), 0);
    }

    #[test]
    fn opening_a_book_fetches_record_and_notes() {
        let mut state = loaded_state();
        state.selected_index = 1;
        let (_, actions) = handle_event(&mut state, &Event::OpenSelected).unwrap();

        assert_eq!(state.screen, Screen::Detail(2));
        let ops: Vec<_> = dispatched(&actions).iter().map(|r| r.operation()).collect();
        assert_eq!(ops, ["get_book", "list_notes"]);

        let (_, actions) = handle_event(&mut state, &Event::CloseDetail).unwrap();
        assert_eq!(state.screen, Screen::List);
        assert_eq!(dispatched(&actions)[0].operation(), "list_books");
    }

    #[test]
    fn search_events_are_ignored_on_the_detail_screen() {
        let mut state = loaded_state();
        handle_event(&mut state, &Event::OpenBook(1)).unwrap();

        assert_eq!(handle_event(&mut state, &Event::SetSearch("emma".into())).unwrap(), (false, vec![]));
        assert_eq!(handle_event(&mut state, &Event::SearchMode).unwrap(), (false, vec![]));
        assert_eq!(state.query.search_text, "");
        assert_eq!(state.visible.len(), 2);
    }

    #[test]
    fn quit_asks_the_host_to_stop() {
        let mut state = loaded_state();
        assert_eq!(handle_event(&mut state, &Event::Quit).unwrap(), (false, vec![Action::Quit]));
    }
}
