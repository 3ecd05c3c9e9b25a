//! Ordering scenarios driven through `handle_event`, the way a host feeds them.

use bookshelf::app::{EditorSlot, FilterMode};
use bookshelf::store::{MemoryBookStore, StoreRequest, StoreResponse, StoreWorker};
use bookshelf::{handle_event, Action, AppState, Book, Event, LibraryError, Screen, Theme};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

fn book(id: i64, name: &str) -> Book {
    Book { id: Some(id), name: name.into(), author: format!("{name} author"), ..Book::default() }
}

fn send(state: &mut AppState, event: Event) -> Vec<Action> {
    handle_event(state, &event).unwrap().1
}

fn request(actions: &[Action]) -> StoreRequest {
    actions.iter().find_map(Action::request).cloned().expect("a dispatched request")
}

fn books_loaded(request: &StoreRequest, books: Vec<Book>) -> Event {
    Event::StoreResponse(StoreResponse::BooksLoaded { request_id: request.request_id(), books })
}

fn names(state: &AppState) -> Vec<&str> {
    state.visible.iter().map(|b| b.name.as_str()).collect()
}

fn loaded(books: Vec<Book>) -> AppState {
    let mut state = AppState::new(Theme::default());
    let reload = request(&send(&mut state, Event::ViewEntered));
    send(&mut state, books_loaded(&reload, books));
    state
}

#[test]
fn older_reload_arriving_last_is_discarded() {
    let mut state = AppState::new(Theme::default());
    let first = request(&send(&mut state, Event::ViewEntered));
    let second = request(&send(&mut state, Event::Reload));

    send(&mut state, books_loaded(&second, vec![book(1, "Dune"), book(2, "Emma")]));
    send(&mut state, books_loaded(&first, vec![book(1, "Dune")]));

    assert_eq!(names(&state), ["Dune", "Emma"]);
    assert!(!state.library.is_loading());
}

#[test]
fn committed_edit_survives_an_older_reload() {
    let mut state = loaded(vec![book(1, "Dune")]);
    let reload = request(&send(&mut state, Event::Reload));
    let patch = request(&send(&mut state, Event::ToggleFavorite(EditorSlot::ListItem(1))));

    let canonical = Book { favorite: true, ..book(1, "Dune") };
    send(
        &mut state,
        Event::StoreResponse(StoreResponse::BookUpdated { request_id: patch.request_id(), book: canonical }),
    );
    send(&mut state, books_loaded(&reload, vec![book(1, "Dune")]));

    assert!(state.library.get(1).unwrap().favorite);
    assert!(state.visible[0].favorite);
}

#[test]
fn failed_edit_falls_back_to_the_reload_that_raced_it() {
    let mut state = loaded(vec![book(1, "Dune")]);
    let patch = request(&send(&mut state, Event::ToggleRead(EditorSlot::ListItem(1))));
    let reload = request(&send(&mut state, Event::Reload));

    let renamed = Book { author: "Frank Herbert".into(), ..book(1, "Dune") };
    send(&mut state, books_loaded(&reload, vec![renamed]));
    assert_eq!(state.library.get(1).unwrap().author, "Dune author");

    let failure = LibraryError::Server { status: 500, message: "Erreur lors de la mise à jour".into() };
    let actions = send(&mut state, Event::StoreResponse(StoreResponse::failed(patch.request_id(), &failure)));

    assert_eq!(actions, [Action::Notify { message: "Erreur lors de la mise à jour".into() }]);
    let record = state.library.get(1).unwrap();
    assert_eq!(record.author, "Frank Herbert");
    assert!(!record.read);
}

#[test]
fn removed_book_is_not_brought_back_by_an_older_reload() {
    let mut state = loaded(vec![book(1, "Dune"), book(2, "Emma")]);
    let reload = request(&send(&mut state, Event::Reload));
    let removal = request(&send(&mut state, Event::DeleteBook(2)));

    let actions = send(
        &mut state,
        Event::StoreResponse(StoreResponse::BookDeleted {
            request_id: removal.request_id(),
            id: 2,
            message: "Livre supprimé".into(),
        }),
    );
    assert_eq!(actions, [Action::Notify { message: "Livre supprimé".into() }]);

    send(&mut state, books_loaded(&reload, vec![book(1, "Dune"), book(2, "Emma")]));
    assert_eq!(names(&state), ["Dune"]);
}

#[test]
fn leaving_the_view_cancels_reloads_in_flight() {
    let mut state = AppState::new(Theme::default());
    let reload = request(&send(&mut state, Event::ViewEntered));
    send(&mut state, Event::ViewLeft);

    let (render, actions) = handle_event(&mut state, &books_loaded(&reload, vec![book(1, "Dune")])).unwrap();
    assert!(!render);
    assert!(actions.is_empty());
    assert!(!state.library.has_loaded());
}

#[test]
fn nothing_applies_after_detach() {
    let mut state = AppState::new(Theme::default());
    let reload = request(&send(&mut state, Event::ViewEntered));
    send(&mut state, Event::Detach);

    send(&mut state, books_loaded(&reload, vec![book(1, "Dune")]));
    assert!(state.visible.is_empty());
    assert!(state.library.is_detached());
}

#[test]
fn deleting_from_the_detail_screen_returns_to_the_list() {
    let mut state = loaded(vec![book(1, "Dune"), book(2, "Emma")]);
    send(&mut state, Event::OpenBook(1));
    let removal = request(&send(&mut state, Event::DeleteBook(1)));

    let actions = send(
        &mut state,
        Event::StoreResponse(StoreResponse::BookDeleted {
            request_id: removal.request_id(),
            id: 1,
            message: "Livre supprimé".into(),
        }),
    );

    assert_eq!(state.screen, Screen::List);
    assert!(actions.contains(&Action::ExitDetail { id: 1 }));
    assert_eq!(request(&actions).operation(), "list_books");
    assert_eq!(names(&state), ["Emma"]);
}

#[test]
fn failed_reload_keeps_the_collection_and_shows_a_banner() {
    let mut state = loaded(vec![book(1, "Dune")]);
    let reload = request(&send(&mut state, Event::Reload));
    let failure = LibraryError::Network("connection refused".into());
    send(&mut state, Event::StoreResponse(StoreResponse::failed(reload.request_id(), &failure)));

    assert_eq!(names(&state), ["Dune"]);
    assert!(state.library.error().is_some());

    send(&mut state, Event::DismissError);
    assert!(state.library.error().is_none());
}

/// Executes every dispatched request against `worker` until nothing is left in
/// flight, and returns the other actions in order.
async fn run(state: &mut AppState, worker: &StoreWorker, event: Event) -> Vec<Action> {
    let mut queue: VecDeque<Action> = send(state, event).into();
    let mut others = Vec::new();
    while let Some(action) = queue.pop_front() {
        match action {
            Action::Dispatch(request) => {
                let response = worker.handle_request(request).await;
                queue.extend(send(state, Event::StoreResponse(response)));
            }
            other => others.push(other),
        }
    }
    others
}

#[tokio::test]
async fn create_edit_and_filter_against_the_memory_store() {
    let store = Arc::new(MemoryBookStore::with_books([book(1, "Dune")]));
    let worker = StoreWorker::new(store);
    let mut state = AppState::new(Theme::default());

    run(&mut state, &worker, Event::ViewEntered).await;
    assert_eq!(names(&state), ["Dune"]);

    let fields = BTreeMap::from([
        ("name".to_string(), "Emma".to_string()),
        ("author".to_string(), "Jane Austen".to_string()),
        ("year".to_string(), "1815".to_string()),
    ]);
    run(&mut state, &worker, Event::CreateBook { fields }).await;
    assert_eq!(names(&state), ["Dune", "Emma"]);

    run(&mut state, &worker, Event::ToggleRead(EditorSlot::ListItem(2))).await;
    run(&mut state, &worker, Event::SetFilter(FilterMode::Read)).await;
    assert_eq!(names(&state), ["Emma"]);
    assert_eq!(state.pending_requests(), 0);

    run(&mut state, &worker, Event::OpenBook(2)).await;
    run(&mut state, &worker, Event::AddNote { book_id: 2, content: "Relu cet été".into() }).await;
    let detail = state.detail.as_ref().unwrap();
    assert_eq!(detail.notes.len(), 1);
    assert!(!detail.loading);
}
