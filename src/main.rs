//! Line-oriented terminal host.
//!
//! Reads one command per line from stdin, turns it into library [`Event`]s,
//! executes the resulting [`Action`]s and redraws the frame.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  stdin lines                 │
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐       Dispatch        ┌─────────────────┐
//! │  AppState (handle_event)     │ ────────────────────▶ │  StoreWorker    │
//! │                              │ ◀──────────────────── │  (tokio tasks)  │
//! └──────────────────────────────┘   StoreResponse       └─────────────────┘
//! ```
//!
//! Store requests run as tasks on a current-thread runtime. Their responses come
//! back over a channel and go through `handle_event` like any other input, so the
//! state is only ever touched from the main loop.
//!
//! # Commands
//!
//! - `j` / `k`: Move down / up
//! - `o`: Open the selected book
//! - `b`: Back to the list, or leave search
//! - `/text`: Search for `text`; a bare `/` opens the search field
//! - `t` / `s`: Cycle filter / sort
//! - `filter <all|read|unread|favorite>`, `sort <name|author|theme>`
//! - `r`: Toggle read, `f`: toggle favorite, `0`-`5`: rate
//! - `d`: Delete the focused book
//! - `add name=...;author=...`: Create a book
//! - `edit key=value;...`: Edit the focused book
//! - `note <text>`: Add a note on the detail screen
//! - `R`: Reload, `x`: dismiss errors, `q`: quit

#![allow(clippy::multiple_crate_versions)]

use std::collections::BTreeMap;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use bookshelf::app::state::LIST_CHROME_ROWS;
use bookshelf::app::{EditorSlot, FilterMode, SortKey};
use bookshelf::store::{self, StoreResponse, StoreWorker};
use bookshelf::{handle_event, Action, AppState, Config, Event, InputMode, Screen};

const COLUMNS: usize = 100;

/// Host state around the library's `AppState`.
struct Host {
    app: AppState,
    worker: StoreWorker,
    responses: mpsc::UnboundedSender<StoreResponse>,
    rows: usize,
    notice: Option<String>,
}

impl Host {
    /// Applies one event and executes its actions. Returns `false` on quit.
    fn apply(&mut self, event: &Event) -> bool {
        let (render, actions) = match handle_event(&mut self.app, event) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(error = %e, "event rejected");
                self.notice = Some(e.user_message());
                return true;
            }
        };

        let mut running = true;
        for action in actions {
            running &= self.execute(action);
        }
        if render {
            self.draw();
        }
        running
    }

    fn execute(&mut self, action: Action) -> bool {
        match action {
            Action::Dispatch(request) => {
                let worker = self.worker.clone();
                let responses = self.responses.clone();
                tokio::spawn(async move {
                    let response = worker.handle_request(request).await;
                    // The receiver is gone only after the loop has stopped.
                    let _ = responses.send(response);
                });
            }
            Action::ExitDetail { id } => tracing::debug!(book_id = id, "detail screen exited"),
            Action::Notify { message } => self.notice = Some(message),
            Action::Quit => return false,
        }
        true
    }

    fn draw(&mut self) {
        print!("\x1b[2J\x1b[H{}", bookshelf::ui::render(&self.app, self.rows, COLUMNS));
        if let Some(notice) = self.notice.take() {
            print!("\n{notice}");
        }
        println!();
    }
}

/// Parses `key=value;key=value` form input.
fn parse_fields(input: &str) -> BTreeMap<String, String> {
    input
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Maps one input line to events, or a message when the line is not understood.
fn parse_command(line: &str, app: &AppState) -> Result<Vec<Event>, String> {
    let line = line.trim();
    let slot = app.focused_slot();
    let with_slot = |make: fn(EditorSlot) -> Event| -> Vec<Event> { slot.map(make).into_iter().collect() };

    if let Some(text) = line.strip_prefix('/') {
        if text.is_empty() {
            return Ok(vec![Event::SearchMode]);
        }
        return Ok(vec![Event::SearchMode, Event::SetSearch(text.to_string()), Event::FocusResults]);
    }

    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let events = match command {
        "" => vec![],
        "j" => vec![Event::KeyDown],
        "k" => vec![Event::KeyUp],
        "o" => vec![Event::OpenSelected],
        "b" => match (app.screen, app.input_mode) {
            (Screen::Detail(_), _) => vec![Event::CloseDetail],
            (Screen::List, InputMode::Search(_)) => vec![Event::ExitSearch],
            (Screen::List, InputMode::Normal) => vec![],
        },
        "t" => vec![Event::CycleFilter],
        "s" => vec![Event::CycleSort],
        "filter" => vec![Event::SetFilter(rest.parse::<FilterMode>().map_err(|e| e.user_message())?)],
        "sort" => vec![Event::SetSort(rest.parse::<SortKey>().map_err(|e| e.user_message())?)],
        "R" => vec![Event::Reload],
        "r" => with_slot(Event::ToggleRead),
        "f" => with_slot(Event::ToggleFavorite),
        "d" => slot.map(|s| Event::DeleteBook(s.book_id())).into_iter().collect(),
        "add" => vec![Event::CreateBook { fields: parse_fields(rest) }],
        "edit" => slot
            .map(|slot| Event::EditBook { slot, fields: parse_fields(rest) })
            .into_iter()
            .collect(),
        "note" => match app.screen {
            Screen::Detail(book_id) => vec![Event::AddNote { book_id, content: rest.to_string() }],
            Screen::List => return Err("Ouvrez un livre pour ajouter une note".to_string()),
        },
        "x" => vec![Event::DismissError],
        "q" => vec![Event::Quit],
        digit => match digit.parse::<u8>() {
            Ok(stars) => slot.map(|slot| Event::Rate { slot, stars }).into_iter().collect(),
            Err(_) => return Err(format!("Commande inconnue : {digit}")),
        },
    };
    Ok(events)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> bookshelf::Result<()> {
    let config = Config::load_default()?.apply_env();
    bookshelf::observability::init_tracing(&config);

    let span = tracing::debug_span!("host_start");
    let guard = span.entered();
    let store = store::from_config(&config)?;
    let (responses, mut incoming) = mpsc::unbounded_channel();
    let mut host = Host {
        app: bookshelf::initialize(&config),
        worker: StoreWorker::new(store),
        responses,
        rows: config.page_size + LIST_CHROME_ROWS,
        notice: None,
    };
    drop(guard);

    host.apply(&Event::ViewEntered);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let events = match parse_command(&line, &host.app) {
                    Ok(events) => events,
                    Err(message) => {
                        host.notice = Some(message);
                        host.draw();
                        continue;
                    }
                };
                if !events.iter().all(|event| host.apply(event)) {
                    break;
                }
            }
            Some(response) = incoming.recv() => {
                host.apply(&Event::StoreResponse(response));
            }
        }
    }

    host.apply(&Event::Detach);
    tracing::debug!("host stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf::Theme;

    #[test]
    fn form_fields_are_trimmed_and_keyed() {
        let fields = parse_fields("name= Dune ; year=1965;broken;=x");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["name"], "Dune");
        assert_eq!(fields["year"], "1965");
    }

    #[test]
    fn search_command_opens_search_and_focuses_results() {
        let app = AppState::new(Theme::default());
        let events = parse_command("/dune", &app).unwrap();
        assert_eq!(events, [Event::SearchMode, Event::SetSearch("dune".into()), Event::FocusResults]);
    }

    #[test]
    fn status_commands_need_a_focused_book() {
        let app = AppState::new(Theme::default());
        assert!(parse_command("r", &app).unwrap().is_empty());
        assert!(parse_command("4", &app).unwrap().is_empty());
        assert!(parse_command("note hello", &app).is_err());
        assert!(parse_command("wat", &app).is_err());
        assert_eq!(parse_command("filter fav", &app).unwrap(), [Event::SetFilter(FilterMode::Favorite)]);
    }
}
