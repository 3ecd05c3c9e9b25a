//! Application layer coordinating state, events, and actions.
//!
//! This module is the view-model proper. It sits between the host (main.rs or
//! any other front end) and the store, and never performs I/O itself.
//!
//! # Architecture
//!
//! ```text
//! User Input → Events → Event Handler → State Mutations → Actions → Store
//!                           ↑                                  ↓
//!                           └──────── Store Responses ─────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`handler`]: Event processing and state transitions
//! - [`modes`]: Input mode and screen types
//! - [`query`]: Search, filter and sort over the collection
//! - [`sync`]: Collection ownership, reload ordering and optimistic edit bookkeeping
//! - [`patch`]: Per-view optimistic editors for a single record
//! - [`state`]: Central application state container and view model computation
//!
//! # Example
//!
//! ```rust
//! use bookshelf::app::{handle_event, AppState, Event};
//! use bookshelf::ui::Theme;
//!
//! let mut state = AppState::new(Theme::default());
//! let (_render, actions) = handle_event(&mut state, &Event::ViewEntered)?;
//! assert_eq!(actions.len(), 1);
//! # Ok::<(), bookshelf::LibraryError>(())
//! ```

pub mod actions;
pub mod handler;
pub mod modes;
pub mod patch;
pub mod query;
pub mod state;
pub mod sync;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use modes::{InputMode, Screen, SearchFocus};
pub use patch::{EditorSlot, RecordEditor};
pub use query::{FilterMode, QueryState, SortKey};
pub use state::AppState;
pub use sync::LibraryController;
