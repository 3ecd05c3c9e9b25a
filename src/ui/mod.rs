//! User interface rendering layer with component-based architecture.
//!
//! This module turns view models into ANSI-styled text through small line
//! renderers. It owns theming and match highlighting but never touches the
//! terminal itself: [`render`] returns a frame and the host decides how to draw it.
//!
//! # Architecture
//!
//! ```text
//! AppState → compute_viewmodel → ScreenViewModel → render → ANSI frame
//! ```
//!
//! # Modules
//!
//! - [`viewmodel`]: View model types representing renderable UI state
//! - [`renderer`]: Top-level rendering coordinator
//! - `components`: Layouts and line renderers
//! - [`helpers`]: Shared rendering utilities (highlighting, truncation)
//! - [`theme`]: Color palettes and ANSI escape sequence generation

pub mod helpers;
pub mod renderer;
pub mod theme;
pub mod viewmodel;

mod components;

pub use renderer::render;
pub use theme::Theme;
pub use viewmodel::{BookRow, DetailViewModel, LibraryViewModel, ScreenViewModel};
