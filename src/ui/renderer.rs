//! Top-level rendering coordinator.
//!
//! Rendering is two steps:
//!
//! 1. **View model computation**: [`AppState::compute_viewmodel`]
//! 2. **Component rendering**: the layout for the current screen
//!
//! # Example
//!
//! ```rust
//! use bookshelf::app::AppState;
//! use bookshelf::ui::{render, Theme};
//!
//! let state = AppState::new(Theme::default());
//! let frame = render(&state, 24, 80);
//! assert_eq!(frame.lines().count(), 24);
//! ```

use crate::app::AppState;
use crate::ui::components;
use crate::ui::viewmodel::ScreenViewModel;

/// Renders the current screen as `rows` newline-separated lines of ANSI text.
///
/// The frame does not clear the screen or move the cursor; that is up to the host.
#[must_use]
pub fn render(state: &AppState, rows: usize, cols: usize) -> String {
    let lines = match state.compute_viewmodel(rows, cols) {
        ScreenViewModel::Library(vm) => components::render_library(&vm, &state.theme, cols, rows),
        ScreenViewModel::Detail(vm) => components::render_detail(&vm, &state.theme, cols, rows),
    };
    lines.join("\n")
}
