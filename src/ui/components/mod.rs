//! Screen layouts assembled from small line renderers.
//!
//! # Components
//!
//! - `header`: title bar
//! - `query_bar`: search field, filter chips and sort label
//! - `table`: book rows
//! - `empty`: empty state, loading line and error banner
//! - `detail`: record fields and notes of the detail screen
//! - `footer`: keybinding hints
//!
//! Layouts always produce exactly `rows` lines so a host redrawing in place
//! leaves nothing behind from the previous frame.

mod detail;
mod empty;
mod footer;
mod header;
mod query_bar;
mod table;

use crate::ui::theme::Theme;
use crate::ui::viewmodel::{DetailViewModel, LibraryViewModel};

use detail::render_detail_body;
use empty::{render_banner, render_empty_state, render_loading};
use footer::render_footer;
use header::render_header;
use query_bar::render_query_bar;
use table::render_rows;

fn render_border(color: &str, cols: usize) -> String {
    format!("{}{}{}", Theme::fg(color), "─".repeat(cols), Theme::reset())
}

/// Places `body` between `top` and a bordered footer, padding with blank lines.
fn frame(mut top: Vec<String>, body: Vec<String>, footer: String, theme: &Theme, cols: usize, rows: usize) -> Vec<String> {
    let room = rows.saturating_sub(top.len() + 2);
    top.extend(body.into_iter().take(room));
    while top.len() < rows.saturating_sub(2) {
        top.push(String::new());
    }
    top.push(render_border(&theme.colors.border, cols));
    top.push(footer);
    top
}

/// List screen:
///
/// ```text
/// [Header]
/// [Search field]
/// [Filters ... Sort]
/// [Error banner, if any]
/// [Border]
/// [Rows | Loading | Empty state]
/// [Blank padding]
/// [Border]
/// [Footer]
/// ```
#[must_use]
pub fn render_library(vm: &LibraryViewModel, theme: &Theme, cols: usize, rows: usize) -> Vec<String> {
    let mut top = vec![render_header(&vm.header, theme, cols)];
    top.extend(render_query_bar(&vm.query_bar, theme, cols));
    if let Some(message) = &vm.banner {
        top.push(render_banner(message, theme, cols));
    }
    top.push(render_border(&theme.colors.border, cols));

    let body: Vec<String> = if let Some(empty) = &vm.empty_state {
        render_empty_state(empty, theme, cols).into()
    } else if vm.rows.is_empty() && vm.loading {
        vec![render_loading(theme, cols)]
    } else {
        render_rows(&vm.rows, theme, cols)
    };

    frame(top, body, render_footer(&vm.footer, theme, cols), theme, cols, rows)
}

/// Detail screen: header, border, record and notes, footer.
#[must_use]
pub fn render_detail(vm: &DetailViewModel, theme: &Theme, cols: usize, rows: usize) -> Vec<String> {
    let top = vec![render_header(&vm.header, theme, cols), render_border(&theme.colors.border, cols)];
    let body = render_detail_body(vm, theme, cols);
    frame(top, body, render_footer(&vm.footer, theme, cols), theme, cols, rows)
}
