//! Book rows.
//!
//! ```text
//!   Dune                              Frank Herbert         ★★★★☆  ✓ ♥
//! ```

use crate::ui::helpers::{self, pad, stars, truncate};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::BookRow;

const NAME_WIDTH: usize = 34;
const AUTHOR_WIDTH: usize = 22;
/// Stars, read and favorite markers, pending/error marker.
const STATUS_WIDTH: usize = 12;

/// Renders every row, one line each.
#[must_use]
pub fn render_rows(rows: &[BookRow], theme: &Theme, cols: usize) -> Vec<String> {
    rows.iter().map(|row| render_row(row, theme, cols)).collect()
}

fn render_row(row: &BookRow, theme: &Theme, cols: usize) -> String {
    let name_width = NAME_WIDTH.min(cols.saturating_sub(AUTHOR_WIDTH + STATUS_WIDTH + 2)).max(8);

    let base = if row.is_selected {
        format!("{}{}", Theme::fg(&theme.colors.selection_fg), Theme::bg(&theme.colors.selection_bg))
    } else {
        Theme::fg(&theme.colors.text_primary)
    };

    let name = truncate(&row.name, name_width - 1);
    let name_pad = " ".repeat(name_width.saturating_sub(name.chars().count()));
    // A truncated title may have lost the matched part.
    let highlight = if row.is_selected { None } else { row.highlight.filter(|&(_, end)| end <= name.chars().count()) };

    let author = pad(&truncate(&row.author, AUTHOR_WIDTH - 1), AUTHOR_WIDTH);
    let read = if row.read { "✓" } else { "·" };
    let favorite = if row.favorite { "♥" } else { "♡" };
    let marker = if row.error.is_some() {
        format!("{} !{base}", Theme::fg(&theme.colors.error))
    } else if row.pending {
        " …".to_string()
    } else {
        "  ".to_string()
    };

    let used = 2 + name_width + AUTHOR_WIDTH + STATUS_WIDTH;
    format!(
        "{base}{}{}{name_pad}{}{author}{}{}{base}  {read} {favorite}{marker}{}{}",
        if row.is_selected { "▶ " } else { "  " },
        helpers::highlighted_text(&name, highlight, theme, &base),
        if row.is_selected { String::new() } else { Theme::fg(&theme.colors.text_secondary) },
        if row.is_selected { String::new() } else { Theme::fg(&theme.colors.rating) },
        stars(row.stars),
        " ".repeat(cols.saturating_sub(used)),
        Theme::reset()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> BookRow {
        BookRow {
            id: 1,
            name: name.into(),
            author: "Frank Herbert".into(),
            theme: "SF".into(),
            year: 1965,
            stars: (4, 1),
            read: true,
            favorite: false,
            pending: false,
            error: None,
            is_selected: false,
            highlight: None,
        }
    }

    #[test]
    fn row_shows_title_author_and_status() {
        let line = render_rows(&[row("Dune")], &Theme::default(), 100).remove(0);
        assert!(line.contains("Dune"));
        assert!(line.contains("Frank Herbert"));
        assert!(line.contains("★★★★☆"));
        assert!(line.contains('✓'));
        assert!(line.contains('♡'));
    }

    #[test]
    fn selected_and_failed_rows_are_marked() {
        let mut selected = row("Dune");
        selected.is_selected = true;
        selected.error = Some("Erreur lors de la mise à jour".into());

        let line = render_rows(&[selected], &Theme::default(), 100).remove(0);
        assert!(line.contains("▶ "));
        assert!(line.contains(" !"));
    }

    #[test]
    fn long_titles_are_truncated() {
        let line = render_rows(&[row(&"x".repeat(80))], &Theme::default(), 100).remove(0);
        assert!(line.contains("..."));
        assert!(!line.contains(&"x".repeat(40)));
    }
}
