//! Placeholders shown instead of book rows, and the error banner.

use crate::ui::helpers::{center, truncate};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::EmptyState;

/// Message and subtitle, centered.
#[must_use]
pub fn render_empty_state(empty: &EmptyState, theme: &Theme, cols: usize) -> [String; 2] {
    [
        format!("{}{}{}", Theme::fg(&theme.colors.primary), center(&empty.message, cols), Theme::reset()),
        format!(
            "{}{}{}{}",
            Theme::dim(),
            Theme::fg(&theme.colors.text_secondary),
            center(&empty.subtitle, cols),
            Theme::reset()
        ),
    ]
}

/// `Chargement...`, centered.
#[must_use]
pub fn render_loading(theme: &Theme, cols: usize) -> String {
    format!("{}{}{}", Theme::fg(&theme.colors.text_secondary), center("Chargement...", cols), Theme::reset())
}

/// Full-width error line with a dismiss hint.
#[must_use]
pub fn render_banner(message: &str, theme: &Theme, cols: usize) -> String {
    const HINT: &str = "  (x: fermer)";
    let text = truncate(message, cols.saturating_sub(HINT.len() + 1));
    format!(
        "{}{} {text}{HINT}{}{}",
        Theme::fg(&theme.colors.text_light),
        Theme::bg(&theme.colors.error),
        " ".repeat(cols.saturating_sub(text.chars().count() + HINT.len() + 1)),
        Theme::reset()
    )
}
