//! Title bar.

use crate::ui::helpers::{center, truncate};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::HeaderInfo;

/// Bold, centered title across the full width.
#[must_use]
pub fn render_header(header: &HeaderInfo, theme: &Theme, cols: usize) -> String {
    format!(
        "{}{}{}{}{}",
        Theme::bold(),
        Theme::fg(&theme.colors.text_light),
        Theme::bg(&theme.colors.primary),
        center(&truncate(&header.title, cols), cols),
        Theme::reset()
    )
}
