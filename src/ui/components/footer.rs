//! Keybinding hints.

use crate::ui::helpers::{center, truncate};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::FooterInfo;

/// Dimmed, centered hints. Cut to the width on narrow screens.
#[must_use]
pub fn render_footer(footer: &FooterInfo, theme: &Theme, cols: usize) -> String {
    format!(
        "{}{}{}{}",
        Theme::dim(),
        Theme::fg(&theme.colors.text_secondary),
        center(&truncate(&footer.keybindings, cols), cols),
        Theme::reset()
    )
}
