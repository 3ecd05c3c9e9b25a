//! Search field and filter/sort line.

use crate::ui::helpers::{pad, truncate};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::QueryBarInfo;

/// Two lines: the search field, then the filter chips and the sort label.
///
/// ```text
///  🔍 dune_
///  [Tous]  Lus  Non lus  Favoris          Trier : Titre
/// ```
#[must_use]
pub fn render_query_bar(bar: &QueryBarInfo, theme: &Theme, cols: usize) -> [String; 2] {
    let search = if bar.search_text.is_empty() && !bar.editing {
        format!("{}{}", Theme::fg(&theme.colors.text_secondary), bar.placeholder)
    } else {
        let cursor = if bar.editing { "_" } else { "" };
        format!("{}{}{cursor}", Theme::fg(&theme.colors.text_primary), bar.search_text)
    };
    let border = if bar.editing { &theme.colors.secondary } else { &theme.colors.border };
    let search_line = format!(
        "{}🔍 {}{search}{}",
        Theme::fg(border),
        Theme::reset(),
        Theme::reset()
    );

    let mut chips = String::new();
    let mut chips_len = 0;
    for (label, active) in &bar.filters {
        let chip = if *active { format!("[{label}]") } else { format!(" {label} ") };
        chips_len += chip.chars().count() + 1;
        if *active {
            chips.push_str(Theme::bold());
            chips.push_str(&Theme::fg(&theme.colors.secondary));
        } else {
            chips.push_str(&Theme::fg(&theme.colors.text_secondary));
        }
        chips.push_str(&chip);
        chips.push_str(Theme::reset());
        chips.push(' ');
    }

    let sort = truncate(&bar.sort_label, cols.saturating_sub(chips_len));
    let gap = pad("", cols.saturating_sub(chips_len + sort.chars().count()));
    let filter_line = format!("{chips}{gap}{}{sort}{}", Theme::fg(&theme.colors.text_primary), Theme::reset());

    [search_line, filter_line]
}
