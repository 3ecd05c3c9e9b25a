//! Shared rendering utilities.
//!
//! All width computations count characters, not bytes, so titles with accents
//! line up the same as ASCII ones.

use crate::ui::theme::Theme;

/// Renders `text` with the character range `highlight` in match colors.
///
/// Highlighting is skipped on the selected row, whose selection colors already
/// stand out; `restore` is re-emitted after the highlight so the rest of the line
/// keeps the row's colors.
///
/// # Example
///
/// ```rust
/// use bookshelf::ui::helpers::highlighted_text;
/// use bookshelf::ui::Theme;
///
/// let theme = Theme::default();
/// let plain = highlighted_text("Dune", None, &theme, "");
/// assert_eq!(plain, "Dune");
///
/// let marked = highlighted_text("Dune", Some((0, 2)), &theme, "");
/// assert!(marked.contains("Du"));
/// assert!(marked.ends_with("ne"));
/// ```
#[must_use]
pub fn highlighted_text(text: &str, highlight: Option<(usize, usize)>, theme: &Theme, restore: &str) -> String {
    let Some((start, end)) = highlight else {
        return text.to_string();
    };

    let chars: Vec<char> = text.chars().collect();
    let end = end.min(chars.len());
    let start = start.min(end);

    let mut out = String::with_capacity(text.len() + 48);
    out.extend(&chars[..start]);
    out.push_str(&Theme::fg(&theme.colors.match_highlight_fg));
    out.push_str(&Theme::bg(&theme.colors.match_highlight_bg));
    out.extend(&chars[start..end]);
    out.push_str(Theme::reset());
    out.push_str(restore);
    out.extend(&chars[end..]);
    out
}

/// Shortens `text` to at most `max` characters, ending in `...` when cut.
///
/// ```rust
/// use bookshelf::ui::helpers::truncate;
///
/// assert_eq!(truncate("Les Misérables", 9), "Les Mi...");
/// assert_eq!(truncate("Dune", 9), "Dune");
/// ```
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Pads `text` with spaces to `width` characters. Longer text is returned as is.
#[must_use]
pub fn pad(text: &str, width: usize) -> String {
    let count = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(count)))
}

/// Centers `text` in `width` columns.
#[must_use]
pub fn center(text: &str, width: usize) -> String {
    let count = text.chars().count();
    let left = width.saturating_sub(count) / 2;
    let right = width.saturating_sub(count + left);
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

/// `★★★☆☆` for `(3, 2)`.
#[must_use]
pub fn stars((filled, empty): (u8, u8)) -> String {
    let mut out = "★".repeat(usize::from(filled));
    out.push_str(&"☆".repeat(usize::from(empty)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_uses_character_indices() {
        let theme = Theme::default();
        let out = highlighted_text("Émile", Some((0, 2)), &theme, "");
        let start = out.find("Ém").unwrap();
        assert!(start > 0);
        assert!(out.ends_with("ile"));
    }

    #[test]
    fn highlight_range_is_clamped() {
        let theme = Theme::default();
        let out = highlighted_text("abc", Some((2, 40)), &theme, "");
        assert!(out.starts_with("ab"));
    }

    #[test]
    fn layout_helpers() {
        assert_eq!(pad("é", 3), "é  ");
        assert_eq!(center("ab", 6), "  ab  ");
        assert_eq!(center("abc", 6), " abc  ");
        assert_eq!(truncate("abcdef", 2), "ab");
        assert_eq!(stars((3, 2)), "★★★☆☆");
    }
}
