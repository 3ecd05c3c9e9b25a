//! Color palettes and ANSI escape sequence generation.
//!
//! The theme is plain data passed into [`AppState`](crate::app::AppState) at
//! construction; nothing reads it from ambient state. Two palettes are built in
//! (`light`, the default, and `dark`) and custom palettes load from TOML files.
//!
//! # TOML Format
//!
//! ```toml
//! name = "sepia"
//!
//! [colors]
//! primary = "#5b4636"
//! secondary = "#1abc9c"
//! error = "#e74c3c"
//! background = "#f4ecd8"
//! surface = "#fbf6ea"
//! surface_alt = "#efe6d2"
//! border = "#c8b99c"
//! text_primary = "#5b4636"
//! text_secondary = "#8c7a66"
//! text_light = "#ffffff"
//! selection_fg = "#ffffff"
//! selection_bg = "#5b4636"
//! match_highlight_fg = "#5b4636"
//! match_highlight_bg = "#f1c40f"
//! rating = "#f1c40f"
//! ```
//!
//! # Example
//!
//! ```rust
//! use bookshelf::ui::Theme;
//!
//! let theme = Theme::from_name("dark").unwrap();
//! let title = format!("{}{}Bibliothèque{}", Theme::bold(), Theme::fg(&theme.colors.primary), Theme::reset());
//! assert!(title.ends_with("\u{1b}[0m"));
//! ```

use crate::domain::error::{LibraryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A named palette.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

/// Hex colors (`"#rrggbb"`) for every rendered element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeColors {
    /// Titles and primary text accents.
    pub primary: String,
    /// Status toggles that are on (read, favorite).
    pub secondary: String,
    /// Error banners and failed-edit markers.
    pub error: String,
    pub background: String,
    /// Row background.
    pub surface: String,
    /// Alternate row and detail panel background.
    pub surface_alt: String,
    pub border: String,
    pub text_primary: String,
    /// Authors, dates, footer hints.
    pub text_secondary: String,
    /// Text drawn on `primary` or `error` backgrounds.
    pub text_light: String,
    pub selection_fg: String,
    pub selection_bg: String,
    /// Search match inside a title.
    pub match_highlight_fg: String,
    pub match_highlight_bg: String,
    /// Filled rating stars.
    pub rating: String,
}

impl Theme {
    /// Names accepted by [`Theme::from_name`].
    pub const BUILT_IN: [&'static str; 2] = ["light", "dark"];

    /// The default palette.
    #[must_use]
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            colors: ThemeColors {
                primary: "#2C3E50".into(),
                secondary: "#1ABC9C".into(),
                error: "#E74C3C".into(),
                background: "#ECF0F1".into(),
                surface: "#FFFFFF".into(),
                surface_alt: "#F8F9FA".into(),
                border: "#BDC3C7".into(),
                text_primary: "#2C3E50".into(),
                text_secondary: "#7F8C8D".into(),
                text_light: "#FFFFFF".into(),
                selection_fg: "#FFFFFF".into(),
                selection_bg: "#34495E".into(),
                match_highlight_fg: "#2C3E50".into(),
                match_highlight_bg: "#F1C40F".into(),
                rating: "#F1C40F".into(),
            },
        }
    }

    #[must_use]
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            colors: ThemeColors {
                primary: "#ECF0F1".into(),
                secondary: "#1ABC9C".into(),
                error: "#E74C3C".into(),
                background: "#1A2530".into(),
                surface: "#2C3E50".into(),
                surface_alt: "#34495E".into(),
                border: "#34495E".into(),
                text_primary: "#ECF0F1".into(),
                text_secondary: "#95A5A6".into(),
                text_light: "#FFFFFF".into(),
                selection_fg: "#1A2530".into(),
                selection_bg: "#1ABC9C".into(),
                match_highlight_fg: "#1A2530".into(),
                match_highlight_bg: "#F1C40F".into(),
                rating: "#F1C40F".into(),
            },
        }
    }

    /// Looks up a built-in palette. Returns `None` for unknown names.
    ///
    /// ```rust
    /// use bookshelf::ui::Theme;
    ///
    /// assert_eq!(Theme::from_name("dark").unwrap().name, "dark");
    /// assert!(Theme::from_name("catppuccin").is_none());
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::light()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }

    /// Loads a palette from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Io`] if the file cannot be read and
    /// [`LibraryError::Theme`] if it does not parse.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| LibraryError::Theme(format!("invalid theme file: {e}")))
    }

    /// Parses `#rrggbb`. Malformed input renders as white.
    fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return (255, 255, 255);
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(255);
        (channel(0..2), channel(2..4), channel(4..6))
    }

    /// 24-bit foreground escape for `hex`.
    #[must_use]
    pub fn fg(hex: &str) -> String {
        let (r, g, b) = Self::hex_to_rgb(hex);
        format!("\u{001b}[38;2;{r};{g};{b}m")
    }

    /// 24-bit background escape for `hex`.
    #[must_use]
    pub fn bg(hex: &str) -> String {
        let (r, g, b) = Self::hex_to_rgb(hex);
        format!("\u{001b}[48;2;{r};{g};{b}m")
    }

    #[must_use]
    pub const fn bold() -> &'static str {
        "\u{001b}[1m"
    }

    #[must_use]
    pub const fn dim() -> &'static str {
        "\u{001b}[2m"
    }

    #[must_use]
    pub const fn reset() -> &'static str {
        "\u{001b}[0m"
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn built_in_names_resolve() {
        for name in Theme::BUILT_IN {
            assert_eq!(Theme::from_name(name).unwrap().name, name);
        }
        assert_eq!(Theme::from_name(" Dark ").unwrap(), Theme::dark());
        assert!(Theme::from_name("solarized").is_none());
    }

    #[test]
    fn default_is_light() {
        assert_eq!(Theme::default(), Theme::light());
    }

    #[test]
    fn escapes_from_hex() {
        assert_eq!(Theme::fg("#2C3E50"), "\u{1b}[38;2;44;62;80m");
        assert_eq!(Theme::bg("1abc9c"), "\u{1b}[48;2;26;188;156m");
        assert_eq!(Theme::fg("#abc"), "\u{1b}[38;2;255;255;255m");
        assert_eq!(Theme::fg("#zzzzzz"), "\u{1b}[38;2;255;255;255m");
    }

    #[test]
    fn loads_theme_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let dark = toml::to_string(&Theme { name: "night".into(), ..Theme::dark() }).unwrap();
        file.write_all(dark.as_bytes()).unwrap();

        let theme = Theme::from_file(file.path()).unwrap();
        assert_eq!(theme.name, "night");
        assert_eq!(theme.colors, Theme::dark().colors);
    }

    #[test]
    fn rejects_incomplete_theme_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"name = \"half\"\n[colors]\nprimary = \"#000000\"\n").unwrap();

        assert!(matches!(Theme::from_file(file.path()), Err(LibraryError::Theme(_))));
        assert!(matches!(Theme::from_file("/nonexistent/theme.toml"), Err(LibraryError::Io(_))));
    }
}
