//! Bookshelf: the list view-model and REST client of a personal book library.
//!
//! Bookshelf provides:
//! - A library list with search, read/unread/favorite filters and sorting
//! - Optimistic status edits (read, favorite, rating) shared between the list
//!   and a detail screen, reconciled with the server's answer
//! - Reload ordering that never lets an older response overwrite a newer one
//! - A store client for the library REST API, plus an in-memory store
//! - OpenTelemetry tracing to local files
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Terminal host (main.rs)                            │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling                                   │
//! │  - Collection sync and optimistic edits             │
//! │  - View model computation                           │
//! └─────────────────────────────────────────────────────┘
//!         │                                       │
//! ┌───────────────────────┐           ┌───────────────────────┐
//! │ UI Layer (ui/)        │           │ Store Layer (store/)  │
//! │ - Rendering           │           │ - REST client         │
//! │ - Theming             │           │ - Request protocol    │
//! │ - Components          │           │ - Worker              │
//! └───────────────────────┘           └───────────────────────┘
//!         │                                       │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Platform paths (infrastructure/)                 │
//! │  - Error types (domain/error)                       │
//! │  - Book and note models (domain/)                   │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - OpenTelemetry tracing                            │
//! │  - File-based OTLP export                           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! Read from `config.toml` in the platform config directory, then overridden
//! by `BOOKSHELF_*` environment variables:
//!
//! ```toml
//! api_url = "http://localhost:3000"
//! theme = "dark"
//! trace_level = "debug"
//! request_timeout_secs = 10
//! page_size = 20
//! ```
//!
//! # Example
//!
//! ```rust
//! use bookshelf::{handle_event, initialize, Action, Config, Event};
//!
//! let mut state = initialize(&Config::default());
//!
//! let (_render, actions) = handle_event(&mut state, &Event::ViewEntered)?;
//! for action in actions {
//!     if let Action::Dispatch(request) = action {
//!         // Hand the request to a `StoreWorker` and feed the response back
//!         // as `Event::StoreResponse`.
//!         assert_eq!(request.operation(), "list_books");
//!     }
//! }
//! # Ok::<(), bookshelf::LibraryError>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod store;

pub mod ui;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event, InputMode, Screen, SearchFocus};
pub use domain::{Book, LibraryError, Result};
pub use ui::Theme;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Runtime configuration.
///
/// # Example
///
/// ```toml
/// api_url = "http://localhost:3000"
/// theme = "dark"
/// theme_file = "/path/to/theme.toml"
/// trace_level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the library API, or `"memory:"` for the in-memory store.
    ///
    /// Default: `"http://localhost:3000"`
    pub api_url: String,

    /// Built-in theme name: `light` or `dark`. Ignored if `theme_file` is set.
    #[serde(alias = "theme")]
    pub theme_name: Option<String>,

    /// Path to a custom TOML theme file.
    ///
    /// Takes precedence over `theme_name`. See [`ui::theme`] for format.
    pub theme_file: Option<String>,

    /// Tracing level, as an `EnvFilter` directive.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Default: `"info"`
    pub trace_level: Option<String>,

    /// Per-request timeout. Default: 10
    pub request_timeout_secs: u64,

    /// Number of list rows the host shows at once. Default: 20
    pub page_size: usize,
}

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_SIZE: usize = 20;

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            theme_name: None,
            theme_file: None,
            trace_level: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Parses configuration from a flat key/value map.
    ///
    /// # Parsing Rules
    ///
    /// - `api_url`: blank values keep the default
    /// - `request_timeout_secs`, `page_size`: fall back to the default on parse error
    /// - `theme`, `theme_file`, `trace_level`: taken as is
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use bookshelf::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("api_url".to_string(), "http://books.local:8080".to_string());
    /// map.insert("page_size".to_string(), "many".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.api_url, "http://books.local:8080");
    /// assert_eq!(config.page_size, 20);
    /// ```
    #[must_use]
    pub fn from_map(config: &BTreeMap<String, String>) -> Self {
        let api_url = config
            .get("api_url")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map_or_else(|| DEFAULT_API_URL.to_string(), String::from);

        let request_timeout_secs = config
            .get("request_timeout_secs")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let page_size = config
            .get("page_size")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self {
            api_url,
            theme_name: config.get("theme").cloned(),
            theme_file: config.get("theme_file").cloned(),
            trace_level: config.get("trace_level").cloned(),
            request_timeout_secs,
            page_size,
        }
    }

    /// Reads a TOML configuration file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Io`] if the file cannot be read and
    /// [`LibraryError::Config`] if it is not valid TOML for this struct.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| LibraryError::Config(format!("invalid config file {}: {e}", path.display())))
    }

    /// Loads the file at [`Config::default_path`] if there is one, else the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Default location of the configuration file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        infrastructure::default_config_file()
    }

    /// Overrides fields from `BOOKSHELF_API_URL`, `BOOKSHELF_THEME` and
    /// `BOOKSHELF_TRACE_LEVEL`.
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(api_url) = set("BOOKSHELF_API_URL") {
            self.api_url = api_url;
        }
        if let Some(theme) = set("BOOKSHELF_THEME") {
            self.theme_name = Some(theme);
        }
        if let Some(level) = set("BOOKSHELF_TRACE_LEVEL") {
            self.trace_level = Some(level);
        }
        self
    }
}

/// Creates the application state for `config`.
///
/// The theme comes from `theme_file` if set, else from `theme_name`, else the
/// default palette. A theme that fails to load falls back to the default.
///
/// # Example
///
/// ```rust
/// use bookshelf::{initialize, Config};
///
/// let config = Config {
///     theme_name: Some("dark".to_string()),
///     ..Default::default()
/// };
///
/// let state = initialize(&config);
/// assert_eq!(state.theme.name, "dark");
/// ```
#[must_use]
pub fn initialize(config: &Config) -> AppState {
    tracing::debug!(api_url = %config.api_url, "initializing bookshelf");

    let theme = config.theme_file.as_ref().map_or_else(
        || {
            config.theme_name.as_ref().map_or_else(Theme::default, |theme_name| {
                Theme::from_name(theme_name).unwrap_or_else(|| {
                    tracing::debug!(theme_name = %theme_name, "unknown theme, using default");
                    Theme::default()
                })
            })
        },
        |theme_file| {
            Theme::from_file(theme_file).unwrap_or_else(|e| {
                tracing::debug!(theme_file = %theme_file, error = %e, "failed to load theme from file, using default");
                Theme::default()
            })
        },
    );

    AppState::new(theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn toml_accepts_theme_alias_and_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = \"memory:\"\ntheme = \"dark\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api_url, "memory:");
        assert_eq!(config.theme_name.as_deref(), Some("dark"));
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = \"twenty\"").unwrap();

        assert!(matches!(Config::load(file.path()), Err(LibraryError::Config(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Config::load(dir.path().join("nope.toml")), Err(LibraryError::Io(_))));
    }

    #[test]
    fn environment_overrides_non_blank_values() {
        let vars = BTreeMap::from([
            ("BOOKSHELF_API_URL", "http://remote:9000"),
            ("BOOKSHELF_THEME", "  "),
            ("BOOKSHELF_TRACE_LEVEL", "trace"),
        ]);
        let config = Config::default().apply_vars(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.api_url, "http://remote:9000");
        assert_eq!(config.theme_name, None);
        assert_eq!(config.trace_level.as_deref(), Some("trace"));
    }

    #[test]
    fn from_map_ignores_blank_url() {
        let map = BTreeMap::from([("api_url".to_string(), " ".to_string()), ("theme".to_string(), "dark".to_string())]);
        let config = Config::from_map(&map);
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.theme_name.as_deref(), Some("dark"));
    }

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let config = Config { theme_name: Some("neon".to_string()), ..Config::default() };
        assert_eq!(initialize(&config).theme, Theme::default());
    }

    #[test]
    fn theme_file_takes_precedence() {
        let config = Config {
            theme_name: Some("dark".to_string()),
            theme_file: Some("/definitely/not/here.toml".to_string()),
            ..Config::default()
        };
        assert_eq!(initialize(&config).theme.name, "light");
    }
}
