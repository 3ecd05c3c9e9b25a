//! Platform directories for configuration and log files.
//!
//! Locations come from [`directories::ProjectDirs`], so they follow each platform's
//! conventions (XDG on Linux, `~/Library/Application Support` on macOS, `%APPDATA%`
//! on Windows). When no home directory can be determined the temp directory is
//! used instead.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "bookshelf", "bookshelf")
}

/// Directory for log and trace files.
///
/// # Examples
///
/// ```
/// use bookshelf::infrastructure::get_data_dir;
///
/// let dir = get_data_dir();
/// assert!(dir.ends_with("bookshelf") || dir.components().count() > 1);
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || std::env::temp_dir().join("bookshelf"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// Default location of `config.toml`, if the platform has a config directory.
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
