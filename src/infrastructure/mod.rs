//! Infrastructure layer for filesystem and environment interactions.
//!
//! Resolves where the client keeps its configuration and writes its logs.

pub mod paths;

pub use paths::{default_config_file, get_data_dir, CONFIG_FILE_NAME};
