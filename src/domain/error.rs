//! Error types for the bookshelf client.
//!
//! This module defines the centralized error type [`LibraryError`] and a type alias
//! [`Result`] used throughout the crate. Variants follow the failure taxonomy of the
//! remote library service (network, not-found, validation, server) plus the local
//! concerns of configuration, I/O and theme loading.

use thiserror::Error;

/// The main error type for bookshelf operations.
///
/// Remote failures are classified when the HTTP response is inspected so that the
/// view layer can decide how to present them: reload failures become a dismissible
/// banner, single-record failures stay local to the view that initiated them.
///
/// # Examples
///
/// ```
/// use bookshelf::LibraryError;
///
/// fn parse_year(input: &str) -> Result<i32, LibraryError> {
///     input
///         .parse()
///         .map_err(|_| LibraryError::Validation(format!("year must be a number: {input}")))
/// }
///
/// assert!(parse_year("19x4").is_err());
/// ```
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The request could not complete (connection refused, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The referenced resource does not exist on the server.
    #[error("{resource} {id} not found")]
    NotFound {
        /// Kind of resource that was looked up (`book`, `note`).
        resource: &'static str,
        /// Identifier that was requested.
        id: i64,
        /// Message to surface to the user.
        message: String,
    },

    /// Malformed user input, rejected before any request is sent.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The server answered with a non-success status.
    ///
    /// `message` carries the `error` string from the response body when the
    /// server provided one.
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code of the response.
        status: u16,
        /// Message to surface to the user.
        message: String,
    },

    /// Configuration is invalid, or a caller passed an unknown query value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Theme parsing failed.
    #[error("Theme error: {0}")]
    Theme(String),
}

impl LibraryError {
    /// Returns the message that should be shown to the user.
    ///
    /// Server errors surface the server's own message without the status prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } | Self::NotFound { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// `NotFound` for a book, with the default user-facing message.
    #[must_use]
    pub fn book_not_found(id: i64) -> Self {
        Self::NotFound { resource: "book", id, message: BOOK_NOT_FOUND.to_string() }
    }
}

/// Shown when a book is gone and the server did not say more.
pub const BOOK_NOT_FOUND: &str = "Livre introuvable";

/// A specialized `Result` type for bookshelf operations.
pub type Result<T> = std::result::Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_surface_the_server_message() {
        let err = LibraryError::Server {
            status: 500,
            message: "Erreur lors de la mise à jour".to_string(),
        };
        assert_eq!(err.user_message(), "Erreur lors de la mise à jour");
        assert_eq!(err.to_string(), "Server error (500): Erreur lors de la mise à jour");
    }

    #[test]
    fn not_found_surfaces_its_message() {
        let err = LibraryError::NotFound { resource: "book", id: 7, message: "Ce livre a été supprimé".to_string() };
        assert_eq!(err.user_message(), "Ce livre a été supprimé");
        assert_eq!(err.to_string(), "book 7 not found");

        assert_eq!(LibraryError::book_not_found(7).user_message(), "Livre introuvable");
    }
}
