//! Reading notes attached to a book.
//!
//! Notes are append-only: the client can list them and create new ones, never edit
//! or delete. The server stamps each note with its creation time.

use crate::domain::book::BookId;
use crate::domain::error::{LibraryError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A note as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    #[serde(rename = "bookId")]
    pub book_id: BookId,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "dateISO", default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl Note {
    /// Creation date formatted as `dd/mm/yyyy`, or an empty string when the server
    /// did not send one.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookshelf::domain::Note;
    ///
    /// let note: Note = serde_json::from_str(
    ///     r#"{"id": 1, "bookId": 4, "content": "Great opening", "dateISO": "2024-03-09T10:00:00Z"}"#,
    /// ).unwrap();
    /// assert_eq!(note.display_date(), "09/03/2024");
    /// ```
    #[must_use]
    pub fn display_date(&self) -> String {
        self.date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default()
    }
}

/// Reads `dateISO` in any of the shapes the service has been seen to send. A value
/// that is none of them decodes as `None` rather than failing the whole note.
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(text)) => parse_date(&text),
        Some(serde_json::Value::Number(millis)) => millis.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

/// RFC 3339, then a naive date-time taken as UTC, then a bare `%Y-%m-%d` at midnight.
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

/// Content of a note about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    content: String,
}

impl NewNote {
    /// Validates note content. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Validation`] if nothing is left after trimming.
    pub fn new(content: &str) -> Result<Self> {
        let content = content.trim();
        if content.is_empty() {
            return Err(LibraryError::Validation("note content cannot be empty".to_string()));
        }
        Ok(Self { content: content.to_string() })
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_content_is_rejected() {
        assert!(matches!(NewNote::new("   \n"), Err(LibraryError::Validation(_))));
    }

    #[test]
    fn content_is_trimmed() {
        let note = NewNote::new("  chapter 3 is slow ").unwrap();
        assert_eq!(note.content(), "chapter 3 is slow");
        assert_eq!(
            serde_json::to_value(&note).unwrap(),
            serde_json::json!({ "content": "chapter 3 is slow" })
        );
    }

    #[test]
    fn missing_date_renders_empty() {
        let note: Note = serde_json::from_str(r#"{"id": 2, "bookId": 1, "content": "x"}"#).unwrap();
        assert_eq!(note.date, None);
        assert_eq!(note.display_date(), "");
    }

    fn dated(date: serde_json::Value) -> Note {
        serde_json::from_value(serde_json::json!({ "id": 3, "bookId": 1, "content": "x", "dateISO": date })).unwrap()
    }

    #[test]
    fn dates_decode_with_or_without_offset() {
        assert_eq!(dated("2024-03-09T23:30:00+02:00".into()).display_date(), "09/03/2024");
        assert_eq!(dated("2024-03-09T10:00:00.000".into()).display_date(), "09/03/2024");
        assert_eq!(dated("2024-03-09 10:00:00".into()).display_date(), "09/03/2024");
        assert_eq!(dated("2024-03-09".into()).display_date(), "09/03/2024");
        assert_eq!(dated(1_709_978_400_000_i64.into()).display_date(), "09/03/2024");
    }

    #[test]
    fn unreadable_date_keeps_the_note() {
        let note = dated("next tuesday".into());
        assert_eq!(note.date, None);
        assert_eq!(note.content, "x");
        assert_eq!(dated(serde_json::Value::Null).date, None);
    }

    #[test]
    fn one_odd_date_does_not_sink_the_list() {
        let notes: Vec<Note> = serde_json::from_str(
            r#"[{"id": 1, "bookId": 1, "content": "a", "dateISO": "2024-03-09"},
                {"id": 2, "bookId": 1, "content": "b", "dateISO": "??"}]"#,
        )
        .unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].date, None);
    }
}
