//! # Persistence layer
//!
//! Row-level access to the `documents` and `conversations` tables. All
//! functions take a `&turso::Database`, open their own connection, and map
//! rows into typed structs via `TryFrom<&Row>`.

pub mod conversations;
pub mod documents;

use crate::errors::StorageError;
use chrono::{DateTime, Utc};

pub use conversations::{Conversation, NewConversation, VoiceFileMeta};
pub use documents::{DocumentStatus, DocumentSummary, NewDocument, UploadedDocument};

/// Timestamps are stored as SQLite `CURRENT_TIMESTAMP` text.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a stored timestamp string into a UTC datetime.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    chrono::NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
        .map_err(|e| StorageError::DataIntegrity(format!("Failed to parse date '{raw}': {e}")))
}

/// Formats a datetime the way the tables store it.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
