//! Cursor-based pagination utilities.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Default page size when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Error type for cursor operations.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("Invalid cursor format")]
    InvalidFormat,
    #[error("Invalid cursor encoding")]
    InvalidEncoding,
    #[error("Invalid timestamp in cursor")]
    InvalidTimestamp,
    #[error("Invalid ID in cursor")]
    InvalidId,
}

/// Position after the last row of a page, ordered by `(created_at, id)` descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: i64,
}

impl Cursor {
    pub fn new(created_at: DateTime<Utc>, id: i64) -> Self {
        Self { created_at, id }
    }

    /// Encodes as base64url(`RFC3339_timestamp:id`).
    ///
    /// The id breaks ties between rows sharing a timestamp.
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}:{}",
            self.created_at
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            self.id
        );
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    pub fn decode(cursor: &str) -> Result<Self, CursorError> {
        let decoded = URL_SAFE_NO_PAD
            .decode(cursor)
            .map_err(|_| CursorError::InvalidEncoding)?;
        let s = String::from_utf8(decoded).map_err(|_| CursorError::InvalidFormat)?;

        // The timestamp itself contains colons; the id follows the last one.
        let colon_pos = s.rfind(':').ok_or(CursorError::InvalidFormat)?;
        let id = s[colon_pos + 1..]
            .parse()
            .map_err(|_| CursorError::InvalidId)?;
        let created_at = DateTime::parse_from_rfc3339(&s[..colon_pos])
            .map_err(|_| CursorError::InvalidTimestamp)?
            .with_timezone(&Utc);

        Ok(Self { created_at, id })
    }
}

/// Clamps a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}
