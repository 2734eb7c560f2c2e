//! Cursor-based pagination utilities.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

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

/// Encodes a cursor from a creation timestamp and row ID.
///
/// The cursor format is: base64(RFC3339_timestamp:uuid). The ID component
/// breaks ties between rows created in the same microsecond, so keyset
/// pagination stays stable.
pub fn encode_cursor(created_at: DateTime<Utc>, id: Uuid) -> String {
    let raw = format!(
        "{}:{}",
        created_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        id
    );
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

/// Decodes a cursor into its timestamp and ID.
pub fn decode_cursor(cursor: &str) -> Result<(DateTime<Utc>, Uuid), CursorError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| CursorError::InvalidEncoding)?;

    let s = String::from_utf8(decoded).map_err(|_| CursorError::InvalidFormat)?;

    // Split on the last colon; the timestamp itself contains colons.
    let colon_pos = s.rfind(':').ok_or(CursorError::InvalidFormat)?;
    let timestamp_str = &s[..colon_pos];
    let id_str = &s[colon_pos + 1..];

    let id: Uuid = id_str.parse().map_err(|_| CursorError::InvalidId)?;

    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .map_err(|_| CursorError::InvalidTimestamp)?
        .with_timezone(&Utc);

    Ok((timestamp, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_encode_decode_cursor_roundtrip() {
        let timestamp = Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap();
        let id = Uuid::new_v4();

        let cursor = encode_cursor(timestamp, id);
        let (decoded_ts, decoded_id) = decode_cursor(&cursor).unwrap();

        assert_eq!(decoded_ts, timestamp);
        assert_eq!(decoded_id, id);
    }

    #[test]
    fn test_microsecond_precision_is_preserved() {
        let timestamp = Utc
            .with_ymd_and_hms(2026, 6, 15, 14, 30, 45)
            .unwrap()
            .with_nanosecond(123_456_000)
            .unwrap();
        let id = Uuid::new_v4();

        let cursor = encode_cursor(timestamp, id);
        let (decoded_ts, decoded_id) = decode_cursor(&cursor).unwrap();

        assert_eq!(decoded_ts.timestamp_micros(), timestamp.timestamp_micros());
        assert_eq!(decoded_id, id);
    }

    #[test]
    fn test_decode_invalid_base64() {
        let result = decode_cursor("not-valid-base64!!!");
        assert!(matches!(result, Err(CursorError::InvalidEncoding)));
    }

    #[test]
    fn test_decode_missing_colon() {
        let invalid = URL_SAFE_NO_PAD.encode(b"no-colon-here");
        let result = decode_cursor(&invalid);
        assert!(matches!(result, Err(CursorError::InvalidFormat)));
    }

    #[test]
    fn test_decode_invalid_id() {
        let invalid = URL_SAFE_NO_PAD.encode(b"2026-01-15T10:30:00Z:not-a-uuid");
        let result = decode_cursor(&invalid);
        assert!(matches!(result, Err(CursorError::InvalidId)));
    }

    #[test]
    fn test_decode_invalid_timestamp() {
        let id = Uuid::new_v4();
        let invalid = URL_SAFE_NO_PAD.encode(format!("not-a-timestamp:{}", id).as_bytes());
        let result = decode_cursor(&invalid);
        assert!(matches!(result, Err(CursorError::InvalidTimestamp)));
    }

    #[test]
    fn test_cursor_is_url_safe() {
        let cursor = encode_cursor(Utc::now(), Uuid::new_v4());

        assert!(!cursor.contains('+'));
        assert!(!cursor.contains('/'));
        assert!(!cursor.contains('='));
    }
}
