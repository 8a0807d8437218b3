//! Column encodings: f32 LE blobs, RFC 3339 timestamps, enum strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};

use sift_core::errors::{SiftError, SiftResult, StorageError};

pub fn vector_to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

pub fn blob_to_vector(bytes: &[u8], table: &str) -> SiftResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(corrupt(table, format!("vector blob of {} bytes", bytes.len())));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Fixed-width timestamps so lexical order equals time order. Full nanosecond
/// precision, so a value read back equals the value written.
pub fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_ts(s: &str, table: &str) -> SiftResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(table, format!("timestamp {s:?}: {e}")))
}

pub fn parse_opt_ts(s: Option<String>, table: &str) -> SiftResult<Option<DateTime<Utc>>> {
    s.map(|s| parse_ts(&s, table)).transpose()
}

pub fn parse_enum<T: FromStr<Err = String>>(s: &str, table: &str) -> SiftResult<T> {
    s.parse().map_err(|e: String| corrupt(table, e))
}

pub fn parse_json_list(s: &str, table: &str) -> SiftResult<Vec<String>> {
    serde_json::from_str(s).map_err(|e| corrupt(table, format!("json list: {e}")))
}

pub fn corrupt(table: &str, details: String) -> SiftError {
    SiftError::StorageError(StorageError::CorruptRow {
        table: table.to_string(),
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn vector_blob_is_little_endian() {
        let blob = vector_to_blob(&[1.0, -2.5]);
        assert_eq!(blob.len(), 8);
        assert_eq!(&blob[..4], &1.0f32.to_le_bytes());
        assert_eq!(blob_to_vector(&blob, "t").unwrap(), vec![1.0, -2.5]);
    }

    #[test]
    fn truncated_blob_is_corrupt() {
        assert!(blob_to_vector(&[0, 0, 0], "embeddings").is_err());
    }

    #[test]
    fn timestamps_sort_lexically() {
        let early = Utc::now();
        let late = early + chrono::Duration::milliseconds(1500);
        assert!(fmt_ts(&early) < fmt_ts(&late));
        let parsed = parse_ts(&fmt_ts(&early), "t").unwrap();
        assert_eq!(fmt_ts(&parsed), fmt_ts(&early));
    }

    #[test]
    fn timestamps_keep_sub_microsecond_precision() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(573_973_338);
        let text = fmt_ts(&ts);
        assert_eq!(text, "2026-03-01T12:00:00.573973338Z");
        assert_eq!(parse_ts(&text, "t").unwrap(), ts);

        let whole = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 1).unwrap();
        assert_eq!(fmt_ts(&whole).len(), text.len());
        assert!(text < fmt_ts(&whole));
    }
}
