//! # UTC-Only Timestamps
//!
//! Defines [`Timestamp`], a UTC-only timestamp truncated to whole seconds.
//!
//! ## Invariant
//!
//! Credential fields (`issuanceDate`, `proof.created`) and credential ids
//! embed timestamps. All of them must render identically for the same
//! instant, with no sub-second noise and no timezone offsets: a local
//! offset or microsecond tail would make equal instants serialize to
//! different bytes. Non-UTC inputs are rejected at construction rather than
//! silently converted on the strict path.
//!
//! Serde is implemented by hand over [`Timestamp::to_iso8601`] and
//! [`Timestamp::parse`] so that JSON output is exactly
//! `YYYY-MM-DDTHH:MM:SSZ`, independent of chrono's own formatting choices.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimestampError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating.
/// - [`Timestamp::parse()`]: from an ISO 8601 string, rejecting non-`Z`
///   offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse from an RFC 3339 string.
    ///
    /// **Rejects non-UTC inputs.** Only the `Z` suffix is accepted;
    /// explicit offsets are rejected even when semantically equivalent
    /// (`+00:00`), so one instant has exactly one accepted spelling.
    ///
    /// # Errors
    ///
    /// [`TimestampError::NonUtc`] for non-`Z` inputs,
    /// [`TimestampError::Invalid`] when parsing fails.
    pub fn parse(s: &str) -> Result<Self, TimestampError> {
        if !s.ends_with('Z') {
            return Err(TimestampError::NonUtc(s.to_string()));
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| TimestampError::Invalid {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// From a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, TimestampError> {
        let dt = DateTime::from_timestamp(secs, 0).ok_or_else(|| TimestampError::Invalid {
            input: secs.to_string(),
            reason: "out of range for a Unix timestamp".to_string(),
        })?;
        Ok(Self(dt))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as ISO 8601 with `Z` suffix, e.g. `2024-05-01T12:00:00Z`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Truncate to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
        let with_nanos = dt.with_nanosecond(123_456_789).unwrap();
        let ts = Timestamp::from_utc(with_nanos);
        assert_eq!(ts.as_datetime().nanosecond(), 0);
        assert_eq!(ts.to_iso8601(), "2024-05-01T12:30:45Z");
    }

    #[test]
    fn test_to_iso8601_format() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(Timestamp::from_utc(dt).to_iso8601(), "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_display_matches_iso8601() {
        let ts = Timestamp::now();
        assert_eq!(format!("{ts}"), ts.to_iso8601());
    }

    #[test]
    fn test_parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2024-05-01T12:00:00Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_parse_plus_zero_rejected() {
        assert!(Timestamp::parse("2024-05-01T12:00:00+00:00").is_err());
    }

    #[test]
    fn test_parse_offsets_rejected() {
        assert!(Timestamp::parse("2024-05-01T17:00:00+05:00").is_err());
        assert!(Timestamp::parse("2024-05-01T08:00:00-04:00").is_err());
    }

    #[test]
    fn test_parse_subseconds_truncated() {
        let ts = Timestamp::parse("2024-05-01T12:00:00.123456Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("2024-05-01").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_epoch_roundtrip() {
        let ts = Timestamp::parse("2024-05-01T12:00:00Z").unwrap();
        let ts2 = Timestamp::from_epoch_secs(ts.epoch_secs()).unwrap();
        assert_eq!(ts, ts2);
    }

    #[test]
    fn test_ordering() {
        let earlier = Timestamp::parse("2024-05-01T12:00:00Z").unwrap();
        let later = Timestamp::parse("2024-05-01T12:00:01Z").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_serde_emits_exact_string() {
        let ts = Timestamp::parse("2024-05-01T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, r#""2024-05-01T12:00:00Z""#);
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn test_serde_rejects_offset_input() {
        let result: Result<Timestamp, _> =
            serde_json::from_str(r#""2024-05-01T12:00:00+00:00""#);
        assert!(result.is_err());
    }
}
