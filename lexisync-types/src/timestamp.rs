//! Timestamps used to arbitrate conflicting writes.
//!
//! Records carry their timestamps as the ISO-8601 strings clients sent; the
//! strings are stored verbatim and only parsed when two writes have to be
//! ordered. Parsing is lenient: anything unreadable becomes
//! [`SyncTimestamp::EARLIEST`], so a malformed timestamp always loses and
//! never surfaces as an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Formats accepted for timestamps without a UTC offset. They are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// A point in time, ordered on the UTC timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyncTimestamp(DateTime<Utc>);

impl SyncTimestamp {
    /// The earliest representable instant. Unparseable timestamps map here.
    pub const EARLIEST: Self = Self(DateTime::<Utc>::MIN_UTC);

    /// The current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Wraps an existing UTC datetime.
    #[must_use]
    pub const fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Strictly parses an ISO-8601 / RFC 3339 timestamp.
    ///
    /// Offsets are normalized to UTC. Timestamps without an offset, and bare
    /// dates, are taken to be UTC.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidTimestamp(String::new()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Self(naive.and_utc()));
            }
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self(naive.and_utc()))
            .ok_or_else(|| Error::InvalidTimestamp(s.to_string()))
    }

    /// Parses a timestamp, falling back to [`Self::EARLIEST`] on failure.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::EARLIEST)
    }

    /// Returns true if this is the earliest instant (including coerced values).
    #[must_use]
    pub fn is_earliest(&self) -> bool {
        *self == Self::EARLIEST
    }

    /// Renders as RFC 3339 with microsecond precision and a `Z` suffix.
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Returns true if this timestamp is strictly after the other.
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self > other
    }
}

impl fmt::Display for SyncTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl FromStr for SyncTimestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
