use core::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

const MICROS_PER_SECOND: u64 = 1_000_000;

/// Block time as carried in a Solana query response: microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct BlockTime(pub u64);

impl BlockTime {
    /// Converts the seconds-resolution time reported by `getBlock`.
    pub fn from_unix_seconds(seconds: i64) -> Option<Self> {
        u64::try_from(seconds)
            .ok()?
            .checked_mul(MICROS_PER_SECOND)
            .map(BlockTime)
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_unix_seconds(&self) -> u64 {
        self.0 / MICROS_PER_SECOND
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let micros = i64::try_from(self.0).ok()?;
        DateTime::<Utc>::from_timestamp_micros(micros)
    }

    /// ISO-8601 with millisecond precision, e.g. `2024-02-08T18:30:04.000Z`.
    pub fn to_iso8601(&self) -> String {
        match self.to_datetime() {
            Some(datetime) => datetime.to_rfc3339_opts(SecondsFormat::Millis, true),
            None => format!("invalid({})", self.0),
        }
    }
}

impl fmt::Display for BlockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}
