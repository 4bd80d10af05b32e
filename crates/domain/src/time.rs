//! Time and timestamp helpers.
//!
//! The controller works on local wall-clock time. Deadlines are stored as
//! epoch seconds of that wall-clock value, so `now` must always come from
//! [`now`] (or a test-constructed [`Timestamp`]) for the arithmetic to line up.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Local wall-clock time, as sampled by the tick driver.
pub type Timestamp = NaiveDateTime;

/// Number of minutes in a day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Return the current local wall-clock time.
#[must_use]
pub fn now() -> Timestamp {
    Local::now().naive_local()
}

/// Seconds since the epoch for a wall-clock timestamp.
#[must_use]
pub fn epoch_seconds(ts: Timestamp) -> i64 {
    ts.and_utc().timestamp()
}

/// Minute of the day (`0..1440`) for a wall-clock timestamp.
#[must_use]
pub fn minute_of_day(ts: Timestamp) -> u16 {
    let minutes = ts.hour() * 60 + ts.minute();
    u16::try_from(minutes).unwrap_or(0)
}

/// Format an epoch-second deadline as `HH:MM:SS`.
#[must_use]
pub fn format_clock(epoch_secs: i64) -> String {
    DateTime::from_timestamp(epoch_secs, 0).map_or_else(
        || epoch_secs.to_string(),
        |dt| dt.naive_utc().format("%H:%M:%S").to_string(),
    )
}

/// A time of day with minute resolution, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Build from hour and minute, `None` when out of range.
    #[must_use]
    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(u16::from(hour) * 60 + u16::from(minute)))
        } else {
            None
        }
    }

    /// Minute of the day.
    #[must_use]
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Whether `minute` falls in the inclusive window `[from, to]`.
    ///
    /// A window with `from > to` wraps around midnight.
    #[must_use]
    pub fn window_contains(from: Self, to: Self, minute: u16) -> bool {
        if from.0 <= to.0 {
            minute >= from.0 && minute <= to.0
        } else {
            minute >= from.0 || minute <= to.0
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTimeOfDay(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Serde adapter for optional `HH:MM` fields where an empty string means unset.
pub mod hhmm_or_empty {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TimeOfDay;

    /// Serialize `None` as `""`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &Option<TimeOfDay>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => serializer.collect_str(t),
            None => serializer.serialize_str(""),
        }
    }

    /// Deserialize `""` as `None`.
    ///
    /// # Errors
    ///
    /// Fails when a non-empty string is not `HH:MM`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TimeOfDay>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}
