//! Trace streams: append-only records of device transitions and temperatures.

use std::fmt;

use crate::device::OnPeriod;
use crate::error::ValidationError;
use crate::sensor::SensorReadings;
use crate::time;

/// A trace activation expires after this many minutes.
pub const TRACE_MAX_MINUTES: i64 = 1440;

/// The two independent trace streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceKind {
    State,
    Temperature,
}

impl TraceKind {
    /// File name prefix of this stream's daily files.
    #[must_use]
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::State => "state_",
            Self::Temperature => "temp_",
        }
    }

    /// Daily file name for the given `YYYYMMDD` stamp.
    #[must_use]
    pub fn file_name(self, ts: time::Timestamp) -> String {
        format!("{}{}", self.file_prefix(), ts.format("%Y%m%d"))
    }

    /// Whether `name` belongs to this stream.
    #[must_use]
    pub fn owns(self, name: &str) -> bool {
        name.starts_with(self.file_prefix())
    }
}

/// Reject names that could escape the trace directory.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidFileName`] unless `name` is a plain
/// file name made of ASCII letters, digits, `_`, `-` or `.` that does not
/// start with a dot.
pub fn validate_file_name(name: &str) -> Result<(), ValidationError> {
    let plain = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if plain {
        Ok(())
    } else {
        Err(ValidationError::InvalidFileName(name.to_string()))
    }
}

/// Body of one trace line, without the leading timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEntry {
    /// Recording started.
    Start,
    /// Recording stopped.
    Stop,
    /// A device was switched on with the given period.
    On { device: String, period: OnPeriod },
    /// A device was switched off.
    Off { device: String },
    /// A temperature sample.
    Temperature(SensorReadings),
}

impl TraceEntry {
    /// Stream the entry belongs to; markers belong to both.
    #[must_use]
    pub fn kind(&self) -> Option<TraceKind> {
        match self {
            Self::On { .. } | Self::Off { .. } => Some(TraceKind::State),
            Self::Temperature(_) => Some(TraceKind::Temperature),
            Self::Start | Self::Stop => None,
        }
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Stop => f.write_str("stop"),
            Self::On { device, period } => match period.deadline() {
                Some(at) => write!(f, "{device} 1 {}", time::format_clock(at)),
                None => write!(f, "{device} 1 {}", period.raw()),
            },
            Self::Off { device } => write!(f, "{device} 0"),
            Self::Temperature(r) => write!(f, "r={} t={}", r.room, r.terrarium),
        }
    }
}
