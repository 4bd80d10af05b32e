//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`TerrariumError`] via `From`. Validation and not-found errors are reported
//! back to the command caller; storage errors are logged and the in-memory
//! state stays authoritative.

/// Top-level error shared by every crate in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum TerrariumError {
    /// Caller supplied a missing, malformed, or out-of-range value.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A referenced device or resource does not exist.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// Persistence or file IO failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Reasons a request or configuration value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The request carried no payload although one is required.
    #[error("No data received.")]
    MissingData,

    /// A required parameter is absent or has the wrong JSON type.
    #[error("{kind} parameter '{name}' not found.")]
    MissingParameter {
        /// Parameter name as it appears on the wire.
        name: &'static str,
        /// Expected JSON type (`String`, `Integer`, …).
        kind: &'static str,
    },

    /// A parameter is present but outside its allowed range.
    #[error("Parameter '{name}' must be {expected}.")]
    OutOfRange {
        /// Parameter name as it appears on the wire.
        name: &'static str,
        /// Human readable range description.
        expected: &'static str,
    },

    /// A structured parameter failed to deserialize.
    #[error("Parameter '{name}' does not contain a valid {shape}: {reason}")]
    Malformed {
        /// Parameter name as it appears on the wire.
        name: &'static str,
        /// Expected object shape (`Timer array`, `Ruleset`, …).
        shape: &'static str,
        /// Deserializer message.
        reason: String,
    },

    /// The command name is not part of the command surface.
    #[error("Command '{0}' is not implemented.")]
    UnknownCommand(String),

    /// A time of day string is not `HH:MM`.
    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTimeOfDay(String),

    /// A timer addresses a `(device, index)` slot that does not exist.
    #[error("no timer {index} exists for device '{device}'")]
    UnknownTimerSlot {
        /// Device name of the offending timer.
        device: String,
        /// 1-based timer index.
        index: u8,
    },

    /// A timer carries an hour or minute outside the clock range.
    #[error("timer {index} of '{device}' has an invalid time")]
    InvalidTimerTime {
        /// Device name of the offending timer.
        device: String,
        /// 1-based timer index.
        index: u8,
    },

    /// An active action slot carries an unusable `on_period`.
    #[error("invalid on_period {0}, expected 1..=3600 seconds, -1 or -2")]
    InvalidActionPeriod(i64),

    /// Lifecycle counters only exist for wear-tracked devices.
    #[error("device '{0}' has no lifecycle counter")]
    NoLifecycleCounter(String),

    /// Trace file names must be plain names inside the trace directory.
    #[error("invalid trace file name '{0}'")]
    InvalidFileName(String),

    /// Device names must be non-empty.
    #[error("device name must not be empty")]
    EmptyName,

    /// Device names must be unique in the catalog.
    #[error("device '{0}' is defined more than once")]
    DuplicateDevice(String),
}

/// A referenced resource does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} '{id}' not found.")]
pub struct NotFoundError {
    /// Kind of resource (`Device`, `Ruleset`, `Trace file`).
    pub entity: &'static str,
    /// The identifier that failed to resolve.
    pub id: String,
}

impl TerrariumError {
    /// Wrap any IO-level error as a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }
}
