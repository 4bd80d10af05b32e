//! Sensor readings and where they come from.

use serde::{Deserialize, Serialize};

/// Room and terrarium temperature, in whole degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorReadings {
    pub room: i32,
    pub terrarium: i32,
}

/// Which source feeds the sensor cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorSource {
    /// Read the hardware every minute.
    #[default]
    Live,
    /// Pinned to operator-supplied values until switched back to live.
    Fixed(SensorReadings),
}

impl SensorSource {
    #[must_use]
    pub fn is_test(self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}
