//! Virtual temperature probes.

use std::sync::{Mutex, PoisonError};

use terrarium_app::ports::SensorPort;
use terrarium_domain::error::TerrariumError;
use terrarium_domain::sensor::SensorReadings;

/// Probes that report whatever they were last set to.
pub struct VirtualProbes {
    readings: Mutex<SensorReadings>,
}

impl VirtualProbes {
    #[must_use]
    pub fn new(room: i32, terrarium: i32) -> Self {
        Self {
            readings: Mutex::new(SensorReadings { room, terrarium }),
        }
    }

    /// Change what the next read returns.
    pub fn set(&self, readings: SensorReadings) {
        *self.readings.lock().unwrap_or_else(PoisonError::into_inner) = readings;
    }
}

impl SensorPort for VirtualProbes {
    fn read(&self) -> Result<SensorReadings, TerrariumError> {
        Ok(*self.readings.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
