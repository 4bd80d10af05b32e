//! Hardware ports: output pins and temperature sensors.

use std::sync::Arc;

use terrarium_domain::error::TerrariumError;
use terrarium_domain::sensor::SensorReadings;

/// Drives physical outputs.
pub trait OutputPort: Send + Sync {
    /// Set the output identified by `pin` to the given level (`true` = high).
    ///
    /// # Errors
    ///
    /// Returns a storage-class error when the driver rejects the write.
    fn set_level(&self, pin: u8, high: bool) -> Result<(), TerrariumError>;
}

impl<T: OutputPort> OutputPort for Arc<T> {
    fn set_level(&self, pin: u8, high: bool) -> Result<(), TerrariumError> {
        (**self).set_level(pin, high)
    }
}

/// Reads the temperature probes.
pub trait SensorPort: Send + Sync {
    /// Sample both probes.
    ///
    /// # Errors
    ///
    /// Returns an error when a probe cannot be read.
    fn read(&self) -> Result<SensorReadings, TerrariumError>;
}

impl<T: SensorPort> SensorPort for Arc<T> {
    fn read(&self) -> Result<SensorReadings, TerrariumError> {
        (**self).read()
    }
}
