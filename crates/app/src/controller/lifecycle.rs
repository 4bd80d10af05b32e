//! Wear tracker: remaining-life hours of wear-tracked devices.

use terrarium_domain::device::LifecycleCounter;
use terrarium_domain::error::{TerrariumError, ValidationError};

use super::Controller;
use crate::ports::{OutputPort, TraceSink};

impl<O: OutputPort, T: TraceSink> Controller<O, T> {
    /// Load persisted counters. Counters of unknown or untracked devices are
    /// skipped.
    pub fn apply_lifecycle_counters(&mut self, counters: &[LifecycleCounter]) {
        for counter in counters {
            match self.index_of(&counter.device) {
                Ok(ix) if self.settings.devices[ix].has_lifetime => {
                    self.states[ix].lifetime = counter.hours;
                }
                _ => {
                    tracing::warn!(device = %counter.device, "ignoring lifecycle counter");
                }
            }
        }
    }

    /// One counter per wear-tracked device, in catalog order.
    #[must_use]
    pub fn lifecycle_counters(&self) -> Vec<LifecycleCounter> {
        self.settings
            .devices
            .iter()
            .zip(&self.states)
            .filter(|(device, _)| device.has_lifetime)
            .map(|(device, state)| LifecycleCounter {
                device: device.name.clone(),
                hours: state.lifetime,
            })
            .collect()
    }

    /// Subtract elapsed hours from every wear-tracked device, stopping at zero.
    pub fn decrease_lifetime(&mut self, hours: u32) {
        for (device, state) in self.settings.devices.iter().zip(&mut self.states) {
            if device.has_lifetime {
                state.lifetime = state.lifetime.saturating_sub(hours);
                if state.lifetime == 0 {
                    tracing::warn!(device = %device.name, "device reached end of life");
                }
            }
        }
    }

    /// Set the remaining life of one device and return the counters to persist.
    ///
    /// # Errors
    ///
    /// Returns not-found for an unknown device or a validation error when the
    /// device is not wear-tracked.
    pub fn set_lifecycle_counter(
        &mut self,
        device: &str,
        hours: u32,
    ) -> Result<Vec<LifecycleCounter>, TerrariumError> {
        let ix = self.index_of(device)?;
        if !self.settings.devices[ix].has_lifetime {
            return Err(ValidationError::NoLifecycleCounter(device.to_string()).into());
        }
        self.states[ix].lifetime = hours;
        tracing::info!(device = %device, hours, "lifecycle counter set");
        Ok(self.lifecycle_counters())
    }
}
