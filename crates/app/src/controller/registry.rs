//! Device registry: on/off transitions, rule authority and the expiry sweep.

use terrarium_domain::device::{self, DeviceState, OnPeriod, RuleAuthority};
use terrarium_domain::error::{NotFoundError, TerrariumError};
use terrarium_domain::time::{self, Timestamp};
use terrarium_domain::trace::TraceEntry;

use super::Controller;
use crate::ports::{OutputPort, TraceSink};

impl<O: OutputPort, T: TraceSink> Controller<O, T> {
    /// Catalog position of the device called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] for an unknown device.
    pub fn index_of(&self, name: &str) -> Result<usize, NotFoundError> {
        device::position(&self.settings.devices, name)
    }

    #[must_use]
    pub fn is_on(&self, ix: usize) -> bool {
        self.states[ix].is_on()
    }

    #[must_use]
    pub fn device_state(&self, ix: usize) -> DeviceState {
        self.states[ix]
    }

    #[must_use]
    pub fn rule_authority(&self, ix: usize) -> RuleAuthority {
        self.authority[ix]
    }

    /// Energize a device. The state only changes when the output write succeeds.
    pub(crate) fn turn_on(&mut self, ix: usize, period: OnPeriod, now: Timestamp) {
        if !period.is_on() {
            self.turn_off(ix, now);
            return;
        }
        let device = &self.settings.devices[ix];
        if let Err(err) = self.output.set_level(device.pin, device.polarity.level(true)) {
            tracing::error!(device = %device.name, error = %err, "failed to switch device on");
            return;
        }
        self.states[ix].on_period = period;
        tracing::debug!(device = %device.name, on_period = period.raw(), "device on");
        let entry = TraceEntry::On {
            device: device.name.clone(),
            period,
        };
        self.trace_state(now, &entry);
    }

    /// De-energize a device. No-op, and no trace, when it is already off.
    pub(crate) fn turn_off(&mut self, ix: usize, now: Timestamp) {
        if !self.states[ix].is_on() {
            return;
        }
        let device = &self.settings.devices[ix];
        if let Err(err) = self.output.set_level(device.pin, device.polarity.level(false)) {
            tracing::error!(device = %device.name, error = %err, "failed to switch device off");
            return;
        }
        self.states[ix].on_period = OnPeriod::Off;
        tracing::debug!(device = %device.name, "device off");
        let entry = TraceEntry::Off {
            device: device.name.clone(),
        };
        self.trace_state(now, &entry);
    }

    /// Take rule authority away from a device.
    pub(crate) fn suppress(&mut self, ix: usize) {
        self.authority[ix] = RuleAuthority::Suppressed;
    }

    /// Hand rule authority back to every suppressed device.
    pub(crate) fn restore_suppressed(&mut self) {
        for authority in &mut self.authority {
            if *authority == RuleAuthority::Suppressed {
                *authority = RuleAuthority::Active;
            }
        }
    }

    /// Switch off every device whose deadline has passed.
    pub fn sweep_expired(&mut self, now: Timestamp) {
        let epoch = time::epoch_seconds(now);
        for ix in 0..self.states.len() {
            let expired = self.states[ix]
                .on_period
                .deadline()
                .is_some_and(|deadline| epoch >= deadline);
            if expired {
                self.turn_off(ix, now);
                self.restore_suppressed();
            }
        }
    }

    /// Operator request to switch a device on. Replaces the period of a
    /// device that is already on.
    ///
    /// # Errors
    ///
    /// Returns [`TerrariumError::NotFound`] for an unknown device.
    pub fn switch_on(
        &mut self,
        name: &str,
        period: OnPeriod,
        now: Timestamp,
    ) -> Result<(), TerrariumError> {
        let ix = self.index_of(name)?;
        if self.states[ix].on_period != period {
            self.turn_on(ix, period, now);
        }
        Ok(())
    }

    /// Operator request to switch a device off.
    ///
    /// # Errors
    ///
    /// Returns [`TerrariumError::NotFound`] for an unknown device.
    pub fn switch_off(&mut self, name: &str, now: Timestamp) -> Result<(), TerrariumError> {
        let ix = self.index_of(name)?;
        self.turn_off(ix, now);
        Ok(())
    }

    /// Set or clear the operator's manual flag.
    ///
    /// # Errors
    ///
    /// Returns [`TerrariumError::NotFound`] for an unknown device.
    pub fn set_manual(&mut self, name: &str, manual: bool) -> Result<(), TerrariumError> {
        let ix = self.index_of(name)?;
        self.states[ix].manual = manual;
        Ok(())
    }
}
