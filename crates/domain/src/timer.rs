//! Timer: a daily schedule entry for one device.
//!
//! A timer with `period == 0` describes an on/off window; a positive
//! `period` describes an on-time plus a duration in seconds. Timers are
//! addressed by `(device, index)` with a 1-based index.

use serde::{Deserialize, Serialize};

use crate::device::{self, Device};
use crate::error::{TerrariumError, ValidationError};
use crate::time::TimeOfDay;

/// A daily schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub device: String,
    pub index: u8,
    pub hour_on: u8,
    pub minute_on: u8,
    #[serde(default)]
    pub hour_off: u8,
    #[serde(default)]
    pub minute_off: u8,
    /// `0` disables the timer.
    #[serde(default)]
    pub repeat: u8,
    /// Duration in seconds; `0` means the off time applies.
    #[serde(default)]
    pub period: u32,
}

/// The shape of a timer's daily window, in minutes of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerWindow {
    /// Switch on at `on`, switch off at `off` (`off == 0` never switches off).
    OnOff { on: u16, off: u16 },
    /// Switch on at `on` for `seconds`.
    OnFor { on: u16, seconds: u32 },
}

impl Timer {
    /// A disabled timer at `00:00`, the factory default for every slot.
    #[must_use]
    pub fn disabled(device: impl Into<String>, index: u8) -> Self {
        Self {
            device: device.into(),
            index,
            hour_on: 0,
            minute_on: 0,
            hour_off: 0,
            minute_off: 0,
            repeat: 0,
            period: 0,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.repeat != 0
    }

    /// Whether this timer occupies the `(device, index)` slot.
    #[must_use]
    pub fn addresses(&self, device: &str, index: u8) -> bool {
        self.index == index && self.device.eq_ignore_ascii_case(device)
    }

    /// On time as minute of day.
    #[must_use]
    pub fn on_minute(&self) -> u16 {
        u16::from(self.hour_on) * 60 + u16::from(self.minute_on)
    }

    /// Off time as minute of day.
    #[must_use]
    pub fn off_minute(&self) -> u16 {
        u16::from(self.hour_off) * 60 + u16::from(self.minute_off)
    }

    #[must_use]
    pub fn window(&self) -> TimerWindow {
        if self.period == 0 {
            TimerWindow::OnOff {
                on: self.on_minute(),
                off: self.off_minute(),
            }
        } else {
            TimerWindow::OnFor {
                on: self.on_minute(),
                seconds: self.period,
            }
        }
    }

    /// Check that the timer refers to a known device slot and a valid clock time.
    ///
    /// # Errors
    ///
    /// Returns [`TerrariumError::NotFound`] for an unknown device, or a
    /// validation error for an invalid slot or time.
    pub fn validate(&self, catalog: &[Device]) -> Result<(), TerrariumError> {
        let ix = device::position(catalog, &self.device)?;
        if self.index == 0 || self.index > catalog[ix].nr_of_timers {
            return Err(ValidationError::UnknownTimerSlot {
                device: self.device.clone(),
                index: self.index,
            }
            .into());
        }
        if TimeOfDay::from_hm(self.hour_on, self.minute_on).is_none()
            || TimeOfDay::from_hm(self.hour_off, self.minute_off).is_none()
        {
            return Err(ValidationError::InvalidTimerTime {
                device: self.device.clone(),
                index: self.index,
            }
            .into());
        }
        Ok(())
    }
}

/// One disabled timer per reserved slot, in catalog order.
#[must_use]
pub fn default_timers(catalog: &[Device]) -> Vec<Timer> {
    catalog
        .iter()
        .flat_map(|d| (1..=d.nr_of_timers).map(|index| Timer::disabled(d.name.clone(), index)))
        .collect()
}
