//! Action: a device to switch on, and for how long.

use serde::{Deserialize, Serialize};

use crate::device::{self, Device, NO_DEVICE, OnPeriod};
use crate::error::{TerrariumError, ValidationError};

/// Longest bounded burst an action may request, in seconds.
pub const MAX_ACTION_SECONDS: i64 = 3600;

/// One slot of a rule or sprayer rule action list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Target device, or [`NO_DEVICE`] for an unused slot.
    pub device: String,
    /// Seconds when positive, otherwise `-1` (endless) or `-2` (until ideal).
    pub on_period: i64,
}

/// Decoded `on_period` of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPeriod {
    Seconds(i64),
    Endless,
    UntilIdeal,
}

impl Action {
    /// An unused slot.
    #[must_use]
    pub fn none() -> Self {
        Self {
            device: NO_DEVICE.to_string(),
            on_period: 0,
        }
    }

    #[must_use]
    pub fn new(device: impl Into<String>, on_period: i64) -> Self {
        Self {
            device: device.into(),
            on_period,
        }
    }

    /// Target device name, `None` for an unused slot.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        if self.device.trim().is_empty() || self.device.eq_ignore_ascii_case(NO_DEVICE) {
            None
        } else {
            Some(&self.device)
        }
    }

    #[must_use]
    pub fn period(&self) -> ActionPeriod {
        match self.on_period {
            p if p > 0 => ActionPeriod::Seconds(p),
            OnPeriod::UNTIL_IDEAL => ActionPeriod::UntilIdeal,
            _ => ActionPeriod::Endless,
        }
    }

    /// Check the slot refers to a known device with a usable period.
    ///
    /// # Errors
    ///
    /// Returns [`TerrariumError::NotFound`] for an unknown device or
    /// [`ValidationError::InvalidActionPeriod`] for an unusable period.
    pub fn validate(&self, catalog: &[Device]) -> Result<(), TerrariumError> {
        let Some(target) = self.target() else {
            return Ok(());
        };
        device::position(catalog, target)?;
        let valid = matches!(self.on_period, 1..=MAX_ACTION_SECONDS)
            || self.on_period == OnPeriod::ENDLESS
            || self.on_period == OnPeriod::UNTIL_IDEAL;
        if !valid {
            return Err(ValidationError::InvalidActionPeriod(self.on_period).into());
        }
        Ok(())
    }
}

impl ActionPeriod {
    /// The device on-period this action produces when executed at `now_secs`.
    #[must_use]
    pub fn starting_at(self, now_secs: i64) -> OnPeriod {
        match self {
            Self::Seconds(secs) => OnPeriod::Until(now_secs + secs),
            Self::Endless => OnPeriod::Endless,
            Self::UntilIdeal => OnPeriod::UntilIdeal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::default_catalog;

    #[test]
    fn should_treat_sentinel_as_unused_slot() {
        assert_eq!(Action::none().target(), None);
        assert_eq!(Action::new("No Device", 10).target(), None);
        assert_eq!(Action::new("mist", 10).target(), Some("mist"));
    }

    #[test]
    fn should_decode_periods() {
        assert_eq!(Action::new("mist", 300).period(), ActionPeriod::Seconds(300));
        assert_eq!(Action::new("mist", -1).period(), ActionPeriod::Endless);
        assert_eq!(Action::new("mist", -2).period(), ActionPeriod::UntilIdeal);
    }

    #[test]
    fn should_compute_deadline_from_now_for_bounded_burst() {
        assert_eq!(
            ActionPeriod::Seconds(300).starting_at(1000),
            OnPeriod::Until(1300)
        );
        assert_eq!(
            ActionPeriod::UntilIdeal.starting_at(1000),
            OnPeriod::UntilIdeal
        );
    }

    #[test]
    fn should_accept_unused_slot_regardless_of_period() {
        let catalog = default_catalog();
        assert!(Action::none().validate(&catalog).is_ok());
    }

    #[test]
    fn should_reject_zero_period_on_active_slot() {
        let catalog = default_catalog();
        assert!(matches!(
            Action::new("mist", 0).validate(&catalog),
            Err(TerrariumError::Validation(
                ValidationError::InvalidActionPeriod(0)
            ))
        ));
        assert!(Action::new("mist", 3601).validate(&catalog).is_err());
    }

    #[test]
    fn should_reject_unknown_device() {
        let catalog = default_catalog();
        assert!(matches!(
            Action::new("heater", 60).validate(&catalog),
            Err(TerrariumError::NotFound(_))
        ));
    }
}
