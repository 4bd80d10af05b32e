//! Sprayer rule: actions chained a fixed delay after the sprayer timer fires.

use serde::{Deserialize, Serialize};

use super::{ACTIONS_PER_SPRAYER_RULE, Action};
use crate::device::Device;
use crate::error::TerrariumError;
use crate::time::MINUTES_PER_DAY;

/// Delayed follow-up actions for the spray sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprayerRule {
    /// Minutes after the sprayer timer's on-time.
    pub delay: u16,
    pub actions: [Action; ACTIONS_PER_SPRAYER_RULE],
}

impl Default for SprayerRule {
    fn default() -> Self {
        Self {
            delay: 0,
            actions: [Action::none(), Action::none(), Action::none(), Action::none()],
        }
    }
}

impl SprayerRule {
    /// Minute of day at which the chained actions fire for a sprayer timer
    /// switching on at `on_minute`.
    #[must_use]
    pub fn fires_at(&self, on_minute: u16) -> u16 {
        let total = u32::from(on_minute) + u32::from(self.delay);
        u16::try_from(total % u32::from(MINUTES_PER_DAY)).unwrap_or(0)
    }

    /// Check every action against the device catalog.
    ///
    /// # Errors
    ///
    /// Returns the first failing action's error.
    pub fn validate(&self, catalog: &[Device]) -> Result<(), TerrariumError> {
        self.actions.iter().try_for_each(|a| a.validate(catalog))
    }
}
