//! Settings: the persisted configuration snapshot.
//!
//! Holds everything an operator can change: the device catalog, timers,
//! both rulesets and the sprayer rule. Runtime state (device states, rule
//! authority, trace flags) is never part of the snapshot.

use serde::{Deserialize, Serialize};

use crate::device::{self, Device};
use crate::error::TerrariumError;
use crate::rules::{RULESETS, Ruleset, SprayerRule};
use crate::timer::{self, Timer};

/// Persisted configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub devices: Vec<Device>,
    pub timers: Vec<Timer>,
    pub rulesets: [Ruleset; RULESETS],
    #[serde(rename = "sprayerrule")]
    pub sprayer_rule: SprayerRule,
}

impl Default for Settings {
    /// Factory defaults: the standard catalog with every timer disabled,
    /// inactive rulesets and an empty sprayer rule.
    fn default() -> Self {
        let devices = device::default_catalog();
        let timers = timer::default_timers(&devices);
        Self {
            devices,
            timers,
            rulesets: [Ruleset::inactive(), Ruleset::inactive()],
            sprayer_rule: SprayerRule::default(),
        }
    }
}

impl Settings {
    /// Check cross references between the catalog and everything naming a device.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), TerrariumError> {
        device::validate_catalog(&self.devices)?;
        for t in &self.timers {
            t.validate(&self.devices)?;
        }
        for rs in &self.rulesets {
            rs.validate(&self.devices)?;
        }
        self.sprayer_rule.validate(&self.devices)
    }
}
