//! Rulesets: thermostatic rules with fixed action lists.
//!
//! Two rulesets exist side by side and are evaluated independently. Each
//! holds a time-of-day window, an ideal temperature and a fixed array of
//! [`Rule`]s. The sign of a rule's `value` encodes the control direction:
//!
//! | value | deactivate when | else activate when |
//! |-------|-----------------|--------------------|
//! | `< 0` | temperature `>= ideal` | temperature `< |value|` |
//! | `> 0` | temperature `<= ideal` | temperature `> value` |
//! | `0`   | never | never |
//!
//! Reaching the ideal temperature always wins over the threshold, so a
//! heating rule whose threshold lies above the ideal still stops at the ideal.

mod action;
mod sprayer;

pub use action::{Action, ActionPeriod, MAX_ACTION_SECONDS};
pub use sprayer::SprayerRule;

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::error::TerrariumError;
use crate::time::{self, TimeOfDay};

/// Number of rulesets evaluated by the controller.
pub const RULESETS: usize = 2;
/// Rules per ruleset.
pub const RULES_PER_RULESET: usize = 2;
/// Action slots per rule.
pub const ACTIONS_PER_RULE: usize = 2;
/// Action slots in the sprayer rule.
pub const ACTIONS_PER_SPRAYER_RULE: usize = 4;

/// A group of rules active during a time-of-day window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Target terrarium number.
    pub terrarium: u8,
    #[serde(with = "yes_no")]
    pub active: bool,
    #[serde(default, with = "time::hhmm_or_empty")]
    pub from: Option<TimeOfDay>,
    #[serde(default, with = "time::hhmm_or_empty")]
    pub to: Option<TimeOfDay>,
    pub temp_ideal: i32,
    pub rules: [Rule; RULES_PER_RULESET],
}

/// A temperature threshold and the actions it drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub value: i32,
    pub actions: [Action; ACTIONS_PER_RULE],
}

/// Outcome of comparing a rule against the current temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleDecision {
    /// Run the rule's actions.
    Activate,
    /// Switch off the rule's devices that are on under rule authority.
    Deactivate,
    /// Leave everything as is.
    Hold,
}

impl Rule {
    /// A rule with threshold `0` and unused action slots.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            value: 0,
            actions: [Action::none(), Action::none()],
        }
    }

    #[must_use]
    pub fn decide(&self, temperature: i32, ideal: i32) -> RuleDecision {
        match self.value {
            v if v < 0 && temperature >= ideal => RuleDecision::Deactivate,
            v if v < 0 && temperature < -v => RuleDecision::Activate,
            v if v > 0 && temperature <= ideal => RuleDecision::Deactivate,
            v if v > 0 && temperature > v => RuleDecision::Activate,
            _ => RuleDecision::Hold,
        }
    }
}

impl Ruleset {
    /// An inactive ruleset without rules.
    #[must_use]
    pub fn inactive() -> Self {
        Self {
            terrarium: 1,
            active: false,
            from: None,
            to: None,
            temp_ideal: 0,
            rules: [Rule::empty(), Rule::empty()],
        }
    }

    /// Whether the ruleset is switched on and `minute` lies inside its window.
    ///
    /// A ruleset without a complete window never applies.
    #[must_use]
    pub fn applies_at(&self, minute: u16) -> bool {
        match (self.active, self.from, self.to) {
            (true, Some(from), Some(to)) => TimeOfDay::window_contains(from, to, minute),
            _ => false,
        }
    }

    /// Every action slot of every rule.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.rules.iter().flat_map(|r| r.actions.iter())
    }

    /// Check every action against the device catalog.
    ///
    /// # Errors
    ///
    /// Returns the first failing action's error.
    pub fn validate(&self, catalog: &[Device]) -> Result<(), TerrariumError> {
        self.actions().try_for_each(|a| a.validate(catalog))
    }
}

/// Serde adapter for `"yes"` / `"no"` flags.
mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "yes" } else { "no" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.trim().eq_ignore_ascii_case("yes"))
    }
}
