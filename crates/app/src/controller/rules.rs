//! Rule engine: thermostatic rulesets and rule authority.

use terrarium_domain::device::RuleAuthority;
use terrarium_domain::error::{TerrariumError, ValidationError};
use terrarium_domain::rules::{Action, RULESETS, RuleDecision, Ruleset};
use terrarium_domain::time::{self, Timestamp};

use super::Controller;
use crate::ports::{OutputPort, TraceSink};

impl<O: OutputPort, T: TraceSink> Controller<O, T> {
    /// Evaluate both rulesets against the current terrarium temperature.
    pub fn check_rules(&mut self, now: Timestamp) {
        let minute = time::minute_of_day(now);
        let temperature = self.readings().terrarium;
        let rulesets = self.settings.rulesets.clone();

        for ruleset in &rulesets {
            if ruleset.applies_at(minute) {
                for rule in &ruleset.rules {
                    match rule.decide(temperature, ruleset.temp_ideal) {
                        RuleDecision::Activate => {
                            for action in &rule.actions {
                                self.execute_action(action, now);
                            }
                        }
                        RuleDecision::Deactivate => {
                            for action in &rule.actions {
                                self.release_action(action, now);
                            }
                        }
                        RuleDecision::Hold => {}
                    }
                }
            } else if ruleset.active {
                for action in ruleset.actions() {
                    self.release_action(action, now);
                }
            }
        }
    }

    /// Switch on an action's device if the rules own it and it is off.
    pub(crate) fn execute_action(&mut self, action: &Action, now: Timestamp) {
        let Some(target) = action.target() else {
            return;
        };
        let Ok(ix) = self.index_of(target) else {
            tracing::warn!(device = %target, "action for unknown device skipped");
            return;
        };
        if self.authority[ix] != RuleAuthority::Active || self.is_on(ix) {
            return;
        }
        let period = action.period().starting_at(time::epoch_seconds(now));
        self.turn_on(ix, period, now);
    }

    /// Switch off an action's device if it is on under rule authority.
    fn release_action(&mut self, action: &Action, now: Timestamp) {
        let Some(ix) = action.target().and_then(|t| self.index_of(t).ok()) else {
            return;
        };
        if self.is_on(ix) && self.authority[ix] == RuleAuthority::Active {
            self.turn_off(ix, now);
        }
    }

    /// Grant rule authority to every unclaimed device referenced by an
    /// active ruleset or by the sprayer rule.
    pub fn register_rule_authority(&mut self) {
        let referenced: Vec<String> = self
            .settings
            .rulesets
            .iter()
            .filter(|rs| rs.active)
            .flat_map(Ruleset::actions)
            .chain(self.settings.sprayer_rule.actions.iter())
            .filter_map(|a| a.target().map(str::to_string))
            .collect();
        for name in referenced {
            if let Ok(ix) = self.index_of(&name) {
                if self.authority[ix] == RuleAuthority::Unclaimed {
                    self.authority[ix] = RuleAuthority::Active;
                }
            }
        }
    }

    /// Ruleset `nr` (1-based).
    ///
    /// # Errors
    ///
    /// Returns a validation error when `nr` is not a ruleset number.
    pub fn ruleset(&self, nr: usize) -> Result<&Ruleset, TerrariumError> {
        Ok(&self.settings.rulesets[slot(nr)?])
    }

    /// Replace ruleset `nr` (1-based) and register authority for devices it
    /// newly references.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad number or an invalid ruleset.
    pub fn save_ruleset(&mut self, nr: usize, ruleset: Ruleset) -> Result<(), TerrariumError> {
        let slot = slot(nr)?;
        ruleset.validate(&self.settings.devices)?;
        tracing::info!(ruleset = nr, active = ruleset.active, "ruleset replaced");
        self.settings.rulesets[slot] = ruleset;
        self.register_rule_authority();
        Ok(())
    }
}

fn slot(nr: usize) -> Result<usize, ValidationError> {
    if (1..=RULESETS).contains(&nr) {
        Ok(nr - 1)
    } else {
        Err(ValidationError::OutOfRange {
            name: "rulesetnr",
            expected: "1 or 2",
        })
    }
}
