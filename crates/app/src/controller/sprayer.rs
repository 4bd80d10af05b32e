//! Sprayer delay: chained actions a fixed delay after the sprayer timer.

use terrarium_domain::device::{RuleAuthority, SPRAYER};
use terrarium_domain::error::TerrariumError;
use terrarium_domain::rules::SprayerRule;
use terrarium_domain::time::{self, Timestamp};

use super::Controller;
use crate::ports::{OutputPort, TraceSink};

/// Arming state of the spray sequence.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct SprayerDelay {
    pub(super) armed: bool,
    /// Minute of day the chained actions fire; `None` without a sprayer timer.
    pub(super) fires_at: Option<u16>,
}

impl<O: OutputPort, T: TraceSink> Controller<O, T> {
    /// Fire the sprayer rule's actions when armed and the delay has elapsed.
    ///
    /// Every action device the rules owned is suppressed so the rules do not
    /// fight the sequence; the next off or expiry event restores them.
    pub fn check_sprayer(&mut self, now: Timestamp) {
        if !self.sprayer.armed || self.sprayer.fires_at != Some(time::minute_of_day(now)) {
            return;
        }
        let actions = self.settings.sprayer_rule.actions.clone();
        for action in &actions {
            let Some(ix) = action.target().and_then(|t| self.index_of(t).ok()) else {
                continue;
            };
            self.execute_action(action, now);
            if self.authority[ix] == RuleAuthority::Active {
                self.suppress(ix);
            }
        }
        self.sprayer.armed = false;
        tracing::info!("sprayer sequence fired");
    }

    #[must_use]
    pub fn is_sprayer_armed(&self) -> bool {
        self.sprayer.armed
    }

    /// Minute of day the chained actions fire at.
    #[must_use]
    pub fn sprayer_fires_at(&self) -> Option<u16> {
        self.sprayer.fires_at
    }

    #[must_use]
    pub fn sprayer_rule(&self) -> &SprayerRule {
        &self.settings.sprayer_rule
    }

    /// Replace the sprayer rule, re-register rule authority and reschedule.
    ///
    /// # Errors
    ///
    /// Returns the first invalid action's error; nothing is replaced then.
    pub fn set_sprayer_rule(&mut self, rule: SprayerRule) -> Result<(), TerrariumError> {
        rule.validate(&self.settings.devices)?;
        tracing::info!(delay = rule.delay, "sprayer rule replaced");
        self.settings.sprayer_rule = rule;
        self.register_rule_authority();
        self.schedule_sprayer();
        Ok(())
    }

    pub(super) fn arm_sprayer(&mut self) {
        self.sprayer.armed = true;
    }

    /// Derive the firing minute from the first sprayer timer's on-time.
    pub(super) fn schedule_sprayer(&mut self) {
        self.sprayer.fires_at = self
            .settings
            .timers
            .iter()
            .find(|t| t.addresses(SPRAYER, 1))
            .map(|t| self.settings.sprayer_rule.fires_at(t.on_minute()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestController, at, controller_with};
    use terrarium_domain::device::OnPeriod;
    use terrarium_domain::rules::Action;
    use terrarium_domain::settings::Settings;
    use terrarium_domain::timer::Timer;

    fn spray_at_five() -> TestController {
        let mut settings = Settings::default();
        let slot = settings
            .timers
            .iter_mut()
            .find(|t| t.addresses("sprayer", 1))
            .unwrap();
        *slot = Timer {
            hour_on: 5,
            period: 120,
            repeat: 1,
            ..Timer::disabled("sprayer", 1)
        };
        settings.sprayer_rule = SprayerRule {
            delay: 10,
            actions: [
                Action::new("mist", 300),
                Action::none(),
                Action::none(),
                Action::none(),
            ],
        };
        let (mut controller, _, _) = controller_with(settings);
        controller.start(at(4, 0, 0));
        controller
    }

    fn minute_pass(controller: &mut TestController, h: u32, m: u32) {
        let now = at(h, m, 0);
        controller.sweep_expired(now);
        controller.check_timers(now);
        controller.check_sprayer(now);
        controller.check_rules(now);
    }

    #[test]
    fn should_schedule_from_sprayer_on_time_plus_delay() {
        let controller = spray_at_five();
        assert_eq!(controller.sprayer_fires_at(), Some(310));
    }

    #[test]
    fn should_fire_mist_exactly_delay_minutes_after_spray() {
        let mut controller = spray_at_five();
        let mist = controller.index_of("mist").unwrap();

        for m in 0..10 {
            minute_pass(&mut controller, 5, m);
            assert!(!controller.is_on(mist), "mist on at 05:{m:02}");
        }
        minute_pass(&mut controller, 5, 10);

        assert_eq!(
            controller.device_state(mist).on_period,
            OnPeriod::Until(time::epoch_seconds(at(5, 15, 0)))
        );
        assert_eq!(controller.rule_authority(mist), RuleAuthority::Suppressed);
        assert!(!controller.is_sprayer_armed());
    }

    #[test]
    fn should_restore_mist_authority_when_burst_expires() {
        let mut controller = spray_at_five();
        let mist = controller.index_of("mist").unwrap();
        for m in 0..=10 {
            minute_pass(&mut controller, 5, m);
        }

        controller.sweep_expired(at(5, 15, 0));

        assert!(!controller.is_on(mist));
        assert_eq!(controller.rule_authority(mist), RuleAuthority::Active);
    }

    #[test]
    fn should_not_fire_when_not_armed() {
        let mut controller = spray_at_five();
        let mist = controller.index_of("mist").unwrap();
        controller.check_sprayer(at(5, 10, 0));
        assert!(!controller.is_on(mist));
    }

    #[test]
    fn should_reschedule_when_rule_is_replaced() {
        let mut controller = spray_at_five();
        let mut rule = controller.sprayer_rule().clone();
        rule.delay = 45;
        rule.actions[1] = Action::new("fan_out", 600);

        controller.set_sprayer_rule(rule).unwrap();

        assert_eq!(controller.sprayer_fires_at(), Some(345));
        let fan_out = controller.index_of("fan_out").unwrap();
        assert_eq!(controller.rule_authority(fan_out), RuleAuthority::Active);
    }

    #[test]
    fn should_reject_rule_with_invalid_period() {
        let mut controller = spray_at_five();
        let mut rule = controller.sprayer_rule().clone();
        rule.actions[0] = Action::new("mist", 0);
        assert!(controller.set_sprayer_rule(rule).is_err());
        assert_eq!(controller.sprayer_rule().actions[0].on_period, 300);
    }
}
