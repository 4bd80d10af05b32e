//! Timer engine: daily on/off and on-for-duration schedules.

use terrarium_domain::device::{FAN_IN, FAN_OUT, MIST, OnPeriod, SPRAYER};
use terrarium_domain::error::TerrariumError;
use terrarium_domain::time::{self, Timestamp};
use terrarium_domain::timer::{Timer, TimerWindow};

use super::Controller;
use crate::ports::{OutputPort, TraceSink};

impl<O: OutputPort, T: TraceSink> Controller<O, T> {
    /// Fire every enabled timer whose on or off minute is `now`.
    pub fn check_timers(&mut self, now: Timestamp) {
        let minute = time::minute_of_day(now);
        let epoch = time::epoch_seconds(now);
        let timers: Vec<Timer> = self
            .settings
            .timers
            .iter()
            .filter(|t| t.is_enabled())
            .cloned()
            .collect();

        for timer in timers {
            let Ok(ix) = self.index_of(&timer.device) else {
                tracing::warn!(device = %timer.device, "timer for unknown device skipped");
                continue;
            };
            match timer.window() {
                TimerWindow::OnOff { on, off } => {
                    if minute == on {
                        if !self.is_on(ix) {
                            self.turn_on(ix, OnPeriod::Endless, now);
                            self.couple_fans(&timer.device, now);
                        }
                    } else if off != 0 && minute == off {
                        self.turn_off(ix, now);
                        self.restore_suppressed();
                    }
                }
                TimerWindow::OnFor { on, seconds } => {
                    if minute == on {
                        if !self.is_on(ix) {
                            self.turn_on(ix, OnPeriod::Until(epoch + i64::from(seconds)), now);
                        }
                        if timer.device.eq_ignore_ascii_case(SPRAYER) {
                            self.arm_sprayer();
                            self.silence_fans(now);
                        }
                    }
                }
            }
        }
    }

    /// Switch on the devices of every enabled on/off timer whose window
    /// contains `now`. Used once at startup.
    pub fn resume_timers(&mut self, now: Timestamp) {
        let minute = time::minute_of_day(now);
        let timers: Vec<Timer> = self
            .settings
            .timers
            .iter()
            .filter(|t| t.is_enabled())
            .cloned()
            .collect();

        for timer in timers {
            let TimerWindow::OnOff { on, off } = timer.window() else {
                continue;
            };
            if off == 0 || !window_open(on, off, minute) {
                continue;
            }
            if let Ok(ix) = self.index_of(&timer.device) {
                if !self.is_on(ix) {
                    tracing::info!(device = %timer.device, index = timer.index, "resuming timer");
                    self.turn_on(ix, OnPeriod::Endless, now);
                }
            }
        }
    }

    /// Timers of one device, ordered by index.
    ///
    /// # Errors
    ///
    /// Returns [`TerrariumError::NotFound`] for an unknown device.
    pub fn timers_for(&self, device: &str) -> Result<Vec<Timer>, TerrariumError> {
        self.index_of(device)?;
        let mut timers: Vec<Timer> = self
            .settings
            .timers
            .iter()
            .filter(|t| t.device.eq_ignore_ascii_case(device))
            .cloned()
            .collect();
        timers.sort_by_key(|t| t.index);
        Ok(timers)
    }

    /// Replace the timers occupying the same `(device, index)` slots as
    /// `timers`. Either every timer is accepted or none is.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure; nothing is replaced then.
    pub fn replace_timers(&mut self, timers: Vec<Timer>) -> Result<(), TerrariumError> {
        for timer in &timers {
            timer.validate(&self.settings.devices)?;
        }
        for timer in timers {
            match self
                .settings
                .timers
                .iter_mut()
                .find(|t| t.addresses(&timer.device, timer.index))
            {
                Some(slot) => *slot = timer,
                None => self.settings.timers.push(timer),
            }
        }
        self.schedule_sprayer();
        Ok(())
    }

    /// Mist running means both fans off; a fan timer claims both fans.
    fn couple_fans(&mut self, device: &str, now: Timestamp) {
        if device.eq_ignore_ascii_case(MIST) {
            self.silence_fans(now);
        } else if device.eq_ignore_ascii_case(FAN_IN) || device.eq_ignore_ascii_case(FAN_OUT) {
            for fan in [FAN_IN, FAN_OUT] {
                if let Ok(ix) = self.index_of(fan) {
                    self.suppress(ix);
                }
            }
        }
    }

    /// Suppress rule authority for both fans and switch them off.
    fn silence_fans(&mut self, now: Timestamp) {
        for fan in [FAN_IN, FAN_OUT] {
            if let Ok(ix) = self.index_of(fan) {
                self.suppress(ix);
                self.turn_off(ix, now);
            }
        }
    }
}

/// Whether `minute` lies in `[on, off)`, wrapping past midnight.
fn window_open(on: u16, off: u16, minute: u16) -> bool {
    if on <= off {
        minute >= on && minute < off
    } else {
        minute >= on || minute < off
    }
}
