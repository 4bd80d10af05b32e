//! Control loop: runs the engines on every tick boundary.
//!
//! Sensor reads and wear-counter persistence happen outside the controller
//! lock; each engine pass runs inside one `with_state` call.

use std::time::Duration;

use terrarium_domain::time::{self, Timestamp};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::ports::{LifecycleRepository, OutputPort, SensorPort, TraceSink};
use crate::shared::SharedController;
use crate::tick::{Tick, TickDriver};

/// Drives the [`Controller`](crate::controller::Controller) from wall-clock time.
pub struct ControlLoop<O, T, S, L> {
    controller: SharedController<O, T>,
    sensors: S,
    lifecycle: L,
    ticks: TickDriver,
}

impl<O, T, S, L> ControlLoop<O, T, S, L>
where
    O: OutputPort,
    T: TraceSink,
    S: SensorPort,
    L: LifecycleRepository,
{
    /// Create a loop whose first boundary is the second after `now`.
    pub fn new(controller: SharedController<O, T>, sensors: S, lifecycle: L, now: Timestamp) -> Self {
        Self {
            controller,
            sensors,
            lifecycle,
            ticks: TickDriver::starting_at(now),
        }
    }

    /// One loop iteration at `now`. Returns the boundaries that were crossed.
    pub fn run_once(&mut self, now: Timestamp) -> Tick {
        let tick = self.ticks.observe(now);
        if !tick.second {
            return tick;
        }
        self.controller.with_state(|c| c.sweep_expired(now));
        if tick.minute {
            self.minute_pass(now);
        }
        if tick.hours > 0 {
            self.hour_pass(now, tick.hours);
        }
        tick
    }

    fn minute_pass(&self, now: Timestamp) {
        let live = !self.controller.read(|c| c.sensor_source().is_test());
        let sample = if live {
            match self.sensors.read() {
                Ok(readings) => Some(readings),
                Err(err) => {
                    tracing::warn!(error = %err, "sensor read failed, keeping last sample");
                    None
                }
            }
        } else {
            None
        };
        self.controller.with_state(|c| {
            if let Some(readings) = sample {
                c.update_sensors(readings);
            }
            c.record_temperature(now);
            c.check_timers(now);
            c.check_sprayer(now);
            c.check_rules(now);
            c.check_trace(now);
        });
    }

    fn hour_pass(&self, now: Timestamp, hours: u32) {
        let saved = self.controller.persist(
            |c| {
                c.rearm_trace(now);
                c.decrease_lifetime(hours);
                Ok(c.lifecycle_counters())
            },
            |counters| self.lifecycle.save(counters),
        );
        if let Err(err) = saved {
            tracing::error!(error = %err, hours, "failed to persist lifecycle counters");
        }
    }

    /// Poll the wall clock every `poll_interval` until `shutdown` changes.
    pub async fn run(mut self, poll_interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(poll_ms = poll_interval.as_millis(), "control loop running");
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_once(time::now());
                }
                _ = shutdown.changed() => break,
            }
        }
        tracing::info!("control loop stopped");
    }
}
