//! Controller: the control state aggregate and its engines.
//!
//! A single [`Controller`] owns everything the periodic engines and the
//! command handlers touch: configuration, device states, rule authority,
//! the sprayer delay, the sensor cache and the trace flag. It is built once
//! at startup and shared behind [`SharedController`](crate::shared::SharedController).
//!
//! Every engine takes the current wall-clock time as a parameter, so tests
//! drive minute and hour boundaries without waiting for them.
//!
//! Engines, in the order the control loop runs them:
//!
//! | Boundary | Engine | Module |
//! |----------|--------|--------|
//! | second | expiry sweep | `registry` |
//! | minute | temperature trace, timers, sprayer delay, rules, trace expiry | `trace`, `timers`, `sprayer`, `rules` |
//! | hour | trace re-arm, wear decrement | `trace`, `lifecycle` |

mod lifecycle;
mod registry;
mod rules;
mod sprayer;
mod timers;
mod trace;

use terrarium_domain::device::{Device, DeviceState, RuleAuthority};
use terrarium_domain::sensor::{SensorReadings, SensorSource};
use terrarium_domain::settings::Settings;
use terrarium_domain::time::Timestamp;

use crate::ports::{OutputPort, TraceSink};

use self::sprayer::SprayerDelay;
use self::trace::TraceState;

/// The control state aggregate.
pub struct Controller<O, T> {
    settings: Settings,
    states: Vec<DeviceState>,
    authority: Vec<RuleAuthority>,
    sprayer: SprayerDelay,
    live: SensorReadings,
    source: SensorSource,
    trace: TraceState,
    output: O,
    sink: T,
}

impl<O: OutputPort, T: TraceSink> Controller<O, T> {
    /// Build a controller with every device off and no rule authority
    /// registered yet.
    pub fn new(settings: Settings, output: O, sink: T) -> Self {
        let count = settings.devices.len();
        let mut controller = Self {
            settings,
            states: vec![DeviceState::default(); count],
            authority: vec![RuleAuthority::default(); count],
            sprayer: SprayerDelay::default(),
            live: SensorReadings::default(),
            source: SensorSource::Live,
            trace: TraceState::default(),
            output,
            sink,
        };
        controller.schedule_sprayer();
        controller
    }

    /// Bring the controller into its running state: resume timers whose
    /// window is open, register rule authority and start tracing.
    pub fn start(&mut self, now: Timestamp) {
        self.resume_timers(now);
        self.register_rule_authority();
        self.set_trace(true, now);
        tracing::info!(
            devices = self.settings.devices.len(),
            timers = self.settings.timers.len(),
            sprayer_fires_at = ?self.sprayer.fires_at,
            "controller started"
        );
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.settings.devices
    }

    /// Current temperatures: the pinned test values or the last live sample.
    #[must_use]
    pub fn readings(&self) -> SensorReadings {
        match self.source {
            SensorSource::Fixed(readings) => readings,
            SensorSource::Live => self.live,
        }
    }

    #[must_use]
    pub fn sensor_source(&self) -> SensorSource {
        self.source
    }

    /// Store a live sample. Ignored for rule decisions while readings are pinned.
    pub fn update_sensors(&mut self, readings: SensorReadings) {
        self.live = readings;
    }

    /// Pin the readings to fixed values until [`Self::release_sensors`].
    pub fn pin_sensors(&mut self, readings: SensorReadings) {
        tracing::info!(room = readings.room, terrarium = readings.terrarium, "sensors pinned");
        self.source = SensorSource::Fixed(readings);
    }

    /// Return to live readings.
    pub fn release_sensors(&mut self) {
        if self.source.is_test() {
            tracing::info!("sensors back to live readings");
        }
        self.source = SensorSource::Live;
    }
}
