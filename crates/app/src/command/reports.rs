//! Response bodies for the read-only commands.

use serde::Serialize;

use terrarium_domain::rules::RULESETS;
use terrarium_domain::time::{self, Timestamp};

use crate::controller::Controller;
use crate::ports::{OutputPort, TraceSink};

/// Body of `getSensors`.
#[derive(Debug, Clone, Serialize)]
pub struct SensorReport {
    /// `YYYY-MM-DD HH:MM`
    pub clock: String,
    pub sensors: [SensorValue; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorValue {
    pub location: &'static str,
    pub temperature: i32,
}

/// Body of `getState`.
#[derive(Debug, Clone, Serialize)]
pub struct StateReport {
    pub trace: &'static str,
    pub state: Vec<DeviceReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub device: String,
    pub state: &'static str,
    pub on_period: i64,
    /// Deadline as `HH:MM:SS`, only for bounded periods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub manual: &'static str,
    /// Remaining hours, only for wear-tracked devices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<u32>,
}

/// Body of `getProperties`.
#[derive(Debug, Clone, Serialize)]
pub struct Properties {
    pub tcu: &'static str,
    pub nr_of_timers: usize,
    pub nr_of_programs: usize,
    pub devices: Vec<DeviceProperties>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceProperties {
    pub device: String,
    pub nr_of_timers: u8,
    pub lc_counted: bool,
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

fn yes_no(yes: bool) -> &'static str {
    if yes { "yes" } else { "no" }
}

impl SensorReport {
    pub(crate) fn of<O: OutputPort, T: TraceSink>(c: &Controller<O, T>, now: Timestamp) -> Self {
        let readings = c.readings();
        Self {
            clock: now.format("%Y-%m-%d %H:%M").to_string(),
            sensors: [
                SensorValue {
                    location: "room",
                    temperature: readings.room,
                },
                SensorValue {
                    location: "terrarium",
                    temperature: readings.terrarium,
                },
            ],
        }
    }
}

impl StateReport {
    pub(crate) fn of<O: OutputPort, T: TraceSink>(c: &Controller<O, T>) -> Self {
        let state = c
            .devices()
            .iter()
            .enumerate()
            .map(|(ix, device)| {
                let s = c.device_state(ix);
                DeviceReport {
                    device: device.name.clone(),
                    state: on_off(s.is_on()),
                    on_period: s.on_period.raw(),
                    end_time: s.on_period.deadline().map(time::format_clock),
                    manual: yes_no(s.manual),
                    lifetime: device.has_lifetime.then_some(s.lifetime),
                }
            })
            .collect();
        Self {
            trace: on_off(c.is_trace_on()),
            state,
        }
    }
}

impl Properties {
    pub(crate) fn of<O: OutputPort, T: TraceSink>(c: &Controller<O, T>) -> Self {
        Self {
            tcu: "TERRARIUM",
            nr_of_timers: c.settings().timers.len(),
            nr_of_programs: RULESETS,
            devices: c
                .devices()
                .iter()
                .map(|d| DeviceProperties {
                    device: d.name.clone(),
                    nr_of_timers: d.nr_of_timers,
                    lc_counted: d.has_lifetime,
                })
                .collect(),
        }
    }
}
