//! Typed requests parsed from a command name and its JSON payload.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use terrarium_domain::error::ValidationError;
use terrarium_domain::rules::{MAX_ACTION_SECONDS, RULESETS, Ruleset, SprayerRule};
use terrarium_domain::sensor::SensorReadings;
use terrarium_domain::timer::Timer;
use terrarium_domain::trace::TraceKind;

/// One recognised command with its validated parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    GetSensors,
    /// Pin both readings for testing.
    SetSensors(SensorReadings),
    /// Return to live sensor readings.
    SetTestOff,
    GetState,
    SetDeviceOn { device: String },
    SetDeviceOff { device: String },
    /// Switch on for `seconds`, 1 to 3600.
    SetDeviceOnFor { device: String, seconds: i64 },
    SetDeviceManual { device: String, manual: bool },
    SetLifecycleCounter { device: String, hours: u32 },
    GetProperties,
    SetTrace(bool),
    GetTimersForDevice { device: String },
    ReplaceTimers(Vec<Timer>),
    /// `nr` is 1-based.
    GetRuleset { nr: usize },
    SaveRuleset { nr: usize, ruleset: Ruleset },
    GetSprayerRule,
    SetSprayerRule(SprayerRule),
    ListTraceFiles(TraceKind),
    ReadTraceFile { kind: TraceKind, name: String },
}

impl Request {
    /// Parse the command `cmd` with its optional `data` payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownCommand`] for names outside the
    /// command surface, or the first parameter that is missing, has the
    /// wrong type, or is out of range.
    pub fn parse(cmd: &str, data: Option<&Value>) -> Result<Self, ValidationError> {
        let request = match cmd {
            "getSensors" => Self::GetSensors,
            "setSensors" => {
                let data = object(data)?;
                Self::SetSensors(SensorReadings {
                    room: temperature(data, "roomtemp")?,
                    terrarium: temperature(data, "terrtemp")?,
                })
            }
            "setTestOff" => Self::SetTestOff,
            "getState" => Self::GetState,
            "setDeviceOn" => Self::SetDeviceOn {
                device: device(data)?,
            },
            "setDeviceOff" => Self::SetDeviceOff {
                device: device(data)?,
            },
            "setDeviceOnFor" => {
                let seconds = integer(object(data)?, "period")?;
                if !(1..=MAX_ACTION_SECONDS).contains(&seconds) {
                    return Err(ValidationError::OutOfRange {
                        name: "period",
                        expected: "between 1 and 3600 seconds",
                    });
                }
                Self::SetDeviceOnFor {
                    device: device(data)?,
                    seconds,
                }
            }
            "setDeviceManualOn" => Self::SetDeviceManual {
                device: device(data)?,
                manual: true,
            },
            "setDeviceManualOff" => Self::SetDeviceManual {
                device: device(data)?,
                manual: false,
            },
            "setLifecycleCounter" => {
                let hours = integer(object(data)?, "hours")?;
                let hours = u32::try_from(hours)
                    .ok()
                    .filter(|h| *h > 0)
                    .ok_or(ValidationError::OutOfRange {
                        name: "hours",
                        expected: "a positive number of hours",
                    })?;
                Self::SetLifecycleCounter {
                    device: device(data)?,
                    hours,
                }
            }
            "getProperties" => Self::GetProperties,
            "setTraceOn" => Self::SetTrace(true),
            "setTraceOff" => Self::SetTrace(false),
            "getTimersForDevice" => Self::GetTimersForDevice {
                device: device(data)?,
            },
            "replaceTimers" => {
                let timers = object(data)?
                    .get("timers")
                    .filter(|v| v.is_array())
                    .ok_or(ValidationError::MissingParameter {
                        name: "timers",
                        kind: "Array",
                    })?;
                Self::ReplaceTimers(structured(timers, "timers", "Timer array")?)
            }
            "getRuleset" => Self::GetRuleset {
                nr: ruleset_nr(object(data)?)?,
            },
            "saveRuleset" => {
                let data = object(data)?;
                let ruleset = data.get("ruleset").ok_or(ValidationError::MissingParameter {
                    name: "ruleset",
                    kind: "Object",
                })?;
                Self::SaveRuleset {
                    nr: ruleset_nr(data)?,
                    ruleset: structured(ruleset, "ruleset", "Ruleset")?,
                }
            }
            "getSprayerRule" => Self::GetSprayerRule,
            "setSprayerRule" => {
                let data = data.ok_or(ValidationError::MissingData)?;
                Self::SetSprayerRule(structured(data, "data", "SprayerRule")?)
            }
            "getTempTracefiles" => Self::ListTraceFiles(TraceKind::Temperature),
            "getStateTracefiles" => Self::ListTraceFiles(TraceKind::State),
            "getTemperatureFile" => Self::ReadTraceFile {
                kind: TraceKind::Temperature,
                name: string(object(data)?, "fname")?,
            },
            "getStateFile" => Self::ReadTraceFile {
                kind: TraceKind::State,
                name: string(object(data)?, "fname")?,
            },
            other => return Err(ValidationError::UnknownCommand(other.to_string())),
        };
        Ok(request)
    }
}

fn object(data: Option<&Value>) -> Result<&Map<String, Value>, ValidationError> {
    data.and_then(Value::as_object)
        .ok_or(ValidationError::MissingData)
}

fn string(data: &Map<String, Value>, name: &'static str) -> Result<String, ValidationError> {
    data.get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ValidationError::MissingParameter {
            name,
            kind: "String",
        })
}

fn integer(data: &Map<String, Value>, name: &'static str) -> Result<i64, ValidationError> {
    data.get(name)
        .and_then(Value::as_i64)
        .ok_or(ValidationError::MissingParameter {
            name,
            kind: "Integer",
        })
}

fn temperature(data: &Map<String, Value>, name: &'static str) -> Result<i32, ValidationError> {
    i32::try_from(integer(data, name)?).map_err(|_| ValidationError::OutOfRange {
        name,
        expected: "a temperature in degrees",
    })
}

fn device(data: Option<&Value>) -> Result<String, ValidationError> {
    string(object(data)?, "device")
}

fn ruleset_nr(data: &Map<String, Value>) -> Result<usize, ValidationError> {
    usize::try_from(integer(data, "rulesetnr")?)
        .ok()
        .filter(|nr| (1..=RULESETS).contains(nr))
        .ok_or(ValidationError::OutOfRange {
            name: "rulesetnr",
            expected: "1 or 2",
        })
}

fn structured<T: DeserializeOwned>(
    value: &Value,
    name: &'static str,
    shape: &'static str,
) -> Result<T, ValidationError> {
    T::deserialize(value).map_err(|err| ValidationError::Malformed {
        name,
        shape,
        reason: err.to_string(),
    })
}
