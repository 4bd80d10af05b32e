//! Command service: executes parsed requests against the shared controller.

use serde::Serialize;
use serde_json::{Map, Value};

use terrarium_domain::device::OnPeriod;
use terrarium_domain::error::{TerrariumError, ValidationError};
use terrarium_domain::time::{self, Timestamp};
use terrarium_domain::trace;

use super::envelope::{Command, CommandHandler, Response};
use super::reports::{Properties, SensorReport, StateReport};
use super::request::Request;
use crate::controller::Controller;
use crate::ports::{
    LifecycleRepository, OutputPort, SensorPort, SettingsRepository, TraceArchive, TraceSink,
};
use crate::shared::SharedController;

type Body = Result<Option<Value>, TerrariumError>;

/// Application service behind the command link.
///
/// Configuration changes are applied under the controller lock; the
/// resulting snapshot is persisted after the lock is released, in the order
/// the snapshots were taken.
pub struct CommandService<O, T, S, R, L, A> {
    controller: SharedController<O, T>,
    sensors: S,
    settings: R,
    lifecycle: L,
    archive: A,
}

impl<O, T, S, R, L, A> CommandService<O, T, S, R, L, A>
where
    O: OutputPort,
    T: TraceSink,
    S: SensorPort,
    R: SettingsRepository,
    L: LifecycleRepository,
    A: TraceArchive,
{
    pub fn new(
        controller: SharedController<O, T>,
        sensors: S,
        settings: R,
        lifecycle: L,
        archive: A,
    ) -> Self {
        Self {
            controller,
            sensors,
            settings,
            lifecycle,
            archive,
        }
    }

    /// Execute `request` as of `now` and return the response body.
    ///
    /// # Errors
    ///
    /// Returns validation and not-found errors for bad requests, or a
    /// storage error when persisting or reading trace files fails. A failed
    /// persist leaves the in-memory change in place.
    pub fn execute(&self, request: Request, now: Timestamp) -> Body {
        match request {
            Request::GetSensors => {
                self.refresh_sensors();
                json_body(&self.controller.read(|c| SensorReport::of(c, now)))
            }
            Request::SetSensors(readings) => {
                self.controller.with_state(|c| c.pin_sensors(readings));
                Ok(None)
            }
            Request::SetTestOff => {
                self.controller.with_state(Controller::release_sensors);
                Ok(None)
            }
            Request::GetState => json_body(&self.controller.read(StateReport::of)),
            Request::SetDeviceOn { device } => {
                self.controller
                    .with_state(|c| c.switch_on(&device, OnPeriod::Endless, now))?;
                Ok(None)
            }
            Request::SetDeviceOff { device } => {
                self.controller.with_state(|c| c.switch_off(&device, now))?;
                Ok(None)
            }
            Request::SetDeviceOnFor { device, seconds } => {
                let period = OnPeriod::Until(time::epoch_seconds(now) + seconds);
                self.controller
                    .with_state(|c| c.switch_on(&device, period, now))?;
                Ok(None)
            }
            Request::SetDeviceManual { device, manual } => {
                self.controller.with_state(|c| c.set_manual(&device, manual))?;
                Ok(None)
            }
            Request::SetLifecycleCounter { device, hours } => {
                self.controller.persist(
                    |c| c.set_lifecycle_counter(&device, hours),
                    |counters| {
                        self.lifecycle.save(counters).inspect_err(|err| {
                            tracing::error!(error = %err, "failed to persist lifecycle counters");
                        })
                    },
                )?;
                Ok(None)
            }
            Request::GetProperties => json_body(&self.controller.read(Properties::of)),
            Request::SetTrace(on) => {
                self.controller.with_state(|c| c.set_trace(on, now));
                Ok(None)
            }
            Request::GetTimersForDevice { device } => {
                let timers = self.controller.read(|c| c.timers_for(&device))?;
                keyed_body("timers", &timers)
            }
            Request::ReplaceTimers(timers) => self.update_settings(|c| c.replace_timers(timers)),
            Request::GetRuleset { nr } => {
                let ruleset = self.controller.read(|c| c.ruleset(nr).cloned())?;
                json_body(&ruleset)
            }
            Request::SaveRuleset { nr, ruleset } => {
                self.update_settings(|c| c.save_ruleset(nr, ruleset))
            }
            Request::GetSprayerRule => {
                json_body(&self.controller.read(|c| c.sprayer_rule().clone()))
            }
            Request::SetSprayerRule(rule) => self.update_settings(|c| c.set_sprayer_rule(rule)),
            Request::ListTraceFiles(kind) => keyed_body("files", &self.archive.list(kind)?),
            Request::ReadTraceFile { kind, name } => {
                trace::validate_file_name(&name)?;
                if !kind.owns(&name) {
                    return Err(ValidationError::InvalidFileName(name).into());
                }
                keyed_body("content", &self.archive.read(&name)?)
            }
        }
    }

    /// Take a fresh sample unless readings are pinned. A failed read keeps
    /// the cached sample.
    fn refresh_sensors(&self) {
        if self.controller.read(|c| c.sensor_source().is_test()) {
            return;
        }
        match self.sensors.read() {
            Ok(readings) => self.controller.with_state(|c| c.update_sensors(readings)),
            Err(err) => tracing::warn!(error = %err, "sensor read failed, reporting last sample"),
        }
    }

    fn update_settings(
        &self,
        change: impl FnOnce(&mut Controller<O, T>) -> Result<(), TerrariumError>,
    ) -> Body {
        self.controller.persist(
            |c| {
                change(c)?;
                Ok::<_, TerrariumError>(c.settings().clone())
            },
            |snapshot| {
                self.settings.save(snapshot).inspect_err(|err| {
                    tracing::error!(error = %err, "failed to persist settings");
                })
            },
        )?;
        Ok(None)
    }
}

impl<O, T, S, R, L, A> CommandHandler for CommandService<O, T, S, R, L, A>
where
    O: OutputPort,
    T: TraceSink,
    S: SensorPort,
    R: SettingsRepository,
    L: LifecycleRepository,
    A: TraceArchive,
{
    #[tracing::instrument(skip(self, command), fields(cmd = %command.cmd))]
    fn handle(&self, command: Command) -> Response {
        let result = Request::parse(&command.cmd, command.data.as_ref())
            .map_err(TerrariumError::from)
            .and_then(|request| self.execute(request, time::now()));
        match result {
            Ok(body) => Response::success(&command, body),
            Err(err) => {
                tracing::warn!(error = %err, "command rejected");
                Response::failure(command.msg_id, command.cmd, err)
            }
        }
    }
}

fn json_body(value: &impl Serialize) -> Body {
    serde_json::to_value(value)
        .map(Some)
        .map_err(TerrariumError::storage)
}

fn keyed_body(key: &str, value: &impl Serialize) -> Body {
    let mut body = Map::new();
    body.insert(
        key.to_string(),
        serde_json::to_value(value).map_err(TerrariumError::storage)?,
    );
    Ok(Some(Value::Object(body)))
}
