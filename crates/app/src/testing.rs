//! In-memory port implementations shared by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use terrarium_domain::device::LifecycleCounter;
use terrarium_domain::error::{NotFoundError, TerrariumError};
use terrarium_domain::sensor::SensorReadings;
use terrarium_domain::settings::Settings;
use terrarium_domain::time::Timestamp;
use terrarium_domain::trace::{TraceEntry, TraceKind};

use crate::controller::Controller;
use crate::ports::{
    LifecycleRepository, OutputPort, SensorPort, SettingsRepository, TraceArchive, TraceSink,
};

pub(crate) type TestController = Controller<Arc<RecordingOutput>, Arc<MemoryTrace>>;

/// A wall-clock time on a fixed test day.
pub(crate) fn at(h: u32, m: u32, s: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(2021, 1, 8)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

pub(crate) fn controller_with(
    settings: Settings,
) -> (TestController, Arc<RecordingOutput>, Arc<MemoryTrace>) {
    let output = Arc::new(RecordingOutput::default());
    let trace = Arc::new(MemoryTrace::default());
    let controller = Controller::new(settings, Arc::clone(&output), Arc::clone(&trace));
    (controller, output, trace)
}

#[derive(Default)]
pub(crate) struct RecordingOutput {
    levels: Mutex<HashMap<u8, bool>>,
    fail: Mutex<bool>,
}

impl RecordingOutput {
    pub(crate) fn level(&self, pin: u8) -> Option<bool> {
        self.levels.lock().unwrap().get(&pin).copied()
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

impl OutputPort for RecordingOutput {
    fn set_level(&self, pin: u8, high: bool) -> Result<(), TerrariumError> {
        if *self.fail.lock().unwrap() {
            return Err(TerrariumError::storage(std::io::Error::other("pin driver down")));
        }
        self.levels.lock().unwrap().insert(pin, high);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryTrace {
    lines: Mutex<Vec<(TraceKind, String)>>,
    files: Mutex<BTreeMap<String, String>>,
}

impl MemoryTrace {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|(_, l)| l.clone())
            .collect()
    }

    fn lines_of(&self, kind: TraceKind) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, l)| l.clone())
            .collect()
    }

    pub(crate) fn state_lines(&self) -> Vec<String> {
        self.lines_of(TraceKind::State)
    }

    pub(crate) fn temperature_lines(&self) -> Vec<String> {
        self.lines_of(TraceKind::Temperature)
    }
}

impl TraceSink for MemoryTrace {
    fn record(
        &self,
        kind: TraceKind,
        at: Timestamp,
        entry: &TraceEntry,
    ) -> Result<(), TerrariumError> {
        let line = entry.to_string();
        self.files
            .lock()
            .unwrap()
            .entry(kind.file_name(at))
            .or_default()
            .push_str(&format!("{} {line}\n", at.format("%Y-%m-%d %H:%M:%S")));
        self.lines.lock().unwrap().push((kind, line));
        Ok(())
    }
}

impl TraceArchive for MemoryTrace {
    fn list(&self, kind: TraceKind) -> Result<Vec<String>, TerrariumError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|name| name.starts_with(kind.file_prefix()))
            .cloned()
            .collect())
    }

    fn read(&self, name: &str) -> Result<String, TerrariumError> {
        self.files
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Trace file",
                    id: name.to_string(),
                }
                .into()
            })
    }
}

pub(crate) struct FixedSensors(pub(crate) Mutex<SensorReadings>);

impl FixedSensors {
    pub(crate) fn new(room: i32, terrarium: i32) -> Self {
        Self(Mutex::new(SensorReadings { room, terrarium }))
    }

    pub(crate) fn set(&self, room: i32, terrarium: i32) {
        *self.0.lock().unwrap() = SensorReadings { room, terrarium };
    }
}

impl SensorPort for FixedSensors {
    fn read(&self) -> Result<SensorReadings, TerrariumError> {
        Ok(*self.0.lock().unwrap())
    }
}

#[derive(Default)]
pub(crate) struct MemorySettings {
    pub(crate) saved: Mutex<Option<Settings>>,
    pub(crate) saves: Mutex<usize>,
}

impl SettingsRepository for MemorySettings {
    fn load(&self) -> Result<Option<Settings>, TerrariumError> {
        Ok(self.saved.lock().unwrap().clone())
    }

    fn save(&self, settings: &Settings) -> Result<(), TerrariumError> {
        *self.saved.lock().unwrap() = Some(settings.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryLifecycle {
    pub(crate) saved: Mutex<Vec<LifecycleCounter>>,
}

impl LifecycleRepository for MemoryLifecycle {
    fn load(&self) -> Result<Vec<LifecycleCounter>, TerrariumError> {
        Ok(self.saved.lock().unwrap().clone())
    }

    fn save(&self, counters: &[LifecycleCounter]) -> Result<(), TerrariumError> {
        *self.saved.lock().unwrap() = counters.to_vec();
        Ok(())
    }
}
