//! Trace recorder: state and temperature streams, time-boxed per activation.

use terrarium_domain::time::{self, Timestamp};
use terrarium_domain::trace::{TRACE_MAX_MINUTES, TraceEntry, TraceKind};

use super::Controller;
use crate::ports::{OutputPort, TraceSink};

#[derive(Debug, Clone, Copy, Default)]
pub(super) struct TraceState {
    on: bool,
    /// Epoch seconds of the current activation.
    started_at: i64,
}

impl<O: OutputPort, T: TraceSink> Controller<O, T> {
    #[must_use]
    pub fn is_trace_on(&self) -> bool {
        self.trace.on
    }

    /// Start or stop both trace streams. Starting while on restarts the
    /// one-day window.
    pub fn set_trace(&mut self, on: bool, now: Timestamp) {
        match (self.trace.on, on) {
            (false, true) => {
                self.trace = TraceState {
                    on: true,
                    started_at: time::epoch_seconds(now),
                };
                self.mark(now, &TraceEntry::Start);
                tracing::info!("trace started");
            }
            (true, true) => self.trace.started_at = time::epoch_seconds(now),
            (true, false) => {
                self.mark(now, &TraceEntry::Stop);
                self.trace.on = false;
                tracing::info!("trace stopped");
            }
            (false, false) => {}
        }
    }

    /// Stop tracing once the activation has run for a full day.
    pub fn check_trace(&mut self, now: Timestamp) {
        if self.trace.on
            && time::epoch_seconds(now) > self.trace.started_at + TRACE_MAX_MINUTES * 60
        {
            self.set_trace(false, now);
        }
    }

    /// Restart tracing on the hour if it is off.
    pub fn rearm_trace(&mut self, now: Timestamp) {
        if !self.trace.on {
            self.set_trace(true, now);
        }
    }

    /// Append the current readings to the temperature stream.
    pub fn record_temperature(&self, now: Timestamp) {
        if self.trace.on {
            let entry = TraceEntry::Temperature(self.readings());
            self.record(TraceKind::Temperature, now, &entry);
        }
    }

    pub(super) fn trace_state(&self, now: Timestamp, entry: &TraceEntry) {
        if self.trace.on {
            self.record(TraceKind::State, now, entry);
        }
    }

    fn mark(&self, now: Timestamp, entry: &TraceEntry) {
        self.record(TraceKind::State, now, entry);
        self.record(TraceKind::Temperature, now, entry);
    }

    fn record(&self, kind: TraceKind, now: Timestamp, entry: &TraceEntry) {
        if let Err(err) = self.sink.record(kind, now, entry) {
            tracing::warn!(error = %err, stream = kind.file_prefix(), "failed to write trace line");
        }
    }
}
