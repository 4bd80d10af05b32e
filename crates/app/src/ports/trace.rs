//! Trace ports: append-only trace streams and their archive.

use std::sync::Arc;

use terrarium_domain::error::TerrariumError;
use terrarium_domain::time::Timestamp;
use terrarium_domain::trace::{TraceEntry, TraceKind};

/// Appends trace lines.
pub trait TraceSink: Send + Sync {
    /// Append `entry` to the `kind` stream, stamped with `at`.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the line cannot be written.
    fn record(
        &self,
        kind: TraceKind,
        at: Timestamp,
        entry: &TraceEntry,
    ) -> Result<(), TerrariumError>;
}

impl<T: TraceSink> TraceSink for Arc<T> {
    fn record(
        &self,
        kind: TraceKind,
        at: Timestamp,
        entry: &TraceEntry,
    ) -> Result<(), TerrariumError> {
        (**self).record(kind, at, entry)
    }
}

/// Reads back recorded trace files.
pub trait TraceArchive: Send + Sync {
    /// Names of every file of the `kind` stream, sorted.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the archive cannot be listed.
    fn list(&self, kind: TraceKind) -> Result<Vec<String>, TerrariumError>;

    /// Full content of one trace file.
    ///
    /// # Errors
    ///
    /// Returns a validation error for names that are not plain file names,
    /// not-found when the file does not exist, or a storage error.
    fn read(&self, name: &str) -> Result<String, TerrariumError>;
}

impl<T: TraceArchive> TraceArchive for Arc<T> {
    fn list(&self, kind: TraceKind) -> Result<Vec<String>, TerrariumError> {
        (**self).list(kind)
    }

    fn read(&self, name: &str) -> Result<String, TerrariumError> {
        (**self).read(name)
    }
}
