//! Daily trace files: one append-only file per stream and day.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use terrarium_app::ports::{TraceArchive, TraceSink};
use terrarium_domain::error::{NotFoundError, TerrariumError};
use terrarium_domain::time::Timestamp;
use terrarium_domain::trace::{self, TraceEntry, TraceKind};

use crate::fs::io_error;

/// [`TraceSink`] and [`TraceArchive`] over one directory.
pub struct TraceDirectory {
    dir: PathBuf,
}

impl TraceDirectory {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TraceSink for TraceDirectory {
    fn record(
        &self,
        kind: TraceKind,
        at: Timestamp,
        entry: &TraceEntry,
    ) -> Result<(), TerrariumError> {
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let path = self.dir.join(kind.file_name(at));
        let line = format!("{} {entry}\n", at.format("%Y-%m-%d %H:%M:%S"));
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(io_error(&path))?;
        Ok(())
    }
}

impl TraceArchive for TraceDirectory {
    fn list(&self, kind: TraceKind) -> Result<Vec<String>, TerrariumError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error(&self.dir)(err).into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_error(&self.dir))?;
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str().filter(|n| kind.owns(n)) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<String, TerrariumError> {
        trace::validate_file_name(name)?;
        let path = self.dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(NotFoundError {
                entity: "Trace file",
                id: name.to_string(),
            }
            .into()),
            Err(err) => Err(io_error(&path)(err).into()),
        }
    }
}
