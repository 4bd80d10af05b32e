//! # terrarium-adapter-storage-fs
//!
//! Plain-file persistence for the control core.
//!
//! ## Responsibilities
//! - [`SettingsFile`]: the settings snapshot as one JSON document
//! - [`LifecycleFile`]: wear counters as `device=hours` lines
//! - [`TraceDirectory`]: daily `state_YYYYMMDD` / `temp_YYYYMMDD` trace files
//!
//! Snapshots are written to a sibling temporary file and renamed into
//! place, so a crash mid-write leaves the previous snapshot intact.
//!
//! ## Dependency rule
//! Depends on `terrarium-app` (for port traits) and `terrarium-domain` (for
//! domain types). The `app` and `domain` crates must never reference this
//! adapter.

mod error;
mod fs;
mod lifecycle;
mod settings;
mod trace;

pub use error::StorageError;
pub use lifecycle::LifecycleFile;
pub use settings::SettingsFile;
pub use trace::TraceDirectory;
