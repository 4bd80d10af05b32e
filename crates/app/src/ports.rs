//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the control core and the outside world.
//! They are defined here (in `app`) so that both the core and the adapter
//! layer can depend on them without creating circular dependencies.
//!
//! Every port is synchronous: the control loop calls them while holding the
//! state lock and must never suspend mid-tick.

pub mod hardware;
pub mod storage;
pub mod trace;

pub use hardware::{OutputPort, SensorPort};
pub use storage::{LifecycleRepository, SettingsRepository};
pub use trace::{TraceArchive, TraceSink};
