//! # terrarium-app
//!
//! Application layer: the control core and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `OutputPort`: drive one output pin high or low
//!   - `SensorPort`: read room and terrarium temperature
//!   - `TraceSink` / `TraceArchive`: append and read back trace files
//!   - `SettingsRepository`: load & save the settings snapshot
//!   - `LifecycleRepository`: load & save wear counters
//! - Own the **control state aggregate** (`Controller`) and the engines that
//!   mutate it: expiry sweep, timers, sprayer delay, rules, wear, trace
//! - Serialize access between the control loop and command handlers
//!   (`SharedController`)
//! - Drive the engines from wall-clock boundaries (`TickDriver`, `ControlLoop`)
//! - Parse, validate and execute remote commands (`CommandService`)
//!
//! ## Dependency rule
//! Depends on `terrarium-domain` only (plus `tokio::sync`/`tokio::time` for the
//! loop driver). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod command;
pub mod control_loop;
pub mod controller;
pub mod ports;
pub mod shared;
pub mod tick;

#[cfg(test)]
pub(crate) mod testing;
