//! # terrarium-adapter-virtual
//!
//! Simulated hardware for running the controller on a development machine.
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`VirtualPins`] | `OutputPort` | Remembers the last level written to each pin |
//! | [`VirtualProbes`] | `SensorPort` | Returns readings set by the operator |
//!
//! ## Dependency rule
//!
//! Depends on `terrarium-app` (port traits) and `terrarium-domain` only.

mod pins;
mod probes;

pub use pins::VirtualPins;
pub use probes::VirtualProbes;
