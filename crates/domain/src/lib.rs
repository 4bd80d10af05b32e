//! # terrarium-domain
//!
//! Pure domain model for the terrarium climate controller.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, wall-clock helpers, time of day
//! - Define **Devices** (the static actuator catalog) and their **Device State**
//! - Define **Timers** (on/off windows and on+duration windows)
//! - Define **Rulesets** (thermostatic rules with fixed action lists) and the
//!   **Sprayer rule** (delayed chained actions)
//! - Define the persisted **Settings** snapshot and its factory defaults
//! - Contain all invariant enforcement and pure decision logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod device;
pub mod rules;
pub mod sensor;
pub mod settings;
pub mod timer;
pub mod trace;
