//! Command surface: remote requests against the controller.
//!
//! A [`Command`] envelope is parsed into a typed [`Request`], validated, and
//! executed by [`CommandService`] against the shared controller. Every
//! outcome, including parse and validation failures, becomes a
//! [`Response`] carrying either a JSON body or `{"error": message}`.

mod envelope;
mod reports;
mod request;
mod service;

pub use envelope::{Command, CommandHandler, Response};
pub use reports::{DeviceProperties, DeviceReport, Properties, SensorReport, SensorValue, StateReport};
pub use request::Request;
pub use service::CommandService;
