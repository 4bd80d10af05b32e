//! # terrarium-adapter-link
//!
//! Command link: the byte-stream transport in front of the command handler.
//!
//! ## Wire format
//!
//! Every request and every response is one JSON document terminated by a
//! single ASCII ETX byte (`0x03`). Requests look like
//! `{"msgId": "...", "cmd": "getState", "data": {...}}`; responses like
//! `{"msgId": "...", "command": "getState", "response": {...}}`.
//!
//! ## Responsibilities
//! - Accept TCP clients (a serial bridge or a test client)
//! - Split the stream into ETX frames and decode the request envelope
//! - Run the handler off the async runtime and write the framed reply
//! - Keep a connection alive when one request is malformed or its handler
//!   panics
//!
//! ## Dependency rule
//! Depends on `terrarium-app` only, for the envelope types and the
//! [`CommandHandler`](terrarium_app::command::CommandHandler) trait.

mod connection;
mod error;
mod listener;

pub use connection::{ETX, MAX_FRAME_BYTES, serve_connection};
pub use error::LinkError;
pub use listener::LinkListener;
