//! Request and response envelopes as they travel over the command link.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// An inbound request: `{ "msgId", "cmd", "data" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "msgId", default, skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<Uuid>,
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Command {
    /// A request with a fresh message id.
    #[must_use]
    pub fn new(cmd: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            msg_id: Some(Uuid::new_v4()),
            cmd: cmd.into(),
            data,
        }
    }
}

/// An outbound reply: `{ "msgId", "command", "response" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "msgId")]
    pub msg_id: Uuid,
    pub command: String,
    pub response: Option<Value>,
}

impl Response {
    /// Reply to `command` with an optional body. The request's message id is
    /// echoed, or a new one issued when the request carried none.
    #[must_use]
    pub fn success(command: &Command, body: Option<Value>) -> Self {
        Self {
            msg_id: command.msg_id.unwrap_or_else(Uuid::new_v4),
            command: command.cmd.clone(),
            response: body,
        }
    }

    /// Reply with `{"error": message}`.
    #[must_use]
    pub fn failure(msg_id: Option<Uuid>, command: impl Into<String>, error: impl fmt::Display) -> Self {
        let mut body = serde_json::Map::new();
        body.insert("error".to_string(), Value::String(error.to_string()));
        Self {
            msg_id: msg_id.unwrap_or_else(Uuid::new_v4),
            command: command.into(),
            response: Some(Value::Object(body)),
        }
    }

    /// The error message, when this is an error reply.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
    }
}

/// Executes commands; implemented by [`CommandService`](super::CommandService)
/// and consumed by transport adapters.
pub trait CommandHandler: Send + Sync {
    fn handle(&self, command: Command) -> Response;
}

impl<T: CommandHandler> CommandHandler for Arc<T> {
    fn handle(&self, command: Command) -> Response {
        (**self).handle(command)
    }
}
