//! Link adapter error types.

/// Errors specific to the command link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The listener could not be bound.
    #[error("failed to bind command link on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to a client failed.
    #[error("command link io error")]
    Io(#[from] std::io::Error),

    /// A response could not be encoded.
    #[error("failed to encode response")]
    Encode(#[from] serde_json::Error),

    /// A client sent more than the frame limit without a terminator.
    #[error("frame exceeds {0} bytes without terminator")]
    FrameTooLarge(usize),
}
