//! One client connection: frame splitting and request dispatch.

use std::sync::Arc;

use terrarium_app::command::{Command, CommandHandler, Response};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::LinkError;

/// Frame terminator (ASCII end-of-text).
pub const ETX: u8 = 0x03;

/// Longest accepted request, terminator included.
pub const MAX_FRAME_BYTES: usize = 64 * 1024;

/// Serve requests from `stream` until the peer closes it.
///
/// # Errors
///
/// Returns an IO error when the stream breaks, or
/// [`LinkError::FrameTooLarge`] when a request exceeds [`MAX_FRAME_BYTES`].
pub async fn serve_connection<S, H>(stream: S, handler: Arc<H>) -> Result<(), LinkError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: CommandHandler + 'static,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut frame = Vec::new();
    loop {
        frame.clear();
        let read = (&mut reader)
            .take(MAX_FRAME_BYTES as u64)
            .read_until(ETX, &mut frame)
            .await?;
        if read == 0 {
            return Ok(());
        }
        if frame.last() != Some(&ETX) {
            if frame.len() >= MAX_FRAME_BYTES {
                return Err(LinkError::FrameTooLarge(MAX_FRAME_BYTES));
            }
            tracing::debug!(bytes = frame.len(), "discarding unterminated trailing frame");
            return Ok(());
        }
        frame.pop();
        if frame.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let response = dispatch(&handler, &frame).await;
        let mut out = serde_json::to_vec(&response)?;
        out.push(ETX);
        writer.write_all(&out).await?;
        writer.flush().await?;
    }
}

async fn dispatch<H: CommandHandler + 'static>(handler: &Arc<H>, frame: &[u8]) -> Response {
    let command: Command = match serde_json::from_slice(frame) {
        Ok(command) => command,
        Err(err) => {
            tracing::warn!(error = %err, "malformed request frame");
            return Response::failure(None, "", format!("Malformed request: {err}"));
        }
    };
    let msg_id = command.msg_id;
    let cmd = command.cmd.clone();
    let handler = Arc::clone(handler);
    match tokio::task::spawn_blocking(move || handler.handle(command)).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(cmd = %cmd, error = %err, "command handler failed");
            Response::failure(msg_id, cmd, "Internal error.")
        }
    }
}
