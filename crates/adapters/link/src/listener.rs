//! TCP listener accepting command link clients.

use std::net::SocketAddr;
use std::sync::Arc;

use terrarium_app::command::CommandHandler;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::Instrument;

use crate::connection::serve_connection;
use crate::error::LinkError;

/// A bound command link endpoint.
pub struct LinkListener {
    listener: TcpListener,
}

impl LinkListener {
    /// Bind to `addr` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Bind`] when the address is unavailable.
    pub async fn bind(addr: &str) -> Result<Self, LinkError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| LinkError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self { listener })
    }

    /// The address actually bound, useful with port `0`.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the socket has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr, LinkError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept clients until `shutdown` changes. Each client is served on its
    /// own task; a failing client never stops the listener.
    pub async fn serve<H>(self, handler: Arc<H>, mut shutdown: watch::Receiver<bool>)
    where
        H: CommandHandler + 'static,
    {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "command link listening");
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let handler = Arc::clone(&handler);
                        let span = tracing::info_span!("link", %peer);
                        tokio::spawn(
                            async move {
                                tracing::info!("client connected");
                                match serve_connection(stream, handler).await {
                                    Ok(()) => tracing::info!("client disconnected"),
                                    Err(err) => tracing::warn!(error = %err, "client dropped"),
                                }
                            }
                            .instrument(span),
                        );
                    }
                    Err(err) => tracing::warn!(error = %err, "accept failed"),
                },
                _ = shutdown.changed() => break,
            }
        }
        tracing::info!("command link stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use terrarium_app::command::{Command, Response};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;

    use crate::connection::ETX;

    struct Pong;

    impl CommandHandler for Pong {
        fn handle(&self, command: Command) -> Response {
            Response::success(&command, None)
        }
    }

    #[tokio::test]
    async fn should_serve_tcp_clients_until_shutdown() {
        let listener = LinkListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = watch::channel(false);
        let server = tokio::spawn(listener.serve(Arc::new(Pong), rx));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read, mut write) = stream.into_split();
        write
            .write_all(b"{\"msgId\":\"67e55044-10b1-426f-9247-bb680e5fe0c8\",\"cmd\":\"setTraceOn\"}\x03")
            .await
            .unwrap();
        let mut reader = BufReader::new(read);
        let mut buf = Vec::new();
        reader.read_until(ETX, &mut buf).await.unwrap();
        buf.pop();
        let response: Response = serde_json::from_slice(&buf).unwrap();
        assert_eq!(response.command, "setTraceOn");
        assert_eq!(
            response.msg_id.to_string(),
            "67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
        assert!(response.response.is_none());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), server)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn should_report_address_in_use() {
        let first = LinkListener::bind("127.0.0.1:0").await.unwrap();
        let addr = first.local_addr().unwrap().to_string();
        let err = LinkListener::bind(&addr).await.err().unwrap();
        assert!(matches!(err, LinkError::Bind { .. }));
    }
}
