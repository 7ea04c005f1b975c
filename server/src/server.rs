use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::chat::ChatInstance;
use crate::error::ServerError;

/// Accepts TCP clients and hands each one to the chat room on its own task.
pub struct Server {
    listener: TcpListener,
    chat: Arc<ChatInstance>,
}

impl Server {
    pub async fn bind(addr: &str, chat: Arc<ChatInstance>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        Ok(Self { listener, chat })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop. Accept errors are logged and skipped; this only returns
    /// when the future is dropped.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!(peer = %addr, "New client connected");
                    let chat = Arc::clone(&self.chat);
                    tokio::spawn(async move {
                        let departure = chat.handle_connection(stream, addr.to_string()).await;
                        info!(peer = %addr, ?departure, "Connection closed");
                    });
                }
                Err(e) => {
                    error!(error = %e, "Error accepting connection");
                }
            }
        }
    }
}
