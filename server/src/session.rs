//! One connected client: its identity, display name and transport.
//!
//! A `Session` owns the read half of the transport outright. The write half
//! lives behind a `SessionWriter` so the broadcast engine can write to the
//! same peer through the registry.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio::time::timeout;
use uuid::Uuid;

use crate::error::SessionError;

pub type SessionId = Uuid;

/// Shared write half of a client transport.
pub type SessionWriter = Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;

/// Upper bound on a single write to a peer.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted, no name yet. Not in the registry.
    Connected,
    Named,
    /// Transport closed. Final.
    Terminated,
}

pub fn shared_writer<W>(writer: W) -> SessionWriter
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    Arc::new(Mutex::new(Box::new(writer)))
}

/// Writes all of `bytes` to a peer and flushes, bounded by `WRITE_TIMEOUT`.
pub async fn write_to(writer: &SessionWriter, bytes: &[u8]) -> Result<(), SessionError> {
    let write = async {
        let mut writer = writer.lock().await;
        writer.write_all(bytes).await?;
        writer.flush().await?;
        Ok::<_, SessionError>(())
    };

    timeout(WRITE_TIMEOUT, write)
        .await
        .map_err(|_| SessionError::WriteTimeout)?
}

pub struct Session<R> {
    id: SessionId,
    peer: String,
    reader: BufReader<R>,
    writer: SessionWriter,
    name: Option<String>,
    state: SessionState,
    line_buffer: String,
}

impl<R> Session<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new<W>(peer: impl Into<String>, reader: R, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            peer: peer.into(),
            reader: BufReader::new(reader),
            writer: shared_writer(writer),
            name: None,
            state: SessionState::Connected,
            line_buffer: String::with_capacity(1000),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Display name, once negotiation has succeeded at least once.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn writer(&self) -> SessionWriter {
        Arc::clone(&self.writer)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
        self.state = SessionState::Named;
    }

    /// Reads one newline-terminated line and returns it trimmed.
    ///
    /// End of stream, including a final line with no newline, is reported as
    /// `SessionError::Disconnected`.
    pub async fn read_line(&mut self) -> Result<String, SessionError> {
        self.line_buffer.clear();
        match self.reader.read_line(&mut self.line_buffer).await? {
            0 => Err(SessionError::Disconnected),
            _ if !self.line_buffer.ends_with('\n') => Err(SessionError::Disconnected),
            _ => Ok(self.line_buffer.trim().to_string()),
        }
    }

    /// Writes raw text to this client only.
    pub async fn send(&self, text: &str) -> Result<(), SessionError> {
        write_to(&self.writer, text.as_bytes()).await
    }

    /// Shuts the transport down. Only the first call does anything.
    pub async fn close(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }
        self.state = SessionState::Terminated;

        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
    }
}
