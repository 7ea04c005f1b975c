use std::io;
use std::path::Path;

use chrono::Local;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::error;

const LOG_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Append-only record of everything broadcast to the room.
///
/// Writers are serialized so concurrent broadcasts never interleave partial
/// lines.
pub struct ChatLog {
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl ChatLog {
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self::from_writer(file))
    }

    /// Opens `path`, or logs the failure and returns a discarding log.
    pub async fn open_or_discard(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::open(path).await {
            Ok(log) => log,
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "Could not open chat log, messages will not be recorded"
                );
                Self::discard()
            }
        }
    }

    pub fn discard() -> Self {
        Self::from_writer(tokio::io::sink())
    }

    pub fn from_writer<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub async fn append(&self, message: &str) -> io::Result<()> {
        let line = format!("{} {}\n", Local::now().format(LOG_TIMESTAMP_FORMAT), message);
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await
    }
}
