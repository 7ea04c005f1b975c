//! Error types for the chat relay.
//!
//! Failures are split by who has to deal with them: a `SessionError` ends
//! one connection and nothing else, a `ServerError` is fatal at startup, and a
//! `ConfigError` is always recovered from by falling back to defaults.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a single session stopped being able to talk to its peer.
///
/// Every variant is handled as a disconnect by the session handler.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The peer closed the stream, or closed it halfway through a line.
    #[error("peer disconnected")]
    Disconnected,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A write did not complete within the write timeout.
    #[error("write timed out")]
    WriteTimeout,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
