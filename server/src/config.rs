use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_LISTEN_ADDRESS: &str = "localhost";
pub const DEFAULT_LISTEN_PORT: u16 = 9000;
pub const DEFAULT_LOG_FILE_PATH: &str = "chat.log";

/// Server settings read from a JSON file.
///
/// Every key is optional; anything absent takes its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub listen_address: String,
    pub listen_port: u16,
    pub log_file_path: PathBuf,
    pub name_policy: NamePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            listen_port: DEFAULT_LISTEN_PORT,
            log_file_path: PathBuf::from(DEFAULT_LOG_FILE_PATH),
            name_policy: NamePolicy::default(),
        }
    }
}

/// Which display names a client may pick.
///
/// Both checks are off by default, so any trimmed line (even an empty one)
/// becomes the client's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NamePolicy {
    pub allow_empty: bool,
    pub allow_duplicates: bool,
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self {
            allow_empty: true,
            allow_duplicates: true,
        }
    }
}

impl Config {
    /// Loads the config, falling back to defaults if the file is missing or
    /// malformed. Never fails.
    pub fn load(path: impl AsRef<Path>) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `host:port` string handed to the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_address, self.listen_port)
    }
}
