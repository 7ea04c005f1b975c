//! Single-room line-oriented chat relay.
//!
//! Clients connect over TCP, pick a display name, and every line they send is
//! fanned out to everyone else in the room.
//!
//! - `registry` - live members keyed by session id
//! - `chat` - broadcast engine and per-connection session handler
//! - `server` - TCP accept loop
//! - `config`, `log_sink` - JSON settings and the append-only chat log

pub mod chat;
pub mod config;
pub mod error;
pub mod log_sink;
pub mod messages;
pub mod registry;
pub mod server;
pub mod session;

pub use chat::{ChatInstance, Departure};
pub use config::{Config, NamePolicy};
pub use error::{ConfigError, ServerError, SessionError};
pub use log_sink::ChatLog;
pub use registry::{Member, Registration, Registry};
pub use server::Server;
pub use session::{Session, SessionId, SessionState};
