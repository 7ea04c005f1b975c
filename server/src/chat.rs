use chrono::Local;
use futures::future::join_all;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, warn};

use crate::config::NamePolicy;
use crate::error::SessionError;
use crate::log_sink::ChatLog;
use crate::messages::{self, Command, Notice, USERNAME_PROMPT};
use crate::registry::{Member, Registration, Registry};
use crate::session::{self, Session};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// The stream failed before the client ever picked a name.
    NeverNamed,
    /// The client sent the exit command.
    Exited,
    /// A read or write failed after the client was named.
    Disconnected,
}

/// The room: who is in it, how to reach them, and where messages are recorded.
pub struct ChatInstance {
    registry: Registry,
    log: ChatLog,
    policy: NamePolicy,
}

impl ChatInstance {
    pub fn new(registry: Registry, log: ChatLog, policy: NamePolicy) -> Self {
        Self {
            registry,
            log,
            policy,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Runs one client from accept to teardown.
    pub async fn handle_connection<S>(&self, stream: S, peer: impl Into<String>) -> Departure
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let session = Session::new(peer, reader, writer);
        self.handle_client_session(session).await
    }

    /// Delivers `message` to every current member, pruning any member that
    /// cannot be written to. Returns how many members received it.
    ///
    /// Writes go out concurrently, so a stalled peer costs at most one
    /// `WRITE_TIMEOUT` for the whole broadcast.
    pub async fn broadcast(&self, message: &str) -> usize {
        let line = messages::stamp(&Local::now(), message);
        let bytes = line.as_bytes();
        let members = self.registry.snapshot().await;

        let writes = members.iter().map(|(id, member)| async move {
            (id, member, session::write_to(&member.writer, bytes).await)
        });

        let mut delivered = 0;
        for (id, member, result) in join_all(writes).await {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        session = %id,
                        name = %member.name,
                        error = %e,
                        "Could not write to client, removing"
                    );
                    self.registry.remove(id).await;
                }
            }
        }

        if let Err(e) = self.log.append(message).await {
            error!(error = %e, "Failed to record message in chat log");
        }

        delivered
    }

    async fn handle_client_session<R>(&self, mut session: Session<R>) -> Departure
    where
        R: AsyncRead + Unpin,
    {
        info!(session = %session.id(), peer = %session.peer(), "Serving client");

        if let Err(e) = self.negotiate_name(&mut session).await {
            debug!(session = %session.id(), error = %e, "Client left before choosing a name");
            session.close().await;
            return Departure::NeverNamed;
        }

        let departure = self.listen_for_messages(&mut session).await;

        let name = session.name().unwrap_or_default().to_string();
        self.registry.remove(&session.id()).await;
        info!(session = %session.id(), name = %name, ?departure, "Client left");
        self.broadcast(&Notice::Left { name: name.as_str() }.to_string()).await;
        session.close().await;

        departure
    }

    async fn listen_for_messages<R>(&self, session: &mut Session<R>) -> Departure
    where
        R: AsyncRead + Unpin,
    {
        loop {
            let line = match session.read_line().await {
                Ok(line) => line,
                Err(e) => {
                    debug!(session = %session.id(), error = %e, "Could not read from client");
                    return Departure::Disconnected;
                }
            };

            // A broadcast that failed to reach this client already dropped it.
            if self.registry.lookup(&session.id()).await.is_none() {
                debug!(session = %session.id(), "Client was removed after a failed write");
                return Departure::Disconnected;
            }

            match Command::parse(&line) {
                Command::Empty => continue,
                Command::Exit => return Departure::Exited,
                Command::Rename => {
                    if let Err(e) = self.negotiate_name(session).await {
                        debug!(session = %session.id(), error = %e, "Lost client while renaming");
                        return Departure::Disconnected;
                    }
                }
                Command::Chat(text) => {
                    let name = session.name().unwrap_or_default();
                    self.broadcast(&Notice::Chat { name, text }.to_string()).await;
                }
            }
        }
    }

    /// Prompts until the client supplies an acceptable name, then records it
    /// and announces the entry or rename.
    async fn negotiate_name<R>(&self, session: &mut Session<R>) -> Result<(), SessionError>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            session.send(USERNAME_PROMPT).await?;
            let name = session.read_line().await?;

            if name.is_empty() && !self.policy.allow_empty {
                self.reject_name(session, &name, "name cannot be empty").await?;
                continue;
            }

            let member = Member::new(name.as_str(), session.writer());
            let unique = !self.policy.allow_duplicates;
            let notice = match self.registry.register(session.id(), member, unique).await {
                Registration::NameTaken => {
                    self.reject_name(session, &name, "name is already in use").await?;
                    continue;
                }
                Registration::Renamed { old } => {
                    info!(session = %session.id(), old = %old, new = %name, "Client renamed");
                    Notice::Renamed { old: old.as_str(), new: name.as_str() }.to_string()
                }
                Registration::Entered => {
                    info!(session = %session.id(), name = %name, "Client entered");
                    Notice::Entered { name: name.as_str() }.to_string()
                }
            };
            session.set_name(name);
            self.broadcast(&notice).await;

            return Ok(());
        }
    }

    async fn reject_name<R>(
        &self,
        session: &Session<R>,
        name: &str,
        reason: &str,
    ) -> Result<(), SessionError>
    where
        R: AsyncRead + Unpin,
    {
        warn!(session = %session.id(), name = %name, reason, "Rejected username");
        session.send(&format!("Username rejected: {}\n", reason)).await
    }
}
