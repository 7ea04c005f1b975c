use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::session::{SessionId, SessionWriter};

/// A registry entry: everything the broadcast engine needs to reach a client.
#[derive(Clone)]
pub struct Member {
    pub name: String,
    pub writer: SessionWriter,
}

impl Member {
    pub fn new(name: impl Into<String>, writer: SessionWriter) -> Self {
        Self {
            name: name.into(),
            writer,
        }
    }
}

/// Outcome of `Registry::register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Entered,
    Renamed { old: String },
    /// Another member already uses the name; nothing was changed.
    NameTaken,
}

/// Live clients keyed by session id.
///
/// Cloning is cheap and every clone shares the same map. No method holds the
/// lock across network I/O; callers that write to members work from a
/// `snapshot`.
#[derive(Clone, Default)]
pub struct Registry {
    members: Arc<RwLock<HashMap<SessionId, Member>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `id`.
    pub async fn add(&self, id: SessionId, member: Member) {
        let mut members = self.members.write().await;
        members.insert(id, member);
    }

    /// Removes `id` if present. Returns whether anything was removed.
    pub async fn remove(&self, id: &SessionId) -> bool {
        let mut members = self.members.write().await;
        members.remove(id).is_some()
    }

    pub async fn lookup(&self, id: &SessionId) -> Option<String> {
        let members = self.members.read().await;
        members.get(id).map(|member| member.name.clone())
    }

    /// Point-in-time copy of the membership, safe to iterate while writing.
    pub async fn snapshot(&self) -> Vec<(SessionId, Member)> {
        let members = self.members.read().await;
        members
            .iter()
            .map(|(id, member)| (*id, member.clone()))
            .collect()
    }

    /// Upserts `member` under `id` and reports whether this was an entry or a
    /// rename. With `unique_names`, a name held by another member is refused.
    /// The check and the insert happen under one write lock.
    pub async fn register(
        &self,
        id: SessionId,
        member: Member,
        unique_names: bool,
    ) -> Registration {
        let mut members = self.members.write().await;

        if unique_names
            && members
                .iter()
                .any(|(other, existing)| *other != id && existing.name == member.name)
        {
            return Registration::NameTaken;
        }

        match members.insert(id, member) {
            Some(previous) => Registration::Renamed { old: previous.name },
            None => Registration::Entered,
        }
    }

    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }
}
