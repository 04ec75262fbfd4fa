//! Storage collaborator interface.
//!
//! The gateway persists nothing itself; durable state lives behind [`Store`].
//! Every call fired from a session is best-effort: failures are not retried
//! and never surface to the session (accepted data loss on storage failure).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no item found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A channel membership persisted for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub server: String,
    pub name: String,
}

/// A stored IRC server record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    pub host: String,
    pub name: String,
}

/// A logged chat message.
#[derive(Debug, Clone, Serialize)]
pub struct StoredMessage {
    pub id: String,
    pub server: String,
    pub from: String,
    pub to: String,
    pub content: String,
    pub time: DateTime<Utc>,
}

/// Asynchronous, best-effort persistence operations consumed by sessions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Log a channel event (join, part, quit, nick, topic) against one or
    /// more channels.
    async fn log_event(
        &self,
        server: &str,
        kind: &str,
        actors: Vec<String>,
        channels: Vec<String>,
    ) -> Result<(), StoreError>;

    /// Log a chat message.
    async fn log_message(&self, message: StoredMessage) -> Result<(), StoreError>;

    /// Fetch the most recent `count` messages for a channel, oldest first.
    async fn get_messages(
        &self,
        server: &str,
        channel: &str,
        count: usize,
    ) -> Result<Vec<StoredMessage>, StoreError>;

    /// Persist a new channel membership.
    async fn add_channel(&self, channel: Channel) -> Result<(), StoreError>;

    /// Remove a stored channel membership.
    async fn remove_channel(&self, server: &str, channel: &str) -> Result<(), StoreError>;

    /// Persist the session's current nick.
    async fn set_nick(&self, nick: &str, server: &str) -> Result<(), StoreError>;

    /// Set the human-readable network name of a stored server.
    async fn set_server_name(&self, name: &str, server: &str) -> Result<(), StoreError>;

    /// Look up a stored server record by host.
    async fn get_server(&self, server: &str) -> Result<Server, StoreError>;

    /// Register an open direct-message conversation with `nick`.
    async fn add_open_dm(&self, server: &str, nick: &str) -> Result<(), StoreError>;
}
