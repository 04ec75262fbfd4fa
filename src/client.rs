//! Transport collaborator interface.
//!
//! The IRC socket, wire parsing and reconnect logic live in the transport
//! layer. A session sees the transport as an [`IrcClient`] for outbound
//! commands and identity checks, plus two channels handed to
//! [`Session::run`](crate::Session::run): the parsed-message stream and the
//! connection-state stream.

use std::collections::HashMap;

/// Connection-state notification from the transport.
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    /// Whether the IRC connection is currently established.
    pub connected: bool,
    /// Terminal error for the last connection attempt, if any.
    pub error: Option<String>,
}

/// Outbound command surface and identity of one IRC connection.
///
/// Command methods are fire-and-forget; the transport queues the write.
pub trait IrcClient: Send + Sync {
    /// The IRC server host this connection is for.
    fn host(&self) -> &str;

    /// Whether `nick` is this session's own identity.
    fn is_self(&self, nick: &str) -> bool;

    /// Query a channel's topic.
    fn topic(&self, channel: &str);

    /// Request the network channel list.
    fn list(&self);

    /// The feature map advertised via RPL_ISUPPORT.
    fn features(&self) -> HashMap<String, serde_json::Value>;
}
