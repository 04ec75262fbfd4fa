//! Normalized events delivered to the browser transport.
//!
//! Every variant of [`Event`] corresponds to one named event on the wire;
//! [`Event::name`] yields the wire name and the payload serializes to the
//! JSON body. Buffered protocol sequences (WHOIS, MOTD, LIST) emit exactly
//! one event per completed sequence.

use std::collections::HashMap;

use ircgate_proto::ModeChange;
use serde::Serialize;

use crate::storage::StoredMessage;

/// A normalized, UI-ready event.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Event {
    /// A nick change, or the session's own nick being established.
    Nick(NickChange),
    /// A user joined one or more channels.
    Join(Join),
    /// A user left a channel.
    Part(Part),
    /// A parsed mode change.
    Mode(Mode),
    /// A channel message.
    Message(MessageEvent),
    /// A private message, including server informational lines and DCC
    /// status lines from the synthetic `@dcc` sender.
    Pm(MessageEvent),
    /// A user quit the network.
    Quit(Quit),
    /// The server's advertised feature set.
    Features(Features),
    /// A completed WHOIS reply.
    Whois(WhoisReply),
    /// A channel topic; `nick` is set only for live topic changes.
    Topic(Topic),
    /// Full channel membership after end-of-NAMES.
    Users(Userlist),
    /// A completed MOTD.
    Motd(Motd),
    /// The requested nickname was rejected as erroneous.
    NickFail(NickFail),
    /// The server forwarded a join to another channel.
    ChannelForward(ChannelForward),
    /// A protocol-level error reported by the server.
    Error(IrcError),
    /// A DCC file offer awaiting the user's decision.
    DccOffer(DccOffer),
    /// IRC connection state changed.
    ConnectionUpdate(ConnectionUpdate),
    /// Replayed message history for a just-joined channel.
    MessageReplay(MessageReplay),
}

impl Event {
    /// The wire name this event is delivered under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nick(_) => "nick",
            Self::Join(_) => "join",
            Self::Part(_) => "part",
            Self::Mode(_) => "mode",
            Self::Message(_) => "message",
            Self::Pm(_) => "pm",
            Self::Quit(_) => "quit",
            Self::Features(_) => "features",
            Self::Whois(_) => "whois",
            Self::Topic(_) => "topic",
            Self::Users(_) => "users",
            Self::Motd(_) => "motd",
            Self::NickFail(_) => "nick_fail",
            Self::ChannelForward(_) => "channel_forward",
            Self::Error(_) => "error",
            Self::DccOffer(_) => "dcc_send",
            Self::ConnectionUpdate(_) => "connection_update",
            Self::MessageReplay(_) => "messages",
        }
    }

    /// The JSON payload delivered with the event.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Downstream consumer of normalized events.
///
/// Delivery is fire-and-forget with no acknowledgment; implementations queue
/// internally and must preserve per-session ordering.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn send(&self, event: Event);
}

#[derive(Debug, Clone, Serialize)]
pub struct NickChange {
    pub server: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Join {
    pub server: String,
    pub user: String,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub server: String,
    pub user: String,
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Mode {
    pub server: String,
    #[serde(flatten)]
    pub change: ModeChangePayload,
}

/// Serializable projection of [`ModeChange`].
#[derive(Debug, Clone, Serialize)]
pub struct ModeChangePayload {
    pub target: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    pub add: String,
    pub remove: String,
}

impl From<ModeChange> for ModeChangePayload {
    fn from(change: ModeChange) -> Self {
        Self {
            target: change.target,
            user: change.user,
            add: change.add,
            remove: change.remove,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub server: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Quit {
    pub server: String,
    pub user: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Features {
    pub server: String,
    pub features: HashMap<String, serde_json::Value>,
}

/// WHOIS reply, accumulated across the multi-message sequence.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WhoisReply {
    pub nick: String,
    pub username: String,
    pub host: String,
    pub realname: String,
    pub server: String,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    pub server: String,
    pub channel: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub topic: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nick: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Userlist {
    pub server: String,
    pub channel: String,
    pub users: Vec<String>,
}

/// MOTD, accumulated across the start/line/end sequence.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Motd {
    pub server: String,
    pub title: String,
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NickFail {
    pub server: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelForward {
    pub server: String,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IrcError {
    pub server: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DccOffer {
    pub server: String,
    pub from: String,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionUpdate {
    pub server: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageReplay {
    pub server: String,
    pub to: String,
    pub messages: Vec<StoredMessage>,
}
