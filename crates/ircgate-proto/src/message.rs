//! The parsed IRC message handed to the session engine.

use crate::command::CommandKind;
use crate::ctcp::Ctcp;

/// A parsed protocol message.
///
/// `channels` and `names` are attached by the transport's connection state
/// tracker for the commands that need them: NICK and QUIT carry the channels
/// the sender was known to share with us, RPL_ENDOFNAMES carries the
/// membership collected from the preceding NAMES replies. For every other
/// command they are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Raw prefix (`nick!user@host` for users, bare server name otherwise).
    pub prefix: Option<String>,
    /// The command identifier, verbatim ("PRIVMSG", "001", ...).
    pub command: String,
    /// Ordered parameters, trailing parameter included last.
    pub params: Vec<String>,
    /// Shared channels attached by the transport (NICK/QUIT).
    pub channels: Vec<String>,
    /// Channel membership attached by the transport (RPL_ENDOFNAMES).
    pub names: Vec<String>,
}

impl Message {
    /// Build a message from a command and parameters.
    pub fn new<C, P>(command: C, params: Vec<P>) -> Self
    where
        C: Into<String>,
        P: Into<String>,
    {
        Self {
            prefix: None,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
            channels: Vec::new(),
            names: Vec::new(),
        }
    }

    /// Attach a sender prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Attach the shared-channel context (NICK/QUIT).
    pub fn with_channels<P: Into<String>>(mut self, channels: Vec<P>) -> Self {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    /// Attach the collected membership (RPL_ENDOFNAMES).
    pub fn with_names<P: Into<String>>(mut self, names: Vec<P>) -> Self {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// The sending nick, or the bare server name for server messages.
    pub fn sender(&self) -> &str {
        match &self.prefix {
            Some(prefix) => prefix.split('!').next().unwrap_or(prefix),
            None => "",
        }
    }

    /// The last parameter, or `""` when there are none.
    pub fn last_param(&self) -> &str {
        self.params.last().map_or("", String::as_str)
    }

    /// Whether this message originates from the server rather than a user.
    ///
    /// Server prefixes never carry a `!user@host` part.
    pub fn is_from_server(&self) -> bool {
        match &self.prefix {
            Some(prefix) => !prefix.contains('!'),
            None => true,
        }
    }

    /// Classify the command for dispatch.
    pub fn kind(&self) -> CommandKind {
        CommandKind::of(&self.command)
    }

    /// Decode the trailing parameter as a CTCP payload, if it is one.
    pub fn ctcp(&self) -> Option<Ctcp<'_>> {
        Ctcp::parse(self.last_param())
    }
}
