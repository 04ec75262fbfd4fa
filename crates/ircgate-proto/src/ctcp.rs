//! CTCP (Client-to-Client Protocol) decoding.
//!
//! CTCP payloads ride inside PRIVMSG/NOTICE bodies between `\x01`
//! delimiters. The gateway only acts on ACTION and DCC; everything else is
//! surfaced as [`CtcpKind::Unknown`] so the caller can drop it.

use std::fmt;

/// The CTCP delimiter character.
pub const CTCP_DELIM: char = '\x01';

/// Known CTCP command types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CtcpKind {
    /// ACTION - `/me`-style text, treated as an ordinary message.
    Action,
    /// DCC - direct client-to-client negotiation (file offers).
    Dcc,
    /// Any other CTCP command.
    Unknown(String),
}

impl CtcpKind {
    /// Parse a CTCP command name.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ACTION" => Self::Action,
            "DCC" => Self::Dcc,
            _ => Self::Unknown(name.to_owned()),
        }
    }

    /// Canonical uppercase name of this command.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Action => "ACTION",
            Self::Dcc => "DCC",
            Self::Unknown(s) => s,
        }
    }
}

impl fmt::Display for CtcpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded CTCP payload, borrowing from the message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// The CTCP command type.
    pub kind: CtcpKind,
    /// Parameters following the command, if any.
    pub params: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// Decode a PRIVMSG/NOTICE body as CTCP.
    ///
    /// Returns `None` when the body is not delimited CTCP or names no
    /// command.
    pub fn parse(text: &'a str) -> Option<Self> {
        let inner = text.strip_prefix(CTCP_DELIM)?;
        let inner = inner.strip_suffix(CTCP_DELIM).unwrap_or(inner);

        let mut parts = inner.splitn(2, ' ');
        let name = parts.next().filter(|n| !n.is_empty())?;
        let params = parts.next().filter(|p| !p.is_empty());

        Some(Self {
            kind: CtcpKind::parse(name),
            params,
        })
    }
}
