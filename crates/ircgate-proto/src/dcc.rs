//! DCC SEND offer parsing.
//!
//! A file offer arrives as a CTCP payload of the form
//! `SEND <filename> <ip> <port> [<length>]`, where `<ip>` is the sender's
//! IPv4 address as a decimal integer and `<filename>` may be double-quoted
//! when it contains spaces.

use std::net::Ipv4Addr;

use crate::ctcp::{Ctcp, CtcpKind};

/// A parsed DCC SEND offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DccSend {
    /// Offered file name, quotes stripped.
    pub file: String,
    /// Sender address to connect to.
    pub ip: Ipv4Addr,
    /// Sender port to connect to.
    pub port: u16,
    /// Advertised file length in bytes; 0 when not announced.
    pub length: u64,
}

impl DccSend {
    /// Parse a DCC SEND offer out of a decoded CTCP payload.
    ///
    /// Returns `None` unless the payload is a well-formed SEND with a
    /// resolvable address and port.
    pub fn parse(ctcp: &Ctcp<'_>) -> Option<Self> {
        if ctcp.kind != CtcpKind::Dcc {
            return None;
        }

        let params = ctcp.params?;
        let rest = params.strip_prefix("SEND")?.trim_start();

        let (file, rest) = split_filename(rest)?;
        let mut fields = rest.split_ascii_whitespace();

        let ip = Ipv4Addr::from(fields.next()?.parse::<u32>().ok()?);
        let port = fields.next()?.parse::<u16>().ok()?;
        let length = fields
            .next()
            .and_then(|l| l.parse::<u64>().ok())
            .unwrap_or(0);

        Some(Self {
            file: file.to_owned(),
            ip,
            port,
            length,
        })
    }
}

/// Split the (possibly quoted) filename off the front of the payload.
fn split_filename(rest: &str) -> Option<(&str, &str)> {
    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        Some((&quoted[..end], &quoted[end + 1..]))
    } else {
        let end = rest.find(' ')?;
        Some((&rest[..end], &rest[end..]))
    }
    .filter(|(file, _)| !file.is_empty())
}
