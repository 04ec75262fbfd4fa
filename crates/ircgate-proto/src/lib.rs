//! # ircgate-proto
//!
//! The parsed-message vocabulary shared between the ircgate session engine
//! and the transport layer that owns the actual IRC socket.
//!
//! The transport parses wire lines into [`Message`] values and attaches the
//! connection-scoped context the engine cannot derive on its own (shared
//! channels for NICK/QUIT, collected membership for end-of-NAMES). This crate
//! performs no I/O.
//!
//! ## Quick start
//!
//! ```rust
//! use ircgate_proto::{CommandKind, Message};
//!
//! let msg = Message::new("PRIVMSG", vec!["#rust", "hello"])
//!     .with_prefix("alice!alice@example.com");
//!
//! assert_eq!(msg.kind(), CommandKind::Privmsg);
//! assert_eq!(msg.sender(), "alice");
//! assert_eq!(msg.last_param(), "hello");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod chan;
pub mod command;
pub mod ctcp;
pub mod dcc;
pub mod message;
pub mod mode;

pub use chan::is_channel_name;
pub use command::CommandKind;
pub use ctcp::{Ctcp, CtcpKind};
pub use dcc::DccSend;
pub use message::Message;
pub use mode::{parse_mode, ModeChange};
