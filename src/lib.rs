//! ircgate - IRC-to-web gateway session engine.
//!
//! The engine maintains one live IRC session per connection on behalf of a
//! browser client. Each session runs a single task that multiplexes three
//! sources - parsed protocol messages, connection-state notifications and
//! DCC transfer progress - classifies every message, and emits normalized
//! events to a downstream [`event::EventSink`]. Durable side effects (event
//! logs, memberships, nick updates) are fired at the [`storage::Store`] as
//! independent tasks so event delivery never blocks on storage I/O.
//!
//! The IRC socket itself, the browser transport and the storage backend are
//! collaborators behind the [`client::IrcClient`], [`event::EventSink`] and
//! [`storage::Store`] seams; this crate owns none of them.

pub mod chanlist;
pub mod client;
pub mod config;
pub mod dcc;
pub mod event;
pub mod hub;
pub mod session;
pub mod storage;

pub use config::Config;
pub use hub::Hub;
pub use session::Session;
