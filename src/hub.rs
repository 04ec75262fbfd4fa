//! Process-wide shared state.
//!
//! One [`Hub`] exists per gateway process and is passed by reference into
//! every session. It owns the keyed stores that outlive any single session:
//! the session registry, the channel-list index cache and the pending DCC
//! offer table. All stores are concurrent maps; different sessions touch
//! different keys without contending.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::{DashMap, DashSet};
use ircgate_proto::DccSend;

use crate::chanlist::ChannelListIndex;
use crate::client::ConnectionState;

/// How long a cached channel-list index stays fresh.
const CHANNEL_INDEX_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct CachedIndex {
    index: Arc<ChannelListIndex>,
    fetched_at: Instant,
}

/// Shared cross-session state, injected into each [`Session`](crate::Session).
#[derive(Default)]
pub struct Hub {
    /// Active sessions and their last known connection state, keyed by host.
    sessions: DashMap<String, ConnectionState>,

    /// Finished channel-list indexes, keyed by host.
    channel_indexes: DashMap<String, CachedIndex>,

    /// Hosts with an explicitly requested channel-list refresh.
    list_refresh: DashSet<String>,

    /// DCC offers surfaced to the user and awaiting acceptance, keyed by
    /// file name.
    pending_dcc: DashMap<String, DccSend>,
}

impl Hub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    // --- session registry ---

    /// Record the latest connection state for a session.
    pub fn set_connection_state(&self, host: &str, state: ConnectionState) {
        self.sessions.insert(host.to_owned(), state);
    }

    /// The last known connection state for a session, if registered.
    pub fn connection_state(&self, host: &str) -> Option<ConnectionState> {
        self.sessions.get(host).map(|s| s.clone())
    }

    /// Deregister a session whose inbound stream has closed.
    pub fn remove_session(&self, host: &str) {
        self.sessions.remove(host);
    }

    /// Whether a session is registered for `host`.
    pub fn has_session(&self, host: &str) -> bool {
        self.sessions.contains_key(host)
    }

    // --- channel-list index cache ---

    /// The cached channel list for a host, if any.
    pub fn channel_index(&self, host: &str) -> Option<Arc<ChannelListIndex>> {
        self.channel_indexes.get(host).map(|c| Arc::clone(&c.index))
    }

    /// Whether the cached channel list for a host is stale or absent.
    pub fn channel_index_needs_update(&self, host: &str) -> bool {
        match self.channel_indexes.get(host) {
            Some(cached) => cached.fetched_at.elapsed() > CHANNEL_INDEX_TTL,
            None => true,
        }
    }

    /// Publish a finished channel list, replacing any prior value for the
    /// host.
    pub fn set_channel_index(&self, host: &str, index: ChannelListIndex) {
        self.channel_indexes.insert(
            host.to_owned(),
            CachedIndex {
                index: Arc::new(index),
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop the cached channel list for a host.
    pub fn invalidate_channel_index(&self, host: &str) {
        self.channel_indexes.remove(host);
    }

    /// Ask the session for `host` to rebuild the channel list on the next
    /// LIST reply sequence.
    pub fn request_list_refresh(&self, host: &str) {
        self.list_refresh.insert(host.to_owned());
    }

    /// Whether a refresh was explicitly requested for `host`.
    pub fn list_refresh_requested(&self, host: &str) -> bool {
        self.list_refresh.contains(host)
    }

    /// Clear the refresh request for `host`.
    pub fn clear_list_refresh(&self, host: &str) {
        self.list_refresh.remove(host);
    }

    // --- pending DCC offers ---

    /// Record an offer awaiting the user's decision.
    pub fn set_pending_dcc(&self, file: &str, pack: DccSend) {
        self.pending_dcc.insert(file.to_owned(), pack);
    }

    /// Consume a pending offer for acceptance; `None` if it expired.
    pub fn take_pending_dcc(&self, file: &str) -> Option<DccSend> {
        self.pending_dcc.remove(file).map(|(_, pack)| pack)
    }

    /// Remove a pending offer without consuming it (expiry).
    pub fn delete_pending_dcc(&self, file: &str) {
        self.pending_dcc.remove(file);
    }

    /// Whether an offer is still acceptable.
    pub fn has_pending_dcc(&self, file: &str) -> bool {
        self.pending_dcc.contains_key(file)
    }
}
