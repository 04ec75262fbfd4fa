//! Per-connection IRC session engine.
//!
//! One [`Session`] exists per live IRC connection and is owned by a single
//! task running [`Session::run`]: a `tokio::select!` loop over the parsed
//! message stream, the connection-state stream and the DCC progress channel.
//! Handlers never await storage; durable side effects are spawned as
//! independent tasks.

mod handlers;

use std::sync::Arc;

use chrono::Utc;
use ircgate_proto::Message;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::chanlist::ChannelListIndex;
use crate::client::{ConnectionState, IrcClient};
use crate::config::Config;
use crate::dcc::{self, TransferProgress};
use crate::event::{ConnectionUpdate, Event, EventSink, MessageEvent, Motd, WhoisReply};
use crate::hub::Hub;
use crate::storage::{Store, StoredMessage};

/// Synthetic sender identity for DCC status messages.
const DCC_SENDER: &str = "@dcc";

/// The per-connection session engine.
pub struct Session {
    client: Arc<dyn IrcClient>,
    hub: Arc<Hub>,
    sink: Arc<dyn EventSink>,
    store: Arc<dyn Store>,
    config: Arc<Config>,
    username: String,

    // Transient buffers for multi-message reply sequences.
    whois: WhoisReply,
    motd: Motd,
    list_buffer: Option<ChannelListIndex>,
}

impl Session {
    /// Create a session for one IRC connection.
    pub fn new(
        client: Arc<dyn IrcClient>,
        hub: Arc<Hub>,
        sink: Arc<dyn EventSink>,
        store: Arc<dyn Store>,
        config: Arc<Config>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            client,
            hub,
            sink,
            store,
            config,
            username: username.into(),
            whois: WhoisReply::default(),
            motd: Motd::default(),
            list_buffer: None,
        }
    }

    /// Run the session until the inbound message stream closes.
    ///
    /// `messages` is unbounded - inbound protocol messages are never dropped
    /// to backpressure. The DCC progress channel created here is bounded;
    /// transfer tasks block on it instead of dropping updates.
    pub async fn run(
        mut self,
        mut messages: mpsc::UnboundedReceiver<Message>,
        mut updates: mpsc::Receiver<ConnectionState>,
    ) {
        let (progress_tx, mut progress_rx) =
            mpsc::channel::<TransferProgress>(dcc::PROGRESS_CHANNEL_DEPTH);
        let mut last_conn_err: Option<String> = None;

        loop {
            tokio::select! {
                msg = messages.recv() => match msg {
                    Some(msg) => self.dispatch_message(msg, &progress_tx),
                    None => {
                        let host = self.host_owned();
                        self.hub.remove_session(&host);
                        debug!(server = %host, "message stream closed, session ended");
                        return;
                    }
                },

                Some(state) = updates.recv() => {
                    self.connection_changed(state, &mut last_conn_err);
                }

                Some(progress) = progress_rx.recv() => self.dcc_status(progress),
            }
        }
    }

    fn connection_changed(&self, state: ConnectionState, last_conn_err: &mut Option<String>) {
        let host = self.host_owned();

        self.sink.send(Event::ConnectionUpdate(ConnectionUpdate {
            server: host.clone(),
            connected: state.connected,
            error: state.error.clone(),
        }));
        self.hub.set_connection_state(&host, state.clone());

        match connection_log(&state, last_conn_err) {
            ConnLog::Error(error) => info!(server = %host, error = %error, "connection error"),
            ConnLog::Connected => info!(server = %host, "connected"),
            ConnLog::Nothing => {}
        }
    }

    fn dcc_status(&self, progress: TransferProgress) {
        let url = self.config.download_url(&self.username, &progress.file);
        let status = dcc::render_progress(&progress, &url);

        let message = MessageEvent {
            id: None,
            server: self.host_owned(),
            from: DCC_SENDER.to_string(),
            to: None,
            content: status.content,
        };
        self.sink.send(Event::Pm(message.clone()));

        if status.logged {
            let store = Arc::clone(&self.store);
            tokio::spawn(async move {
                if let Err(e) = store.add_open_dm(&message.server, &message.from).await {
                    debug!(error = %e, "failed to open dcc conversation");
                }
                let stored = StoredMessage {
                    id: String::new(),
                    server: message.server.clone(),
                    from: message.from,
                    to: String::new(),
                    content: message.content,
                    time: Utc::now(),
                };
                if let Err(e) = store.log_message(stored).await {
                    debug!(error = %e, "failed to log dcc status");
                }
            });
        }
    }

    fn host_owned(&self) -> String {
        self.client.host().to_owned()
    }
}

/// What a connection-state change should write to the log.
#[derive(Debug, PartialEq, Eq)]
enum ConnLog {
    Error(String),
    Connected,
    Nothing,
}

/// Decide the log line for a state change.
///
/// A new error is logged and remembered; a repeated identical error is
/// suppressed so reconnect storms do not flood the log. Any non-new-error
/// change that reports a live connection logs the transition.
fn connection_log(state: &ConnectionState, last_err: &mut Option<String>) -> ConnLog {
    match &state.error {
        Some(error) if last_err.as_deref() != Some(error.as_str()) => {
            *last_err = Some(error.clone());
            ConnLog::Error(error.clone())
        }
        _ if state.connected => ConnLog::Connected,
        _ => ConnLog::Nothing,
    }
}
