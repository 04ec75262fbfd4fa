//! Shared test doubles for session integration tests.
//!
//! Provides an in-memory event sink, storage backend and IRC client stub,
//! plus a harness that wires them into a running session task.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ircgate::client::{ConnectionState, IrcClient};
use ircgate::config::Config;
use ircgate::event::{Event, EventSink};
use ircgate::storage::{Channel, Server, Store, StoreError, StoredMessage};
use ircgate::{Hub, Session};
use ircgate_proto::Message;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const HOST: &str = "irc.example.net";
pub const USERNAME: &str = "alice";

/// IRC client stub recording outbound commands.
pub struct TestClient {
    host: String,
    nick: Mutex<String>,
    features: HashMap<String, serde_json::Value>,
    commands: Mutex<Vec<String>>,
}

impl TestClient {
    pub fn new(nick: &str) -> Self {
        Self {
            host: HOST.to_string(),
            nick: Mutex::new(nick.to_string()),
            features: HashMap::new(),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn with_features(mut self, features: HashMap<String, serde_json::Value>) -> Self {
        self.features = features;
        self
    }

    /// Outbound commands issued so far, e.g. `["TOPIC #rust", "LIST"]`.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl IrcClient for TestClient {
    fn host(&self) -> &str {
        &self.host
    }

    fn is_self(&self, nick: &str) -> bool {
        *self.nick.lock().unwrap() == nick
    }

    fn topic(&self, channel: &str) {
        self.commands.lock().unwrap().push(format!("TOPIC {channel}"));
    }

    fn list(&self) {
        self.commands.lock().unwrap().push("LIST".to_string());
    }

    fn features(&self) -> HashMap<String, serde_json::Value> {
        self.features.clone()
    }
}

/// Event sink recording every delivered event.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(Event::name).collect()
    }

    /// Payloads of all events delivered under `name`, in order.
    pub fn payloads(&self, name: &str) -> Vec<serde_json::Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.name() == name)
            .map(Event::payload)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn send(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

/// In-memory storage backend recording every call.
#[derive(Default)]
pub struct MemStore {
    pub events: Mutex<Vec<(String, String, Vec<String>, Vec<String>)>>,
    pub messages: Mutex<Vec<StoredMessage>>,
    pub channels: Mutex<Vec<Channel>>,
    pub removed_channels: Mutex<Vec<(String, String)>>,
    pub nicks: Mutex<Vec<(String, String)>>,
    pub server_names: Mutex<Vec<(String, String)>>,
    pub open_dms: Mutex<Vec<(String, String)>>,
    /// Server records returned by `get_server`, keyed by host.
    pub servers: Mutex<HashMap<String, Server>>,
    /// Messages returned by `get_messages`.
    pub replay: Mutex<Vec<StoredMessage>>,
}

#[async_trait]
impl Store for MemStore {
    async fn log_event(
        &self,
        server: &str,
        kind: &str,
        actors: Vec<String>,
        channels: Vec<String>,
    ) -> Result<(), StoreError> {
        self.events
            .lock()
            .unwrap()
            .push((server.to_string(), kind.to_string(), actors, channels));
        Ok(())
    }

    async fn log_message(&self, message: StoredMessage) -> Result<(), StoreError> {
        self.messages.lock().unwrap().push(message);
        Ok(())
    }

    async fn get_messages(
        &self,
        _server: &str,
        _channel: &str,
        count: usize,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let replay = self.replay.lock().unwrap();
        Ok(replay.iter().take(count).cloned().collect())
    }

    async fn add_channel(&self, channel: Channel) -> Result<(), StoreError> {
        self.channels.lock().unwrap().push(channel);
        Ok(())
    }

    async fn remove_channel(&self, server: &str, channel: &str) -> Result<(), StoreError> {
        self.removed_channels
            .lock()
            .unwrap()
            .push((server.to_string(), channel.to_string()));
        Ok(())
    }

    async fn set_nick(&self, nick: &str, server: &str) -> Result<(), StoreError> {
        self.nicks
            .lock()
            .unwrap()
            .push((nick.to_string(), server.to_string()));
        Ok(())
    }

    async fn set_server_name(&self, name: &str, server: &str) -> Result<(), StoreError> {
        self.server_names
            .lock()
            .unwrap()
            .push((name.to_string(), server.to_string()));
        Ok(())
    }

    async fn get_server(&self, server: &str) -> Result<Server, StoreError> {
        self.servers
            .lock()
            .unwrap()
            .get(server)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn add_open_dm(&self, server: &str, nick: &str) -> Result<(), StoreError> {
        self.open_dms
            .lock()
            .unwrap()
            .push((server.to_string(), nick.to_string()));
        Ok(())
    }
}

/// A running session wired to test doubles.
pub struct Harness {
    pub client: Arc<TestClient>,
    pub sink: Arc<RecordingSink>,
    pub store: Arc<MemStore>,
    pub hub: Arc<Hub>,
    pub msg_tx: mpsc::UnboundedSender<Message>,
    pub state_tx: mpsc::Sender<ConnectionState>,
    pub task: JoinHandle<()>,
}

impl Harness {
    pub fn spawn(config: Config) -> Self {
        Self::spawn_with(config, TestClient::new("alice"), MemStore::default())
    }

    pub fn spawn_with(config: Config, client: TestClient, store: MemStore) -> Self {
        Self::spawn_on(Arc::new(Hub::new()), config, client, store)
    }

    pub fn spawn_on(hub: Arc<Hub>, config: Config, client: TestClient, store: MemStore) -> Self {
        trace_init();

        let client = Arc::new(client);
        let sink = Arc::new(RecordingSink::default());
        let store = Arc::new(store);

        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = mpsc::channel(8);

        let session = Session::new(
            Arc::clone(&client) as Arc<dyn IrcClient>,
            Arc::clone(&hub),
            Arc::clone(&sink) as Arc<dyn EventSink>,
            Arc::clone(&store) as Arc<dyn Store>,
            Arc::new(config),
            USERNAME,
        );
        let task = tokio::spawn(session.run(msg_rx, state_rx));

        Self {
            client,
            sink,
            store,
            hub,
            msg_tx,
            state_tx,
            task,
        }
    }

    /// Feed one parsed message into the session.
    pub fn send(&self, msg: Message) {
        self.msg_tx.send(msg).expect("session closed");
    }

    /// Close the inbound stream and wait for the run loop to end.
    pub async fn shutdown(self) -> (Arc<RecordingSink>, Arc<MemStore>, Arc<Hub>) {
        drop(self.msg_tx);
        self.task.await.expect("session panicked");
        settle().await;
        (self.sink, self.store, self.hub)
    }
}

/// Install a subscriber honoring `RUST_LOG`, once per test binary.
pub fn trace_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Let spawned fire-and-forget tasks run to completion.
///
/// Tests run on the current-thread runtime, so draining the ready queue a
/// few times is enough for the in-memory side-effect tasks.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

/// A config with DCC switched on.
pub fn dcc_config(autoget: bool, download_dir: &std::path::Path) -> Config {
    let raw = format!(
        r#"
        [external]
        scheme = "https"
        host = "gate.example.net"

        [dcc]
        enabled = true
        download_dir = "{}"

        [dcc.autoget]
        enabled = {autoget}
        "#,
        download_dir.display()
    );
    toml::from_str(&raw).expect("valid test config")
}
