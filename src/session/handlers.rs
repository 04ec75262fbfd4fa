//! Message classification and per-message-type handlers.

use std::sync::Arc;

use chrono::Utc;
use ircgate_proto::{
    command, is_channel_name, parse_mode, CommandKind, CtcpKind, DccSend, Message,
};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::chanlist::{ChannelListIndex, ChannelListItem};
use crate::dcc::{self, TransferProgress};
use crate::event::{
    ChannelForward, Event, Features, IrcError, Join, Mode, MessageEvent, MessageReplay,
    NickChange, NickFail, Part, Quit, Topic, Userlist,
};
use crate::storage::{Channel, StoredMessage};

use super::Session;

impl Session {
    /// Classify one inbound message and run its handler.
    ///
    /// Error-class numerics (4xx) outside the exclusion set are first
    /// surfaced as a protocol-error event, carrying the first channel-shaped
    /// parameter as the error's target; ordinary dispatch then proceeds.
    /// Unrecognized commands are ignored.
    pub(crate) fn dispatch_message(
        &mut self,
        msg: Message,
        progress: &mpsc::Sender<TransferProgress>,
    ) {
        if command::is_error_reply(&msg.command) && !command::is_excluded_error(&msg.command) {
            let target = if msg.params.len() > 2 {
                msg.params[1..]
                    .iter()
                    .find(|p| is_channel_name(p))
                    .cloned()
            } else {
                None
            };

            self.sink.send(Event::Error(IrcError {
                server: self.host_owned(),
                message: msg.last_param().to_owned(),
                target,
            }));
        }

        match msg.kind() {
            CommandKind::Nick => self.nick(&msg),
            CommandKind::Join => self.join(&msg),
            CommandKind::Part => self.part(&msg),
            CommandKind::Mode => self.mode(&msg),
            CommandKind::Privmsg | CommandKind::Notice => self.message(msg, progress),
            CommandKind::Quit => self.quit(&msg),
            CommandKind::Topic | CommandKind::TopicReply => self.topic(&msg),
            CommandKind::Error => self.protocol_error(&msg),
            CommandKind::Welcome
            | CommandKind::YourHost
            | CommandKind::Created
            | CommandKind::LuserClient
            | CommandKind::LuserOp
            | CommandKind::LuserUnknown
            | CommandKind::LuserChannels
            | CommandKind::LuserMe => self.info(&msg),
            CommandKind::Isupport => self.features(&msg),
            CommandKind::WhoisUser => self.whois_user(&msg),
            CommandKind::WhoisServer => self.whois_server(&msg),
            CommandKind::WhoisChannels => self.whois_channels(&msg),
            CommandKind::EndOfWhois => self.whois_end(&msg),
            CommandKind::NoTopic => self.no_topic(&msg),
            CommandKind::EndOfNames => self.names_end(&msg),
            CommandKind::MotdStart => self.motd_start(&msg),
            CommandKind::Motd => self.motd_line(&msg),
            CommandKind::EndOfMotd => self.motd_end(&msg),
            CommandKind::List => self.list(&msg),
            CommandKind::ListEnd => self.list_end(&msg),
            CommandKind::ErroneousNickname => self.bad_nick(&msg),
            CommandKind::LinkChannel => self.forward(&msg),
            CommandKind::Other => {}
        }
    }

    fn nick(&self, msg: &Message) {
        let new = msg.last_param().to_owned();

        self.sink.send(Event::Nick(NickChange {
            server: self.host_owned(),
            old: msg.sender().to_owned(),
            new: new.clone(),
        }));

        if self.client.is_self(&new) {
            let store = Arc::clone(&self.store);
            let host = self.host_owned();
            let nick = new.clone();
            tokio::spawn(async move {
                if let Err(e) = store.set_nick(&nick, &host).await {
                    debug!(error = %e, "failed to persist nick");
                }
            });
        }

        self.spawn_log_event(
            "nick",
            vec![msg.sender().to_owned(), new],
            msg.channels.clone(),
        );
    }

    fn join(&self, msg: &Message) {
        let Some(channel) = msg.params.first().cloned() else {
            return;
        };
        let host = self.host_owned();

        self.sink.send(Event::Join(Join {
            server: host.clone(),
            user: msg.sender().to_owned(),
            channels: msg.params.clone(),
        }));

        if self.client.is_self(msg.sender()) {
            // In case no topic is set and there's a cached one that needs to
            // be cleared.
            self.client.topic(&channel);

            self.replay_messages(&channel, 50);

            let store = Arc::clone(&self.store);
            let membership = Channel {
                server: host,
                name: channel.clone(),
            };
            tokio::spawn(async move {
                if let Err(e) = store.add_channel(membership).await {
                    debug!(error = %e, "failed to persist channel membership");
                }
            });
        }

        self.spawn_log_event("join", vec![msg.sender().to_owned()], vec![channel]);
    }

    fn part(&self, msg: &Message) {
        let Some(channel) = msg.params.first().cloned() else {
            return;
        };
        let host = self.host_owned();

        self.sink.send(Event::Part(Part {
            server: host.clone(),
            user: msg.sender().to_owned(),
            channel: channel.clone(),
            reason: msg.params.get(1).cloned(),
        }));

        if self.client.is_self(msg.sender()) {
            let store = Arc::clone(&self.store);
            let channel = channel.clone();
            tokio::spawn(async move {
                if let Err(e) = store.remove_channel(&host, &channel).await {
                    debug!(error = %e, "failed to remove channel membership");
                }
            });
        }

        self.spawn_log_event("part", vec![msg.sender().to_owned()], vec![channel]);
    }

    fn mode(&self, msg: &Message) {
        if let Some(change) = parse_mode(msg) {
            self.sink.send(Event::Mode(Mode {
                server: self.host_owned(),
                change: change.into(),
            }));
        }
    }

    fn message(&self, msg: Message, progress: &mpsc::Sender<TransferProgress>) {
        if let Some(ctcp) = msg.ctcp() {
            match &ctcp.kind {
                CtcpKind::Dcc if ctcp.params.is_some_and(|p| p.starts_with("SEND")) => {
                    if let Some(pack) = DccSend::parse(&ctcp) {
                        let ctx = dcc::OfferContext {
                            host: self.host_owned(),
                            from: msg.sender().to_owned(),
                            username: self.username.clone(),
                            config: Arc::clone(&self.config),
                            hub: Arc::clone(&self.hub),
                            sink: Arc::clone(&self.sink),
                            progress: progress.clone(),
                        };
                        tokio::spawn(dcc::handle_offer(pack, ctx));
                        return;
                    }
                    // An unparseable SEND falls through as ordinary text.
                }
                CtcpKind::Action => {}
                _ => return,
            }
        }

        let Some(first) = msg.params.first() else {
            return;
        };
        let mut target = first.clone();

        let mut message = MessageEvent {
            id: Some(Uuid::new_v4().to_string()),
            server: self.host_owned(),
            from: msg.sender().to_owned(),
            to: None,
            content: msg.last_param().to_owned(),
        };

        if self.client.is_self(&target) {
            self.sink.send(Event::Pm(message.clone()));

            if !msg.is_from_server() {
                let store = Arc::clone(&self.store);
                let host = message.server.clone();
                let from = message.from.clone();
                tokio::spawn(async move {
                    if let Err(e) = store.add_open_dm(&host, &from).await {
                        debug!(error = %e, "failed to open dm conversation");
                    }
                });
            }

            target = message.from.clone();
        } else {
            message.to = Some(target.clone());
            self.sink.send(Event::Message(message.clone()));
        }

        if target != "*" && !msg.is_from_server() {
            let store = Arc::clone(&self.store);
            let stored = StoredMessage {
                id: message.id.unwrap_or_default(),
                server: message.server,
                from: message.from,
                to: target,
                content: message.content,
                time: Utc::now(),
            };
            tokio::spawn(async move {
                if let Err(e) = store.log_message(stored).await {
                    debug!(error = %e, "failed to log message");
                }
            });
        }
    }

    fn quit(&self, msg: &Message) {
        self.sink.send(Event::Quit(Quit {
            server: self.host_owned(),
            user: msg.sender().to_owned(),
            reason: msg.last_param().to_owned(),
        }));

        self.spawn_log_event(
            "quit",
            vec![msg.sender().to_owned(), msg.last_param().to_owned()],
            msg.channels.clone(),
        );
    }

    /// Connection informational replies (welcome, yourhost, created,
    /// luser*). All emit a private-style informational line; the welcome
    /// reply additionally establishes the session's own nick and kicks off a
    /// channel-list refresh when the cached list for this host is stale.
    fn info(&mut self, msg: &Message) {
        let host = self.host_owned();

        if msg.kind() == CommandKind::Welcome {
            let nick = msg.params.first().cloned().unwrap_or_default();

            self.sink.send(Event::Nick(NickChange {
                server: host.clone(),
                old: String::new(),
                new: nick.clone(),
            }));

            if self.hub.channel_index_needs_update(&host) {
                self.list_buffer = Some(ChannelListIndex::new());
                self.client.list();
            }

            let store = Arc::clone(&self.store);
            let host = host.clone();
            tokio::spawn(async move {
                if let Err(e) = store.set_nick(&nick, &host).await {
                    debug!(error = %e, "failed to persist nick");
                }
            });
        }

        let content = msg
            .params
            .get(1..)
            .map(|rest| rest.join(" "))
            .unwrap_or_default();

        self.sink.send(Event::Pm(MessageEvent {
            id: None,
            server: host,
            from: msg.sender().to_owned(),
            to: None,
            content,
        }));
    }

    fn features(&self, _msg: &Message) {
        let features = self.client.features();

        self.sink.send(Event::Features(Features {
            server: self.host_owned(),
            features: features.clone(),
        }));

        if let Some(name) = features
            .get("NETWORK")
            .and_then(|v| v.as_str())
            .filter(|name| !name.is_empty())
        {
            let store = Arc::clone(&self.store);
            let host = self.host_owned();
            let name = name.to_owned();
            // Read-then-write race is acceptable here, last write wins.
            tokio::spawn(async move {
                if let Ok(server) = store.get_server(&host).await {
                    if server.name.is_empty() {
                        let _ = store.set_server_name(&name, &server.host).await;
                    }
                }
            });
        }
    }

    fn whois_user(&mut self, msg: &Message) {
        if msg.params.len() < 6 {
            return;
        }
        self.whois.nick = msg.params[1].clone();
        self.whois.username = msg.params[2].clone();
        self.whois.host = msg.params[3].clone();
        self.whois.realname = msg.params[5].clone();
    }

    fn whois_server(&mut self, msg: &Message) {
        if let Some(server) = msg.params.get(2) {
            self.whois.server = server.clone();
        }
    }

    fn whois_channels(&mut self, msg: &Message) {
        let channels = msg.last_param();
        let channels = channels.strip_suffix(' ').unwrap_or(channels);
        self.whois
            .channels
            .extend(channels.split(' ').map(str::to_owned));
    }

    /// The result event fires only when a user reply populated the nick;
    /// the accumulator is reset either way so a stray end marker can never
    /// flush stale data.
    fn whois_end(&mut self, _msg: &Message) {
        let whois = std::mem::take(&mut self.whois);
        if !whois.nick.is_empty() {
            self.sink.send(Event::Whois(whois));
        }
    }

    /// Handles both live TOPIC changes and replies to a topic query; only
    /// the former carries the change author and is logged.
    fn topic(&self, msg: &Message) {
        let (channel, nick) = if msg.kind() == CommandKind::Topic {
            let Some(channel) = msg.params.first().cloned() else {
                return;
            };
            self.spawn_log_event(
                "topic",
                vec![msg.sender().to_owned(), msg.last_param().to_owned()],
                vec![channel.clone()],
            );
            (channel, msg.sender().to_owned())
        } else {
            let Some(channel) = msg.params.get(1).cloned() else {
                return;
            };
            (channel, String::new())
        };

        self.sink.send(Event::Topic(Topic {
            server: self.host_owned(),
            channel,
            topic: msg.last_param().to_owned(),
            nick,
        }));
    }

    fn no_topic(&self, msg: &Message) {
        let Some(channel) = msg.params.get(1).cloned() else {
            return;
        };

        self.sink.send(Event::Topic(Topic {
            server: self.host_owned(),
            channel,
            topic: String::new(),
            nick: String::new(),
        }));
    }

    fn names_end(&self, msg: &Message) {
        let Some(channel) = msg.params.get(1).cloned() else {
            return;
        };

        self.sink.send(Event::Users(Userlist {
            server: self.host_owned(),
            channel,
            users: msg.names.clone(),
        }));
    }

    fn motd_start(&mut self, msg: &Message) {
        self.motd.server = self.host_owned();
        self.motd.title = msg.last_param().to_owned();
    }

    fn motd_line(&mut self, msg: &Message) {
        self.motd.content.push(msg.last_param().to_owned());
    }

    fn motd_end(&mut self, _msg: &Message) {
        self.sink.send(Event::Motd(std::mem::take(&mut self.motd)));
    }

    /// List entries only accumulate while an index is active: created on
    /// welcome when the cache was stale, or lazily when a refresh was
    /// explicitly requested. Entries arriving with no index are ignored.
    fn list(&mut self, msg: &Message) {
        if self.list_buffer.is_none() && self.hub.list_refresh_requested(self.client.host()) {
            self.list_buffer = Some(ChannelListIndex::new());
        }

        if let Some(buffer) = &mut self.list_buffer {
            if msg.params.len() < 3 {
                return;
            }
            buffer.add(ChannelListItem {
                name: msg.params[1].clone(),
                user_count: msg.params[2].parse().unwrap_or(0),
                topic: msg.last_param().to_owned(),
            });
        }
    }

    fn list_end(&mut self, _msg: &Message) {
        if let Some(mut index) = self.list_buffer.take() {
            let host = self.host_owned();
            self.hub.clear_list_refresh(&host);

            let hub = Arc::clone(&self.hub);
            tokio::spawn(async move {
                index.finish();
                hub.set_channel_index(&host, index);
            });
        }
    }

    fn bad_nick(&self, _msg: &Message) {
        self.sink.send(Event::NickFail(NickFail {
            server: self.host_owned(),
        }));
    }

    fn forward(&self, msg: &Message) {
        if msg.params.len() > 2 {
            self.sink.send(Event::ChannelForward(ChannelForward {
                server: self.host_owned(),
                old: msg.params[1].clone(),
                new: msg.params[2].clone(),
            }));
        }
    }

    fn protocol_error(&self, msg: &Message) {
        self.sink.send(Event::Error(IrcError {
            server: self.host_owned(),
            message: msg.last_param().to_owned(),
            target: None,
        }));
    }

    fn replay_messages(&self, channel: &str, count: usize) {
        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);
        let host = self.host_owned();
        let channel = channel.to_owned();
        tokio::spawn(async move {
            match store.get_messages(&host, &channel, count).await {
                Ok(messages) if !messages.is_empty() => {
                    sink.send(Event::MessageReplay(MessageReplay {
                        server: host,
                        to: channel,
                        messages,
                    }));
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, channel = %channel, "message replay failed"),
            }
        });
    }

    fn spawn_log_event(&self, kind: &'static str, actors: Vec<String>, channels: Vec<String>) {
        let store = Arc::clone(&self.store);
        let host = self.host_owned();
        tokio::spawn(async move {
            if let Err(e) = store.log_event(&host, kind, actors, channels).await {
                debug!(error = %e, kind, "event log failed");
            }
        });
    }
}
