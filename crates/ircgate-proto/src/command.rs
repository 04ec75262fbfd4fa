//! Command classification for gateway dispatch.
//!
//! The engine matches exhaustively on [`CommandKind`] rather than going
//! through a string-keyed handler table; commands it does not care about
//! collapse into [`CommandKind::Other`] and are ignored.

/// The message kinds the gateway session engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// NICK
    Nick,
    /// JOIN
    Join,
    /// PART
    Part,
    /// MODE
    Mode,
    /// PRIVMSG
    Privmsg,
    /// NOTICE
    Notice,
    /// QUIT
    Quit,
    /// TOPIC (live topic change)
    Topic,
    /// ERROR
    Error,
    /// 001 RPL_WELCOME
    Welcome,
    /// 002 RPL_YOURHOST
    YourHost,
    /// 003 RPL_CREATED
    Created,
    /// 005 RPL_ISUPPORT
    Isupport,
    /// 251 RPL_LUSERCLIENT
    LuserClient,
    /// 252 RPL_LUSEROP
    LuserOp,
    /// 253 RPL_LUSERUNKNOWN
    LuserUnknown,
    /// 254 RPL_LUSERCHANNELS
    LuserChannels,
    /// 255 RPL_LUSERME
    LuserMe,
    /// 311 RPL_WHOISUSER
    WhoisUser,
    /// 312 RPL_WHOISSERVER
    WhoisServer,
    /// 319 RPL_WHOISCHANNELS
    WhoisChannels,
    /// 318 RPL_ENDOFWHOIS
    EndOfWhois,
    /// 331 RPL_NOTOPIC
    NoTopic,
    /// 332 RPL_TOPIC (reply to a topic query)
    TopicReply,
    /// 366 RPL_ENDOFNAMES
    EndOfNames,
    /// 375 RPL_MOTDSTART
    MotdStart,
    /// 372 RPL_MOTD
    Motd,
    /// 376 RPL_ENDOFMOTD
    EndOfMotd,
    /// 322 RPL_LIST
    List,
    /// 323 RPL_LISTEND
    ListEnd,
    /// 432 ERR_ERRONEUSNICKNAME
    ErroneousNickname,
    /// 470 forwarded-channel notice
    LinkChannel,
    /// Anything else; ignored by the engine.
    Other,
}

impl CommandKind {
    /// Classify a raw command identifier.
    pub fn of(command: &str) -> Self {
        match command {
            "NICK" => Self::Nick,
            "JOIN" => Self::Join,
            "PART" => Self::Part,
            "MODE" => Self::Mode,
            "PRIVMSG" => Self::Privmsg,
            "NOTICE" => Self::Notice,
            "QUIT" => Self::Quit,
            "TOPIC" => Self::Topic,
            "ERROR" => Self::Error,
            "001" => Self::Welcome,
            "002" => Self::YourHost,
            "003" => Self::Created,
            "005" => Self::Isupport,
            "251" => Self::LuserClient,
            "252" => Self::LuserOp,
            "253" => Self::LuserUnknown,
            "254" => Self::LuserChannels,
            "255" => Self::LuserMe,
            "311" => Self::WhoisUser,
            "312" => Self::WhoisServer,
            "319" => Self::WhoisChannels,
            "318" => Self::EndOfWhois,
            "331" => Self::NoTopic,
            "332" => Self::TopicReply,
            "366" => Self::EndOfNames,
            "375" => Self::MotdStart,
            "372" => Self::Motd,
            "376" => Self::EndOfMotd,
            "322" => Self::List,
            "323" => Self::ListEnd,
            "432" => Self::ErroneousNickname,
            "470" => Self::LinkChannel,
            _ => Self::Other,
        }
    }
}

/// Returns `true` for numeric replies in the 4xx error class.
pub fn is_error_reply(command: &str) -> bool {
    command.starts_with('4')
}

/// Error numerics with dedicated handling elsewhere; these never produce a
/// generic protocol-error event.
///
/// 433 ERR_NICKNAMEINUSE, 436 ERR_NICKCOLLISION, 437 ERR_UNAVAILRESOURCE,
/// 470 forwarded channel.
pub fn is_excluded_error(command: &str) -> bool {
    matches!(command, "433" | "436" | "437" | "470")
}
