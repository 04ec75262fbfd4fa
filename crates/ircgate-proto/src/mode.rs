//! MODE change parsing.

use crate::message::Message;

/// A parsed mode change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeChange {
    /// Channel or nick the mode applies to.
    pub target: String,
    /// Affected user for membership modes, empty otherwise.
    pub user: String,
    /// Flags being set.
    pub add: String,
    /// Flags being unset.
    pub remove: String,
}

/// Parse a MODE message into a [`ModeChange`].
///
/// Returns `None` for shapes the gateway cannot represent: fewer than two
/// parameters, or a flag string that does not start with `+`/`-`.
pub fn parse_mode(msg: &Message) -> Option<ModeChange> {
    let target = msg.params.first()?;
    let flags = msg.params.get(1)?;

    if !flags.starts_with(['+', '-']) {
        return None;
    }

    let mut change = ModeChange {
        target: target.clone(),
        user: msg.params.get(2).cloned().unwrap_or_default(),
        ..ModeChange::default()
    };

    let mut adding = true;
    for c in flags.chars() {
        match c {
            '+' => adding = true,
            '-' => adding = false,
            _ if adding => change.add.push(c),
            _ => change.remove.push(c),
        }
    }

    if change.add.is_empty() && change.remove.is_empty() {
        return None;
    }

    Some(change)
}
