//! Channel name classification.

/// Returns `true` if `name` looks like a channel name.
///
/// RFC 2811 channel names begin with one of `&`, `#`, `+` or `!`.
pub fn is_channel_name(name: &str) -> bool {
    matches!(name.chars().next(), Some('&' | '#' | '+' | '!'))
}
