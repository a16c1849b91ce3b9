//! Message vocabulary shared by broadcast and unicast traffic.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Every payload a node can put on the air.
///
/// All variants except [`Message::IntegerReply`] travel as short ASCII
/// tags; replies are a bare 4-byte integer whose meaning depends on the
/// sender (see [`ReplyTable`](super::address::ReplyTable)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    AlarmOn,
    AlarmOff,
    AlarmAck,
    LockGate,
    UnlockGate,
    OpenGateDoor,
    GetTemperature,
    GetLight,
    IntegerReply(i32),
    ComfortStart,
    ComfortStop,
}

impl Message {
    /// Tagged variants in wire-tag order.
    pub const TAGGED: [Message; 10] = [
        Message::AlarmOn,
        Message::AlarmOff,
        Message::AlarmAck,
        Message::LockGate,
        Message::UnlockGate,
        Message::OpenGateDoor,
        Message::GetTemperature,
        Message::GetLight,
        Message::ComfortStart,
        Message::ComfortStop,
    ];

    /// ASCII wire tag, or `None` for integer replies.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Self::AlarmOn => Some("ALARM_ON"),
            Self::AlarmOff => Some("ALARM_OFF"),
            Self::AlarmAck => Some("ALARM_ACK"),
            Self::LockGate => Some("LOCK"),
            Self::UnlockGate => Some("UNLOCK"),
            Self::OpenGateDoor => Some("OPEN"),
            Self::GetTemperature => Some("GET_TEMP"),
            Self::GetLight => Some("GET_LIGHT"),
            Self::ComfortStart => Some("COMFORT"),
            Self::ComfortStop => Some("NO_COMFORT"),
            Self::IntegerReply(_) => None,
        }
    }

    /// Look a tag up (without its NUL terminator).
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        Self::TAGGED
            .into_iter()
            .find(|m| m.tag().is_some_and(|t| t.as_bytes() == tag))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.tag()) {
            (Self::IntegerReply(v), _) => write!(f, "INT({v})"),
            (_, Some(tag)) => f.write_str(tag),
            (_, None) => f.write_str("?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_unique() {
        for (i, a) in Message::TAGGED.iter().enumerate() {
            for b in &Message::TAGGED[i + 1..] {
                assert_ne!(a.tag(), b.tag(), "{a:?} and {b:?} share a tag");
            }
        }
    }

    #[test]
    fn tag_lookup_is_exact() {
        assert_eq!(Message::from_tag(b"LOCK"), Some(Message::LockGate));
        assert_eq!(Message::from_tag(b"UNLOCK"), Some(Message::UnlockGate));
        assert_eq!(Message::from_tag(b"LOCKED"), None);
        assert_eq!(Message::from_tag(b"lock"), None);
    }

    #[test]
    fn replies_have_no_tag() {
        assert_eq!(Message::IntegerReply(21).tag(), None);
        assert_eq!(Message::IntegerReply(21).to_string(), "INT(21)");
    }
}
