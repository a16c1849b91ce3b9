//! Wire codec for radio payloads.
//!
//! Two encodings share the air:
//!
//! - **Tagged**: a short ASCII tag followed by a NUL byte (`b"LOCK\0"`).
//! - **Integer reply**: exactly four raw bytes, a little-endian `i32`.
//!
//! Integer replies carry no tag, so a receiver cannot tell them apart from
//! a tag by content alone.  [`decode_inbound`] applies the receive rule:
//! the acknowledgment tag is tested first, then the sender's address is
//! looked up in a [`ReplyTable`] to decide whether the bytes are a reply,
//! and only then is the payload parsed as a tag.

use crate::error::CodecError;

use super::address::{NodeAddr, ReplyKind, ReplyTable};
use super::message::Message;

/// Largest payload a single radio frame carries.
pub const MAX_PAYLOAD: usize = 16;

/// Encoded payload buffer.
pub type Payload = heapless::Vec<u8, MAX_PAYLOAD>;

const ACK_FRAME: &[u8] = b"ALARM_ACK\0";

/// Encode a message into its wire form.
pub fn encode(msg: Message) -> Result<Payload, CodecError> {
    let mut out = Payload::new();
    match msg {
        Message::IntegerReply(v) => {
            out.extend_from_slice(&v.to_le_bytes())
                .map_err(|_| CodecError::PayloadTooLong(4))?;
        }
        tagged => {
            let tag = tagged.tag().ok_or(CodecError::UnknownTag)?;
            let len = tag.len() + 1;
            if len > MAX_PAYLOAD {
                return Err(CodecError::PayloadTooLong(len));
            }
            out.extend_from_slice(tag.as_bytes())
                .map_err(|_| CodecError::PayloadTooLong(len))?;
            out.push(0).map_err(|_| CodecError::PayloadTooLong(len))?;
        }
    }
    Ok(out)
}

/// Parse a tagged payload.
///
/// The tag ends at the first NUL; a payload without one is taken whole.
pub fn decode_tagged(payload: &[u8]) -> Result<Message, CodecError> {
    if payload.is_empty() {
        return Err(CodecError::Empty);
    }
    let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
    Message::from_tag(&payload[..end]).ok_or(CodecError::UnknownTag)
}

/// Reinterpret a payload as a little-endian `i32`.
pub fn decode_reply(payload: &[u8]) -> Result<i32, CodecError> {
    let bytes: [u8; 4] = payload
        .try_into()
        .map_err(|_| CodecError::BadReplyLength(payload.len()))?;
    Ok(i32::from_le_bytes(bytes))
}

/// Exact match against the acknowledgment frame.
pub fn is_ack(payload: &[u8]) -> bool {
    payload == ACK_FRAME
}

/// A payload as understood by a receiver that accepts integer replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// Alarm acknowledgment from `from`.
    Ack { from: NodeAddr },
    /// Untagged integer whose meaning comes from the sender's address.
    Reply { from: NodeAddr, kind: ReplyKind, value: i32 },
    /// Any other tagged message.
    Tagged { from: NodeAddr, msg: Message },
}

/// Classify a payload received from `from`.
pub fn decode_inbound(
    from: NodeAddr,
    payload: &[u8],
    replies: &ReplyTable,
) -> Result<Inbound, CodecError> {
    if is_ack(payload) {
        return Ok(Inbound::Ack { from });
    }
    if let Some(kind) = replies.lookup(from) {
        let value = decode_reply(payload)?;
        return Ok(Inbound::Reply { from, kind, value });
    }
    let msg = decode_tagged(payload)?;
    Ok(Inbound::Tagged { from, msg })
}
