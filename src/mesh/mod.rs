//! Mesh networking: addresses, the message vocabulary, the wire codec and
//! the radio port.

pub mod address;
pub mod codec;
pub mod message;
pub mod transport;

pub use address::{NodeAddr, NodeIdentity, ReplyKind, ReplyTable, Role};
pub use codec::{Inbound, Payload};
pub use message::Message;
pub use transport::{LinkReport, Outbox, Radio, RadioExt, Transmission};
