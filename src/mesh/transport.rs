//! Radio transport port.
//!
//! Two logical channels share one radio:
//!
//! - **Broadcast**: fire-and-forget to every reachable peer.  No
//!   acknowledgment, no retry.
//! - **Reliable unicast**: addressed, retried by the link layer up to a
//!   retransmission budget.  The outcome comes back to the sending node
//!   as a [`LinkReport`], which is logged and otherwise ignored.
//!
//! Both primitives return immediately; nothing above this layer ever
//! learns whether a unicast arrived.

use core::fmt;

use log::{debug, warn};

use super::address::NodeAddr;
use super::codec::{self, Payload};
use super::message::Message;

/// Link-layer outcome of one reliable unicast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkReport {
    /// Delivery confirmed after `retransmissions` retries.
    Sent { to: NodeAddr, retransmissions: u8 },
    /// Retry budget exhausted.
    TimedOut { to: NodeAddr, retransmissions: u8 },
}

impl fmt::Display for LinkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent { to, retransmissions } => {
                write!(f, "sent to {to}, retransmissions {retransmissions}")
            }
            Self::TimedOut { to, retransmissions } => {
                write!(f, "timed out to {to}, retransmissions {retransmissions}")
            }
        }
    }
}

/// Log a link-layer callback.  Nothing else consumes it.
pub fn log_link_report(report: &LinkReport) {
    debug!("runicast: {report}");
}

/// Raw radio access.
pub trait Radio {
    /// Send to every reachable peer.
    fn broadcast(&mut self, payload: &[u8]);

    /// Send to `dest` with up to `max_retransmissions` link-layer retries.
    fn send_reliable(&mut self, dest: NodeAddr, payload: &[u8], max_retransmissions: u8);
}

/// Message-level helpers over any [`Radio`].
pub trait RadioExt: Radio {
    fn broadcast_msg(&mut self, msg: Message) {
        match codec::encode(msg) {
            Ok(p) => {
                debug!("broadcast {msg}");
                self.broadcast(&p);
            }
            Err(e) => warn!("broadcast {msg} dropped: {e}"),
        }
    }

    fn send_msg(&mut self, dest: NodeAddr, msg: Message, max_retransmissions: u8) {
        match codec::encode(msg) {
            Ok(p) => {
                debug!("unicast {msg} -> {dest}");
                self.send_reliable(dest, &p, max_retransmissions);
            }
            Err(e) => warn!("unicast {msg} -> {dest} dropped: {e}"),
        }
    }
}

impl<R: Radio + ?Sized> RadioExt for R {}

/// One queued transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transmission {
    Broadcast(Payload),
    Unicast {
        dest: NodeAddr,
        payload: Payload,
        max_retransmissions: u8,
    },
}

impl Transmission {
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Broadcast(p) => p,
            Self::Unicast { payload, .. } => payload,
        }
    }
}

/// Radio that queues transmissions for someone else to put on the air.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<Transmission>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything queued since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<Transmission> {
        core::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[Transmission] {
        &self.pending
    }
}

impl Radio for Outbox {
    fn broadcast(&mut self, payload: &[u8]) {
        match Payload::from_slice(payload) {
            Ok(p) => self.pending.push(Transmission::Broadcast(p)),
            Err(()) => warn!("outbox: broadcast of {} bytes too long", payload.len()),
        }
    }

    fn send_reliable(&mut self, dest: NodeAddr, payload: &[u8], max_retransmissions: u8) {
        match Payload::from_slice(payload) {
            Ok(p) => self.pending.push(Transmission::Unicast {
                dest,
                payload: p,
                max_retransmissions,
            }),
            Err(()) => warn!("outbox: unicast of {} bytes too long", payload.len()),
        }
    }
}
