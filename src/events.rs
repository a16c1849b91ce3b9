//! Per-node event queue.
//!
//! Events are produced by:
//! - the button (one event per debounced press)
//! - the scheduler (timer expiries, via [`SchedulerDelegate`])
//! - the radio (broadcast and unicast receptions, link-layer reports)
//!
//! and consumed by the node host, which hands them one at a time to the
//! node's service.  Each handler runs to completion before the next event
//! is taken.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Button      │────▶│              │     │              │
//! │ Scheduler   │────▶│  EventQueue  │────▶│  NodeService │
//! │ Radio       │────▶│  (bounded)   │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use log::warn;

use crate::app::ports::SchedulerDelegate;
use crate::error::{Error, Result};
use crate::mesh::{LinkReport, NodeAddr, Payload};
use crate::scheduler::TimerId;

/// Maximum number of pending events per node.
const EVENT_QUEUE_CAP: usize = 16;

/// Everything that can wake a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    /// Debounced press of the node's single button.
    ButtonPressed,
    /// A scheduler timer expired.
    Timer(TimerId),
    /// Payload received on the broadcast channel.
    Broadcast { from: NodeAddr, payload: Payload },
    /// Payload received on the reliable-unicast channel.
    Unicast { from: NodeAddr, payload: Payload },
    /// Link-layer outcome of one of this node's own unicasts.
    Link(LinkReport),
}

/// Bounded FIFO of pending [`NodeEvent`]s.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: heapless::Deque<NodeEvent, EVENT_QUEUE_CAP>,
    dropped: u32,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an event.  A full queue drops it.
    pub fn push(&mut self, event: NodeEvent) -> Result<()> {
        self.events.push_back(event).map_err(|event| {
            self.dropped += 1;
            warn!("event queue full, dropping {event:?}");
            Error::QueueFull
        })
    }

    pub fn pop(&mut self) -> Option<NodeEvent> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Events lost to overflow since creation.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl SchedulerDelegate for EventQueue {
    fn on_timer_fired(&mut self, timer: TimerId) {
        // Overflow is already logged and counted by `push`.
        let _ = self.push(NodeEvent::Timer(timer));
    }
}
