//! Node services: one per role, plus the state machines they share.
//!
//! ```text
//!   EventQueue ──▶ NodeHost::run ──▶ dispatch ──▶ NodeService handler
//!                                                    │
//!                          NodeIo { hw, radio, sink, timers } ◀──┘
//! ```
//!
//! A node is single threaded and cooperative.  Each handler runs to
//! completion with exclusive access to the node's state and its
//! [`NodeIo`]; the only way to wait is to arm a timer and return.

pub mod alarm;
pub mod bedroom;
pub mod coordinator;
pub mod entrance;
pub mod gate;
pub mod opening;
pub mod query;

use log::{debug, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, Hardware};
use crate::error::{CodecError, Result};
use crate::events::{EventQueue, NodeEvent};
use crate::mesh::transport::log_link_report;
use crate::mesh::{NodeAddr, NodeIdentity, Radio};
use crate::scheduler::{Millis, Scheduler, TimerId};

pub use bedroom::BedroomNode;
pub use coordinator::Coordinator;
pub use entrance::EntranceNode;
pub use gate::GateNode;

/// Everything a handler may touch besides its own state.
pub struct NodeIo<'a> {
    /// Node clock at the time the event is handled.
    pub now: Millis,
    pub hw: &'a mut dyn Hardware,
    pub radio: &'a mut dyn Radio,
    pub sink: &'a mut dyn EventSink,
    pub timers: &'a mut Scheduler,
}

/// Role-specific behavior of one node.
pub trait NodeService {
    fn identity(&self) -> NodeIdentity;

    /// Boot: initial indicators, initial timers, first console output.
    fn start(&mut self, io: &mut NodeIo<'_>);

    fn on_button(&mut self, io: &mut NodeIo<'_>);

    fn on_timer(&mut self, timer: TimerId, io: &mut NodeIo<'_>);

    fn on_broadcast(&mut self, from: NodeAddr, payload: &[u8], io: &mut NodeIo<'_>);

    fn on_unicast(&mut self, from: NodeAddr, payload: &[u8], io: &mut NodeIo<'_>);
}

/// Route one event to the matching handler.
pub fn dispatch(service: &mut dyn NodeService, event: NodeEvent, io: &mut NodeIo<'_>) {
    match event {
        NodeEvent::ButtonPressed => service.on_button(io),
        NodeEvent::Timer(id) => service.on_timer(id, io),
        NodeEvent::Broadcast { from, payload } => service.on_broadcast(from, &payload, io),
        NodeEvent::Unicast { from, payload } => service.on_unicast(from, &payload, io),
        NodeEvent::Link(report) => log_link_report(&report),
    }
}

/// Log a payload a receiver could not decode.  It is dropped.
pub(crate) fn log_decode_failure(me: NodeIdentity, from: NodeAddr, err: CodecError) {
    warn!("{me}: dropping payload from {from}: {err}");
}

/// Log a timer that fired on a node that does not use it.
pub(crate) fn log_stray_timer(me: NodeIdentity, timer: TimerId) {
    debug!("{me}: ignoring timer {timer:?}");
}

// ───────────────────────────────────────────────────────────────
// Host
// ───────────────────────────────────────────────────────────────

/// One node with its board, radio, console, timers and event queue.
pub struct NodeHost<N, H, R, S> {
    pub service: N,
    pub hw: H,
    pub radio: R,
    pub sink: S,
    timers: Scheduler,
    queue: EventQueue,
}

impl<N, H, R, S> NodeHost<N, H, R, S>
where
    N: NodeService,
    H: Hardware,
    R: Radio,
    S: EventSink,
{
    pub fn new(service: N, hw: H, radio: R, sink: S) -> Self {
        Self {
            service,
            hw,
            radio,
            sink,
            timers: Scheduler::new(),
            queue: EventQueue::new(),
        }
    }

    pub fn identity(&self) -> NodeIdentity {
        self.service.identity()
    }

    pub fn timers(&self) -> &Scheduler {
        &self.timers
    }

    /// Run the service's boot handler.
    pub fn start(&mut self, now: Millis) {
        self.sink.emit(&AppEvent::Started(self.service.identity()));
        let mut io = NodeIo {
            now,
            hw: &mut self.hw,
            radio: &mut self.radio,
            sink: &mut self.sink,
            timers: &mut self.timers,
        };
        self.service.start(&mut io);
    }

    /// Queue an external event (button, reception, link report).
    pub fn post(&mut self, event: NodeEvent) -> Result<()> {
        self.queue.push(event)
    }

    /// Move expired timers into the queue.
    pub fn fire_timers(&mut self, now: Millis) -> usize {
        self.timers.tick(now, &mut self.queue)
    }

    /// Handle every queued event in order.  Returns how many ran.
    pub fn run(&mut self, now: Millis) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.pop() {
            let mut io = NodeIo {
                now,
                hw: &mut self.hw,
                radio: &mut self.radio,
                sink: &mut self.sink,
                timers: &mut self.timers,
            };
            dispatch(&mut self.service, event, &mut io);
            handled += 1;
        }
        handled
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }
}

/// Bench rig for handler unit tests: a simulated board, an outbox and an
/// event recorder wired into a [`NodeIo`].
#[cfg(test)]
pub(crate) struct Rig {
    pub now: Millis,
    pub hw: crate::adapters::SimHardware,
    pub radio: crate::mesh::Outbox,
    pub sink: crate::adapters::EventLog,
    pub timers: Scheduler,
}

#[cfg(test)]
impl Rig {
    pub fn new() -> Self {
        Self {
            now: 0,
            hw: crate::adapters::SimHardware::new(),
            radio: crate::mesh::Outbox::new(),
            sink: crate::adapters::EventLog::new(),
            timers: Scheduler::new(),
        }
    }

    pub fn io(&mut self) -> NodeIo<'_> {
        self.hw.set_clock(self.now);
        NodeIo {
            now: self.now,
            hw: &mut self.hw,
            radio: &mut self.radio,
            sink: &mut self.sink,
            timers: &mut self.timers,
        }
    }

    /// Advance to `at` and return the timers that expired on the way.
    pub fn advance(&mut self, at: Millis) -> Vec<TimerId> {
        let mut queue = EventQueue::new();
        self.now = at;
        self.timers.tick(at, &mut queue);
        let mut fired = Vec::new();
        while let Some(NodeEvent::Timer(id)) = queue.pop() {
            fired.push(id);
        }
        fired
    }
}
