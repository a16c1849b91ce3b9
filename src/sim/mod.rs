//! Discrete-event simulation of the whole house.
//!
//! ```text
//!            ┌──────────── SimNetwork ────────────┐
//!            │  clock ── pending deliveries (heap) │
//!            │               │                     │
//!   press ──▶│   ┌───────┬───┴───┬───────┐         │
//!            │   ▼       ▼       ▼       ▼         │
//!            │  1.0     2.0     3.0     4.0        │
//!            │   │ outboxes drained after each run │
//!            │   └──────────▶ LinkModel ───────────┘
//! ```
//!
//! Each node is a real [`NodeHost`] with simulated hardware, an [`Outbox`]
//! radio and an [`EventLog`] console.  At every instant the network first
//! expires node timers, then delivers button presses and frames due at
//! that instant in the order they were scheduled.

pub mod link;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, warn};

use crate::adapters::{EventLog, SimHardware};
use crate::config::SystemConfig;
use crate::events::NodeEvent;
use crate::mesh::{LinkReport, NodeAddr, NodeIdentity, Outbox, Role, Transmission};
use crate::node::{BedroomNode, Coordinator, EntranceNode, GateNode, NodeHost, NodeService};
use crate::scheduler::Millis;

pub use link::{LinkModel, UnicastFate};

/// Every address in the house, ascending.
pub const HOUSE: [NodeAddr; 4] = [
    NodeAddr::ENTRANCE,
    NodeAddr::GATE,
    NodeAddr::COORDINATOR,
    NodeAddr::BEDROOM,
];

pub type SimHost<N> = NodeHost<N, SimHardware, Outbox, EventLog>;

/// Role-erased view of a simulated node.
pub trait SimNode {
    fn identity(&self) -> NodeIdentity;
    fn boot(&mut self, now: Millis);
    /// Expire due timers and handle them.
    fn expire(&mut self, now: Millis);
    /// Queue one event and handle it.
    fn deliver(&mut self, event: NodeEvent, now: Millis);
    fn next_deadline(&self) -> Option<Millis>;
    fn take_outbox(&mut self) -> Vec<Transmission>;
    fn board(&self) -> &SimHardware;
    fn board_mut(&mut self) -> &mut SimHardware;
    fn log(&self) -> &EventLog;
}

impl<N: NodeService> SimNode for SimHost<N> {
    fn identity(&self) -> NodeIdentity {
        self.service.identity()
    }

    fn boot(&mut self, now: Millis) {
        self.hw.set_clock(now);
        self.start(now);
    }

    fn expire(&mut self, now: Millis) {
        self.hw.set_clock(now);
        if self.fire_timers(now) > 0 {
            self.run(now);
        }
    }

    fn deliver(&mut self, event: NodeEvent, now: Millis) {
        self.hw.set_clock(now);
        match self.post(event) {
            Ok(()) => {
                self.run(now);
            }
            Err(e) => warn!("{}: event lost: {e}", self.service.identity()),
        }
    }

    fn next_deadline(&self) -> Option<Millis> {
        self.timers().next_deadline()
    }

    fn take_outbox(&mut self) -> Vec<Transmission> {
        self.radio.drain()
    }

    fn board(&self) -> &SimHardware {
        &self.hw
    }

    fn board_mut(&mut self) -> &mut SimHardware {
        &mut self.hw
    }

    fn log(&self) -> &EventLog {
        &self.sink
    }
}

/// An event waiting for its instant.  Ordered earliest first, then FIFO.
struct Scheduled {
    at: Millis,
    seq: u64,
    to: NodeAddr,
    event: NodeEvent,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.seq) == (other.at, other.seq)
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        (other.at, other.seq).cmp(&(self.at, self.seq))
    }
}

pub struct SimNetwork {
    now: Millis,
    entrance: SimHost<EntranceNode>,
    gate: SimHost<GateNode>,
    coordinator: SimHost<Coordinator>,
    bedroom: SimHost<BedroomNode>,
    pending: BinaryHeap<Scheduled>,
    seq: u64,
    link: LinkModel,
}

fn sim_host<N: NodeService>(service: N) -> SimHost<N> {
    let console = EventLog::with_console(service.identity());
    NodeHost::new(service, SimHardware::new(), Outbox::new(), console)
}

impl SimNetwork {
    /// Build the house and boot every node at time zero.
    pub fn new(cfg: &SystemConfig) -> Self {
        let mut net = Self {
            now: 0,
            entrance: sim_host(EntranceNode::new(cfg)),
            gate: sim_host(GateNode::new(cfg)),
            coordinator: sim_host(Coordinator::new(cfg)),
            bedroom: sim_host(BedroomNode::new(cfg)),
            pending: BinaryHeap::new(),
            seq: 0,
            link: LinkModel::new(&cfg.link),
        };
        for addr in HOUSE {
            if let Some(node) = net.node_mut(addr) {
                node.boot(0);
            }
        }
        net.flush(0);
        net
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn node(&self, addr: NodeAddr) -> Option<&dyn SimNode> {
        match addr {
            NodeAddr::ENTRANCE => Some(&self.entrance),
            NodeAddr::GATE => Some(&self.gate),
            NodeAddr::COORDINATOR => Some(&self.coordinator),
            NodeAddr::BEDROOM => Some(&self.bedroom),
            _ => None,
        }
    }

    pub fn node_mut(&mut self, addr: NodeAddr) -> Option<&mut dyn SimNode> {
        match addr {
            NodeAddr::ENTRANCE => Some(&mut self.entrance),
            NodeAddr::GATE => Some(&mut self.gate),
            NodeAddr::COORDINATOR => Some(&mut self.coordinator),
            NodeAddr::BEDROOM => Some(&mut self.bedroom),
            _ => None,
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator.service
    }

    pub fn entrance(&self) -> &EntranceNode {
        &self.entrance.service
    }

    pub fn gate(&self) -> &GateNode {
        &self.gate.service
    }

    pub fn bedroom(&self) -> &BedroomNode {
        &self.bedroom.service
    }

    fn host(&self, role: Role) -> &dyn SimNode {
        match role {
            Role::Entrance => &self.entrance,
            Role::Gate => &self.gate,
            Role::Coordinator => &self.coordinator,
            Role::Bedroom => &self.bedroom,
        }
    }

    fn host_mut(&mut self, role: Role) -> &mut dyn SimNode {
        match role {
            Role::Entrance => &mut self.entrance,
            Role::Gate => &mut self.gate,
            Role::Coordinator => &mut self.coordinator,
            Role::Bedroom => &mut self.bedroom,
        }
    }

    /// Simulated board of the node playing `role`.
    pub fn hardware(&self, role: Role) -> &SimHardware {
        self.host(role).board()
    }

    pub fn hardware_mut(&mut self, role: Role) -> &mut SimHardware {
        self.host_mut(role).board_mut()
    }

    /// Console stream of the node playing `role`.
    pub fn log(&self, role: Role) -> &EventLog {
        self.host(role).log()
    }

    pub fn set_link_loss(&mut self, from: NodeAddr, to: NodeAddr, loss: f64) {
        self.link.set_loss(from, to, loss);
    }

    /// Press the button of `addr` at time `at` (clamped to now).
    pub fn press(&mut self, addr: NodeAddr, at: Millis) {
        let at = at.max(self.now);
        self.schedule(at, addr, NodeEvent::ButtonPressed);
    }

    /// Press `times` times, `gap` ms apart, starting at `at`.
    pub fn press_burst(&mut self, addr: NodeAddr, at: Millis, times: u8, gap: Millis) {
        for i in 0..u64::from(times) {
            self.press(addr, at + i * gap);
        }
    }

    /// Process everything up to and including `until`.
    pub fn run_until(&mut self, until: Millis) {
        while let Some(at) = self.next_instant().filter(|&at| at <= until) {
            self.step(at.max(self.now));
        }
        self.now = self.now.max(until);
    }

    pub fn run_for(&mut self, duration: Millis) {
        self.run_until(self.now + duration);
    }

    fn next_instant(&self) -> Option<Millis> {
        let timers = HOUSE
            .iter()
            .filter_map(|&a| self.node(a).and_then(|n| n.next_deadline()))
            .min();
        let queued = self.pending.peek().map(|s| s.at);
        match (timers, queued) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn step(&mut self, at: Millis) {
        self.now = at;
        for addr in HOUSE {
            if let Some(node) = self.node_mut(addr) {
                node.expire(at);
            }
        }
        self.flush(at);

        while self.pending.peek().is_some_and(|s| s.at <= at) {
            let Some(item) = self.pending.pop() else {
                break;
            };
            if let Some(node) = self.node_mut(item.to) {
                node.deliver(item.event, at);
            }
            self.flush(at);
        }
    }

    fn schedule(&mut self, at: Millis, to: NodeAddr, event: NodeEvent) {
        self.seq += 1;
        self.pending.push(Scheduled {
            at,
            seq: self.seq,
            to,
            event,
        });
    }

    /// Put every queued transmission on the air.
    fn flush(&mut self, now: Millis) {
        for from in HOUSE {
            let sent = match self.node_mut(from) {
                Some(node) => node.take_outbox(),
                None => continue,
            };
            for tx in sent {
                self.transmit(from, tx, now);
            }
        }
    }

    fn transmit(&mut self, from: NodeAddr, tx: Transmission, now: Millis) {
        match tx {
            Transmission::Broadcast(payload) => {
                for to in HOUSE.into_iter().filter(|&to| to != from) {
                    match self.link.broadcast(from, to) {
                        Some(after) => self.schedule(
                            now + after,
                            to,
                            NodeEvent::Broadcast {
                                from,
                                payload: payload.clone(),
                            },
                        ),
                        None => debug!("broadcast {from} -> {to} lost"),
                    }
                }
            }
            Transmission::Unicast {
                dest,
                payload,
                max_retransmissions,
            } => {
                if dest == from || self.node(dest).is_none() {
                    warn!("unicast from {from} to unknown peer {dest} dropped");
                    return;
                }
                match self.link.unicast(from, dest, max_retransmissions) {
                    UnicastFate::Delivered {
                        after,
                        retransmissions,
                    } => {
                        self.schedule(now + after, dest, NodeEvent::Unicast { from, payload });
                        self.schedule(
                            now + after,
                            from,
                            NodeEvent::Link(LinkReport::Sent {
                                to: dest,
                                retransmissions,
                            }),
                        );
                    }
                    UnicastFate::TimedOut { after } => self.schedule(
                        now + after,
                        from,
                        NodeEvent::Link(LinkReport::TimedOut {
                            to: dest,
                            retransmissions: max_retransmissions,
                        }),
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::commands::Command;
    use crate::app::events::AppEvent;
    use crate::app::ports::Leds;
    use crate::node::gate::GateState;

    #[test]
    fn boots_with_initial_indicators() {
        let net = SimNetwork::new(&SystemConfig::default());
        assert_eq!(net.hardware(Role::Entrance).lit(), Leds::RED);
        assert_eq!(net.hardware(Role::Gate).lit(), Leds::RED);
        assert_eq!(net.hardware(Role::Bedroom).lit(), Leds::RED);
        assert!(matches!(
            net.log(Role::Coordinator).events(),
            [AppEvent::Started(_), AppEvent::Menu(_)]
        ));
    }

    #[test]
    fn scheduled_items_pop_earliest_then_fifo() {
        let mut heap = BinaryHeap::new();
        for (at, seq) in [(5, 1), (3, 2), (5, 3), (3, 4)] {
            heap.push(Scheduled {
                at,
                seq,
                to: NodeAddr::GATE,
                event: NodeEvent::ButtonPressed,
            });
        }
        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|s| (s.at, s.seq))).collect();
        assert_eq!(order, vec![(3, 2), (3, 4), (5, 1), (5, 3)]);
    }

    #[test]
    fn press_on_window_expiry_starts_new_burst() {
        let mut net = SimNetwork::new(&SystemConfig::default());
        net.press(NodeAddr::COORDINATOR, 1_000);
        net.press(NodeAddr::COORDINATOR, 5_000);
        net.run_until(5_000);
        // The first burst closed at 5 s before the second press landed.
        assert_eq!(net.coordinator().pending_presses(), 1);
        assert!(net.log(Role::Coordinator).contains(&AppEvent::CommandSelected(Command::ToggleAlarm)));
    }

    #[test]
    fn lost_lock_request_leaves_views_diverged() {
        let mut net = SimNetwork::new(&SystemConfig::default());
        net.set_link_loss(NodeAddr::COORDINATOR, NodeAddr::GATE, 1.0);
        net.press_burst(NodeAddr::COORDINATOR, 0, 2, 200);
        net.run_until(10_000);
        // Lock request never arrived; the coordinator still believes it.
        assert_eq!(net.gate().gate(), GateState::Locked);
        assert_eq!(net.coordinator().gate(), GateState::Unlocked);
    }
}
