//! Alarm activation: the coordinator's broadcast-and-collect side and the
//! peripherals' blink-and-acknowledge side.
//!
//! The coordinator flips its own state before anything is sent and never
//! corrects it; acknowledgments only feed the success indicator.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::Leds;
use crate::config::{SystemConfig, secs};
use crate::mesh::{Message, NodeAddr, RadioExt};
use crate::scheduler::{CancellableLoop, Millis, TimerId};

use super::NodeIo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmState {
    #[default]
    Inactive,
    Active,
}

impl AlarmState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Inactive => Self::Active,
            Self::Active => Self::Inactive,
        }
    }
}

/// Success indicator shown after an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmOutcome {
    /// Both peripherals acknowledged: green on, red off.
    Ok,
    /// At least one acknowledgment missing: red on, green off.
    Failure,
}

// ───────────────────────────────────────────────────────────────
// Acknowledgment tracking
// ───────────────────────────────────────────────────────────────

/// Two acknowledgment slots and the deadline for filling them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckTracker {
    slots: [(NodeAddr, bool); 2],
    deadline: Millis,
}

impl AckTracker {
    pub fn new(peers: [NodeAddr; 2], deadline: Millis) -> Self {
        Self {
            slots: [(peers[0], false), (peers[1], false)],
            deadline,
        }
    }

    /// Mark `from` as received.  Returns `false` if `from` is not expected.
    pub fn record(&mut self, from: NodeAddr) -> bool {
        match self.slots.iter_mut().find(|(peer, _)| *peer == from) {
            Some(slot) => {
                slot.1 = true;
                true
            }
            None => false,
        }
    }

    pub fn received(&self, peer: NodeAddr) -> bool {
        self.slots.iter().any(|&(p, got)| p == peer && got)
    }

    pub fn missing(&self) -> impl Iterator<Item = NodeAddr> + '_ {
        self.slots.iter().filter(|(_, got)| !got).map(|(p, _)| *p)
    }

    pub fn all_received(&self) -> bool {
        self.slots.iter().all(|(_, got)| *got)
    }

    pub fn deadline(&self) -> Millis {
        self.deadline
    }
}

// ───────────────────────────────────────────────────────────────
// Coordinator side
// ───────────────────────────────────────────────────────────────

pub struct AlarmCoordinator {
    state: AlarmState,
    peers: [NodeAddr; 2],
    tracker: Option<AckTracker>,
    wait_ms: Millis,
}

impl AlarmCoordinator {
    pub fn new(peers: [NodeAddr; 2], cfg: &SystemConfig) -> Self {
        Self {
            state: AlarmState::Inactive,
            peers,
            tracker: None,
            wait_ms: secs(cfg.alarm_ack_wait_secs),
        }
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Open acknowledgment window, if any.
    pub fn tracker(&self) -> Option<&AckTracker> {
        self.tracker.as_ref()
    }

    /// Flip the alarm, broadcast the transition and open a fresh
    /// acknowledgment window.  A window still open is discarded.
    pub fn toggle(&mut self, io: &mut NodeIo<'_>) -> AlarmState {
        self.state = self.state.toggled();
        let msg = match self.state {
            AlarmState::Active => Message::AlarmOn,
            AlarmState::Inactive => Message::AlarmOff,
        };
        io.radio.broadcast_msg(msg);
        self.tracker = Some(AckTracker::new(self.peers, io.now + self.wait_ms));
        io.timers.set(TimerId::AlarmAckWait, io.now, self.wait_ms);
        info!("alarm -> {:?}, waiting for acks", self.state);
        io.sink.emit(&AppEvent::AlarmChanged(self.state));
        self.state
    }

    /// Acknowledgment from `from`.  Ignored outside an open window.
    pub fn on_ack(&mut self, from: NodeAddr, io: &mut NodeIo<'_>) {
        match self.tracker.as_mut().map(|t| t.record(from)) {
            Some(true) => io.sink.emit(&AppEvent::AckReceived(from)),
            Some(false) => debug!("ack from unexpected peer {from}"),
            None => debug!("late ack from {from} ignored"),
        }
    }

    /// Close the window: report missing peers and, after an activation
    /// only, show the success indicator.
    pub fn on_wait_expired(&mut self, io: &mut NodeIo<'_>) -> Option<AlarmOutcome> {
        let tracker = self.tracker.take()?;
        for peer in tracker.missing() {
            io.sink.emit(&AppEvent::AckMissing(peer));
        }
        if self.state != AlarmState::Active {
            return None;
        }
        let outcome = if tracker.all_received() {
            io.hw.on(Leds::GREEN);
            io.hw.off(Leds::RED);
            AlarmOutcome::Ok
        } else {
            io.hw.on(Leds::RED);
            io.hw.off(Leds::GREEN);
            AlarmOutcome::Failure
        };
        info!("alarm activation outcome {outcome:?}");
        io.sink.emit(&AppEvent::AlarmOutcome(outcome));
        Some(outcome)
    }
}

// ───────────────────────────────────────────────────────────────
// Peripheral side
// ───────────────────────────────────────────────────────────────

pub struct AlarmResponder {
    state: AlarmState,
    /// Indicator pattern to restore on deactivation.
    saved: Option<Leds>,
    blink: CancellableLoop,
    blink_ms: Millis,
    max_retransmissions: u8,
}

impl AlarmResponder {
    pub fn new(cfg: &SystemConfig) -> Self {
        Self {
            state: AlarmState::Inactive,
            saved: None,
            blink: CancellableLoop::Stopped,
            blink_ms: secs(cfg.alarm_blink_interval_secs),
            max_retransmissions: cfg.max_retransmissions,
        }
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == AlarmState::Active
    }

    pub fn saved(&self) -> Option<Leds> {
        self.saved
    }

    /// Pattern that deactivation will restore.  Only present while active.
    pub fn saved_mut(&mut self) -> Option<&mut Leds> {
        self.saved.as_mut()
    }

    pub fn on_alarm_on(&mut self, io: &mut NodeIo<'_>) {
        if self.is_active() {
            debug!("ALARM_ON while active ignored");
            return;
        }
        self.saved = Some(io.hw.get());
        self.state = AlarmState::Active;
        io.hw.on(Leds::ALL);
        self.blink.start();
        io.timers.set(TimerId::AlarmBlink, io.now, self.blink_ms);
        io.sink.emit(&AppEvent::AlarmChanged(self.state));
        self.ack(io);
    }

    pub fn on_alarm_off(&mut self, io: &mut NodeIo<'_>) {
        self.state = AlarmState::Inactive;
        self.blink.cancel();
        io.sink.emit(&AppEvent::AlarmChanged(self.state));
        self.ack(io);
        match self.saved.take() {
            Some(leds) => io.hw.set(leds),
            None => debug!("ALARM_OFF with nothing to restore"),
        }
    }

    pub fn on_blink_tick(&mut self, io: &mut NodeIo<'_>) {
        if self.blink.on_tick() {
            io.hw.toggle(Leds::ALL);
            io.timers.reset(TimerId::AlarmBlink);
        }
    }

    fn ack(&self, io: &mut NodeIo<'_>) {
        io.radio
            .send_msg(NodeAddr::COORDINATOR, Message::AlarmAck, self.max_retransmissions);
    }
}
