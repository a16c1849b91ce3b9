//! Outbound application events.
//!
//! Node services emit these through the [`EventSink`](super::ports::EventSink)
//! port.  They are the operator-facing console stream: the menu, ack
//! reports, sensor values and state transitions.  Adapters on the other
//! side decide what to do with them (log to the console, record them in
//! a test, etc.).

use super::commands::{Command, Menu, RejectReason};
use crate::control::comfort::ComfortStatus;
use crate::mesh::{NodeAddr, NodeIdentity};
use crate::node::alarm::{AlarmOutcome, AlarmState};
use crate::node::gate::GateState;

/// Which half of the opening sequence a signal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opening {
    GateOpening,
    GateClosed,
    DoorOpening,
    DoorClosed,
}

/// Structured events emitted by node services.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The node service has started.
    Started(NodeIdentity),

    // ── Coordinator console ───────────────────────────────────
    /// Currently selectable commands.
    Menu(Menu),
    /// A burst finalized to a valid command.
    CommandSelected(Command),
    /// A burst was refused by a guard.
    CommandRejected { count: u16, reason: RejectReason },
    /// Acknowledgment collected inside the wait window.
    AckReceived(NodeAddr),
    /// Expected acknowledgment missing at the end of the wait window.
    AckMissing(NodeAddr),
    /// Success indicator decided after an activation.
    AlarmOutcome(AlarmOutcome),
    /// Coordinator broadcast the opening trigger.
    OpeningRequested,
    /// Coordinator's opening mirror ran out.
    OpeningFinished,
    /// Integer reply from the entrance node.
    TemperatureAverage(i32),
    /// Integer reply from the gate node.
    ExternalLight(i32),

    // ── Shared by several roles ───────────────────────────────
    /// Local alarm state changed.
    AlarmChanged(AlarmState),
    /// Local gate state changed.
    GateChanged(GateState),

    // ── Peripherals ───────────────────────────────────────────
    /// Opening sequence milestone on the gate or the door.
    Opening(Opening),
    /// A fresh temperature reading was taken.
    TemperatureSampled(i32),
    /// Entrance garden lights switched.
    GardenLights(bool),
    /// Bedroom comfort mode switched.
    ComfortChanged(ComfortStatus),
    /// Bedroom air conditioner switched by the hysteresis loop.
    AirConditioner(bool),
}
