//! Event sink adapters.
//!
//! [`LogEventSink`] writes structured application events to the `log`
//! facade, which is the node's console.  [`EventLog`] keeps them in
//! memory (optionally forwarding to the console as well) so the
//! simulator and tests can inspect what a node reported.

use log::{info, warn};

use crate::app::events::{AppEvent, Opening};
use crate::app::ports::EventSink;
use crate::mesh::NodeIdentity;
use crate::node::alarm::{AlarmOutcome, AlarmState};
use crate::node::gate::GateState;
use crate::control::comfort::ComfortStatus;

/// Adapter that logs every [`AppEvent`] to the console.
pub struct LogEventSink {
    node: NodeIdentity,
}

impl LogEventSink {
    pub fn new(node: NodeIdentity) -> Self {
        Self { node }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let node = self.node;
        match event {
            AppEvent::Started(id) => info!("{node} | START | {id} online"),
            AppEvent::Menu(menu) => info!("{node} | MENU | {menu}"),
            AppEvent::CommandSelected(cmd) => {
                info!("{node} | CMD | Command selected: {}", cmd.number())
            }
            AppEvent::CommandRejected { count, reason } => {
                info!("{node} | CMD | Command not allowed ({count}): {reason}")
            }
            AppEvent::AckReceived(from) => info!("{node} | ACK | received ALARM ACK from {from}"),
            AppEvent::AckMissing(from) => {
                warn!("{node} | ACK | ALARM ACK from {from} NOT RECEIVED!")
            }
            AppEvent::AlarmOutcome(outcome) => match outcome {
                AlarmOutcome::Ok => info!("{node} | ALARM | activation acknowledged by all"),
                AlarmOutcome::Failure => warn!("{node} | ALARM | activation may have failed"),
            },
            AppEvent::OpeningRequested => info!("{node} | OPEN | OPENING GATE and DOOR ..."),
            AppEvent::OpeningFinished => info!("{node} | OPEN | gate and door cycle over"),
            AppEvent::TemperatureAverage(v) => info!("{node} | TEMP | Temperature Average: {v}"),
            AppEvent::ExternalLight(v) => info!("{node} | LIGHT | External Light: {v}"),
            AppEvent::AlarmChanged(state) => match state {
                AlarmState::Active => info!("{node} | ALARM | ACTIVATING ALARM..."),
                AlarmState::Inactive => info!("{node} | ALARM | DEACTIVATING ALARM..."),
            },
            AppEvent::GateChanged(state) => match state {
                GateState::Locked => info!("{node} | GATE | LOCKING GATE..."),
                GateState::Unlocked => info!("{node} | GATE | UNLOCKING GATE..."),
            },
            AppEvent::Opening(step) => match step {
                Opening::GateOpening => info!("{node} | OPEN | GATE OPENING ..."),
                Opening::GateClosed => info!("{node} | OPEN | GATE CLOSED!"),
                Opening::DoorOpening => info!("{node} | OPEN | DOOR OPENING..."),
                Opening::DoorClosed => info!("{node} | OPEN | DOOR CLOSED!"),
            },
            AppEvent::TemperatureSampled(c) => info!("{node} | TEMP | Temperature {c}"),
            AppEvent::GardenLights(on) => info!(
                "{node} | LIGHTS | TURNING {} GARDEN LIGHTS",
                if *on { "ON" } else { "OFF" }
            ),
            AppEvent::ComfortChanged(status) => match status {
                ComfortStatus::Active => info!("{node} | COMFORT | COMFORT ACTIVATED"),
                ComfortStatus::Inactive => info!("{node} | COMFORT | COMFORT DEACTIVATED"),
            },
            AppEvent::AirConditioner(on) => info!(
                "{node} | COMFORT | air conditioner {}",
                if *on { "ON" } else { "OFF" }
            ),
        }
    }
}

/// In-memory event recorder.
pub struct EventLog {
    events: Vec<AppEvent>,
    console: Option<LogEventSink>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            console: None,
        }
    }

    /// Record and also print through a [`LogEventSink`].
    pub fn with_console(node: NodeIdentity) -> Self {
        Self {
            events: Vec::new(),
            console: Some(LogEventSink::new(node)),
        }
    }

    pub fn events(&self) -> &[AppEvent] {
        &self.events
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        if let Some(console) = &mut self.console {
            console.emit(event);
        }
        self.events.push(event.clone());
    }
}
