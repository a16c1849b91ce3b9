//! Gate node (address 2): lock state, the gate half of the opening
//! sequence, external light replies and the alarm responder.
//!
//! | Indicator | Meaning                               |
//! |-----------|---------------------------------------|
//! | Red       | Gate locked                           |
//! | Green     | Gate unlocked                         |
//! | Blue      | Blinks every tick while gate opening  |

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app::events::{AppEvent, Opening};
use crate::app::ports::Leds;
use crate::config::SystemConfig;
use crate::mesh::{Message, NodeAddr, NodeIdentity, Role, codec};
use crate::scheduler::TimerId;

use super::alarm::AlarmResponder;
use super::opening::OpeningSequencer;
use super::{NodeIo, NodeService, log_decode_failure, log_stray_timer, query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GateState {
    #[default]
    Locked,
    Unlocked,
}

impl GateState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Locked => Self::Unlocked,
            Self::Unlocked => Self::Locked,
        }
    }

    /// Request that moves the gate node into this state.
    pub fn request(self) -> Message {
        match self {
            Self::Locked => Message::LockGate,
            Self::Unlocked => Message::UnlockGate,
        }
    }
}

pub struct GateNode {
    cfg: SystemConfig,
    alarm: AlarmResponder,
    gate: GateState,
    opening: OpeningSequencer,
}

impl GateNode {
    pub fn new(cfg: &SystemConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            alarm: AlarmResponder::new(cfg),
            gate: GateState::Locked,
            opening: OpeningSequencer::new(cfg),
        }
    }

    pub fn gate(&self) -> GateState {
        self.gate
    }

    pub fn alarm(&self) -> &AlarmResponder {
        &self.alarm
    }

    pub fn opening(&self) -> &OpeningSequencer {
        &self.opening
    }

    fn apply_gate(&mut self, state: GateState, io: &mut NodeIo<'_>) {
        self.gate = state;
        match state {
            GateState::Locked => {
                io.hw.on(Leds::RED);
                io.hw.off(Leds::GREEN);
            }
            GateState::Unlocked => {
                io.hw.on(Leds::GREEN);
                io.hw.off(Leds::RED);
            }
        }
        info!("gate {state:?}");
        io.sink.emit(&AppEvent::GateChanged(state));
    }
}

impl NodeService for GateNode {
    fn identity(&self) -> NodeIdentity {
        NodeIdentity::of(Role::Gate)
    }

    fn start(&mut self, io: &mut NodeIo<'_>) {
        match self.gate {
            GateState::Locked => io.hw.on(Leds::RED),
            GateState::Unlocked => io.hw.on(Leds::GREEN),
        }
    }

    fn on_button(&mut self, _io: &mut NodeIo<'_>) {
        debug!("{}: button has no function", self.identity());
    }

    fn on_timer(&mut self, timer: TimerId, io: &mut NodeIo<'_>) {
        match timer {
            TimerId::AlarmBlink => self.alarm.on_blink_tick(io),
            TimerId::OpeningStep => {
                if let Some(tick) = self.opening.tick(io) {
                    io.hw.toggle(Leds::BLUE);
                    if tick.is_last() {
                        io.sink.emit(&AppEvent::Opening(Opening::GateClosed));
                    }
                }
            }
            other => log_stray_timer(self.identity(), other),
        }
    }

    fn on_broadcast(&mut self, from: NodeAddr, payload: &[u8], io: &mut NodeIo<'_>) {
        match codec::decode_tagged(payload) {
            Ok(Message::AlarmOn) => self.alarm.on_alarm_on(io),
            Ok(Message::AlarmOff) => self.alarm.on_alarm_off(io),
            Ok(Message::OpenGateDoor) => {
                if self.opening.begin(io) {
                    io.sink.emit(&AppEvent::Opening(Opening::GateOpening));
                }
            }
            Ok(other) => debug!("{}: ignoring broadcast {other} from {from}", self.identity()),
            Err(e) => log_decode_failure(self.identity(), from, e),
        }
    }

    fn on_unicast(&mut self, from: NodeAddr, payload: &[u8], io: &mut NodeIo<'_>) {
        match codec::decode_tagged(payload) {
            Ok(Message::LockGate) => self.apply_gate(GateState::Locked, io),
            Ok(Message::UnlockGate) => self.apply_gate(GateState::Unlocked, io),
            Ok(Message::GetLight) => {
                let light = query::light_reply(io.hw, &self.cfg);
                info!("external light {light}");
                query::reply(io, light, self.cfg.max_retransmissions);
            }
            Ok(other) => debug!("{}: ignoring unicast {other} from {from}", self.identity()),
            Err(e) => log_decode_failure(self.identity(), from, e),
        }
    }
}
