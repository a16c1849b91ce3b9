//! Bedroom node (address 4): local comfort mode with air conditioner
//! hysteresis.  Does not take part in the alarm.

use log::debug;

use crate::config::{SystemConfig, secs};
use crate::control::comfort::{ComfortController, ComfortStatus};
use crate::mesh::{Message, NodeAddr, NodeIdentity, RadioExt, Role, codec};
use crate::scheduler::TimerId;

use super::{NodeIo, NodeService, log_decode_failure, log_stray_timer};

pub struct BedroomNode {
    comfort: ComfortController,
    tick_ms: u64,
    max_retransmissions: u8,
}

impl BedroomNode {
    pub fn new(cfg: &SystemConfig) -> Self {
        Self {
            comfort: ComfortController::new(cfg),
            tick_ms: secs(cfg.comfort_tick_secs),
            max_retransmissions: cfg.max_retransmissions,
        }
    }

    pub fn comfort(&self) -> &ComfortController {
        &self.comfort
    }

    fn switch_to(&mut self, status: ComfortStatus, io: &mut NodeIo<'_>) {
        match status {
            ComfortStatus::Active => {
                self.comfort.activate(io.hw, io.sink);
                io.timers.set(TimerId::ComfortTick, io.now, self.tick_ms);
            }
            ComfortStatus::Inactive => self.comfort.deactivate(io.hw, io.sink),
        }
    }
}

impl NodeService for BedroomNode {
    fn identity(&self) -> NodeIdentity {
        NodeIdentity::of(Role::Bedroom)
    }

    fn start(&mut self, io: &mut NodeIo<'_>) {
        self.comfort.show_status(io.hw);
    }

    fn on_button(&mut self, io: &mut NodeIo<'_>) {
        let next = self.comfort.status().toggled();
        self.switch_to(next, io);
        let notice = match next {
            ComfortStatus::Active => Message::ComfortStart,
            ComfortStatus::Inactive => Message::ComfortStop,
        };
        io.radio
            .send_msg(NodeAddr::COORDINATOR, notice, self.max_retransmissions);
    }

    fn on_timer(&mut self, timer: TimerId, io: &mut NodeIo<'_>) {
        match timer {
            TimerId::ComfortTick => {
                if self.comfort.on_tick(io.hw, io.sink) {
                    io.timers.reset(TimerId::ComfortTick);
                }
            }
            other => log_stray_timer(self.identity(), other),
        }
    }

    fn on_broadcast(&mut self, from: NodeAddr, payload: &[u8], _io: &mut NodeIo<'_>) {
        match codec::decode_tagged(payload) {
            Ok(msg) => debug!("{}: ignoring broadcast {msg} from {from}", self.identity()),
            Err(e) => log_decode_failure(self.identity(), from, e),
        }
    }

    fn on_unicast(&mut self, from: NodeAddr, payload: &[u8], io: &mut NodeIo<'_>) {
        let wanted = match codec::decode_tagged(payload) {
            Ok(Message::ComfortStart) => ComfortStatus::Active,
            Ok(Message::ComfortStop) => ComfortStatus::Inactive,
            Ok(other) => {
                debug!("{}: ignoring unicast {other} from {from}", self.identity());
                return;
            }
            Err(e) => {
                log_decode_failure(self.identity(), from, e);
                return;
            }
        };
        if wanted != self.comfort.status() {
            self.switch_to(wanted, io);
        }
    }
}
