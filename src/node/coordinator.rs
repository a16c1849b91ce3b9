//! Coordinator node (address 3): operator console.
//!
//! ```text
//!   button ──▶ CommandAccumulator ──(4 s quiet)──▶ select ──▶ Command
//!                                                    │
//!            ┌──────────┬──────────┬─────────────────┼──────────┐
//!            ▼          ▼          ▼                 ▼          ▼
//!      1 alarm     2 gate     3 open gate/door   4 temp     5 light
//!      broadcast   unicast    broadcast          unicast    unicast
//! ```
//!
//! Integer replies are attributed by sender address alone.  Any other
//! tagged unicast (including the bedroom's comfort notices) is dropped.

use log::{debug, info};

use crate::app::commands::{Command, Menu, select};
use crate::app::events::AppEvent;
use crate::config::{SystemConfig, secs};
use crate::drivers::button::{CommandAccumulator, WindowAction};
use crate::mesh::codec::{self, Inbound};
use crate::mesh::{Message, NodeAddr, NodeIdentity, RadioExt, ReplyKind, ReplyTable, Role};
use crate::scheduler::TimerId;

use super::alarm::{AlarmCoordinator, AlarmState};
use super::gate::GateState;
use super::opening::OpeningSequencer;
use super::{NodeIo, NodeService, log_decode_failure, log_stray_timer, query};

pub struct Coordinator {
    cfg: SystemConfig,
    accumulator: CommandAccumulator,
    alarm: AlarmCoordinator,
    gate: GateState,
    opening: OpeningSequencer,
    replies: ReplyTable,
}

impl Coordinator {
    pub fn new(cfg: &SystemConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            accumulator: CommandAccumulator::new(),
            alarm: AlarmCoordinator::new([NodeAddr::ENTRANCE, NodeAddr::GATE], cfg),
            gate: GateState::Locked,
            opening: OpeningSequencer::new(cfg),
            replies: ReplyTable::house(),
        }
    }

    pub fn alarm(&self) -> &AlarmCoordinator {
        &self.alarm
    }

    pub fn alarm_state(&self) -> AlarmState {
        self.alarm.state()
    }

    pub fn gate(&self) -> GateState {
        self.gate
    }

    pub fn opening_active(&self) -> bool {
        self.opening.is_active()
    }

    /// Presses collected in the current burst.
    pub fn pending_presses(&self) -> u16 {
        self.accumulator.pending()
    }

    pub fn menu(&self) -> Menu {
        Menu::available(self.alarm.state(), self.gate, self.opening.is_active())
    }

    fn show_menu(&self, io: &mut NodeIo<'_>) {
        io.sink.emit(&AppEvent::Menu(self.menu()));
    }

    fn on_window_closed(&mut self, io: &mut NodeIo<'_>) {
        let Some(count) = self.accumulator.finalize() else {
            debug!("input window closed with no presses");
            return;
        };
        match select(count, self.alarm.state(), self.opening.is_active()) {
            Ok(command) => {
                info!("command {} selected", command.number());
                io.sink.emit(&AppEvent::CommandSelected(command));
                self.execute(command, io);
            }
            Err(reason) => {
                info!("burst of {count} rejected: {reason}");
                io.sink.emit(&AppEvent::CommandRejected { count, reason });
            }
        }
        self.show_menu(io);
    }

    fn execute(&mut self, command: Command, io: &mut NodeIo<'_>) {
        let retx = self.cfg.max_retransmissions;
        match command {
            Command::ToggleAlarm => {
                self.alarm.toggle(io);
            }
            Command::ToggleGateLock => {
                self.gate = self.gate.toggled();
                io.radio.send_msg(NodeAddr::GATE, self.gate.request(), retx);
                io.sink.emit(&AppEvent::GateChanged(self.gate));
            }
            Command::OpenGateAndDoor => {
                if self.opening.begin(io) {
                    io.radio.broadcast_msg(Message::OpenGateDoor);
                    io.sink.emit(&AppEvent::OpeningRequested);
                }
            }
            Command::QueryTemperature => query::request_temperature(io, retx),
            Command::QueryLight => query::request_light(io, retx),
        }
    }
}

impl NodeService for Coordinator {
    fn identity(&self) -> NodeIdentity {
        NodeIdentity::of(Role::Coordinator)
    }

    fn start(&mut self, io: &mut NodeIo<'_>) {
        self.show_menu(io);
    }

    fn on_button(&mut self, io: &mut NodeIo<'_>) {
        match self.accumulator.press() {
            WindowAction::Start => {
                io.timers
                    .set(TimerId::InputWindow, io.now, secs(self.cfg.input_window_secs));
            }
            WindowAction::Restart => {
                io.timers.restart(TimerId::InputWindow, io.now);
            }
        }
        debug!("press {} collected", self.accumulator.pending());
    }

    fn on_timer(&mut self, timer: TimerId, io: &mut NodeIo<'_>) {
        match timer {
            TimerId::InputWindow => self.on_window_closed(io),
            TimerId::AlarmAckWait => {
                self.alarm.on_wait_expired(io);
            }
            TimerId::OpeningStep => {
                if self.opening.tick(io).is_some_and(|t| t.is_last()) {
                    io.sink.emit(&AppEvent::OpeningFinished);
                    self.show_menu(io);
                }
            }
            other => log_stray_timer(self.identity(), other),
        }
    }

    fn on_broadcast(&mut self, from: NodeAddr, payload: &[u8], _io: &mut NodeIo<'_>) {
        debug!(
            "{}: ignoring {} byte broadcast from {from}",
            self.identity(),
            payload.len()
        );
    }

    fn on_unicast(&mut self, from: NodeAddr, payload: &[u8], io: &mut NodeIo<'_>) {
        match codec::decode_inbound(from, payload, &self.replies) {
            Ok(Inbound::Ack { from }) => self.alarm.on_ack(from, io),
            Ok(Inbound::Reply { kind, value, .. }) => {
                let event = match kind {
                    ReplyKind::TemperatureAverage => AppEvent::TemperatureAverage(value),
                    ReplyKind::ExternalLight => AppEvent::ExternalLight(value),
                };
                info!("{kind:?} from {from}: {value}");
                io.sink.emit(&event);
            }
            Ok(Inbound::Tagged { msg, .. }) => {
                debug!("{}: no handler for {msg} from {from}", self.identity());
            }
            Err(e) => log_decode_failure(self.identity(), from, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::commands::RejectReason;
    use crate::app::ports::Leds;
    use crate::mesh::Transmission;
    use crate::node::Rig;

    fn started() -> (Rig, Coordinator) {
        let mut rig = Rig::new();
        let mut node = Coordinator::new(&SystemConfig::default());
        node.start(&mut rig.io());
        (rig, node)
    }

    fn press_at(rig: &mut Rig, node: &mut Coordinator, at: u64) {
        run_to(rig, node, at);
        node.on_button(&mut rig.io());
    }

    fn run_to(rig: &mut Rig, node: &mut Coordinator, at: u64) {
        for id in rig.advance(at) {
            node.on_timer(id, &mut rig.io());
        }
    }

    fn selected(rig: &Rig) -> Vec<Command> {
        rig.sink
            .events()
            .iter()
            .filter_map(|e| match e {
                AppEvent::CommandSelected(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn prints_menu_at_start() {
        let (rig, node) = started();
        assert_eq!(rig.sink.events(), &[AppEvent::Menu(node.menu())]);
        assert_eq!(node.menu().items.len(), 5);
    }

    #[test]
    fn burst_finalizes_four_seconds_after_last_press() {
        let (mut rig, mut node) = started();
        press_at(&mut rig, &mut node, 0);
        press_at(&mut rig, &mut node, 3_000);
        press_at(&mut rig, &mut node, 6_000);
        run_to(&mut rig, &mut node, 9_999);
        assert!(selected(&rig).is_empty());
        assert_eq!(node.pending_presses(), 3);

        run_to(&mut rig, &mut node, 10_000);
        assert_eq!(selected(&rig), vec![Command::OpenGateAndDoor]);
        assert!(node.opening_active());
        let sent = rig.radio.drain();
        assert_eq!(sent, vec![Transmission::Broadcast(codec::encode(Message::OpenGateDoor).unwrap())]);
    }

    #[test]
    fn gate_toggle_unicasts_lock_request() {
        let (mut rig, mut node) = started();
        press_at(&mut rig, &mut node, 0);
        press_at(&mut rig, &mut node, 500);
        run_to(&mut rig, &mut node, 4_500);
        assert_eq!(node.gate(), GateState::Unlocked);
        let sent = rig.radio.drain();
        assert!(matches!(sent[0], Transmission::Unicast { dest: NodeAddr::GATE, .. }));
        assert_eq!(sent[0].payload(), b"UNLOCK\0");
    }

    #[test]
    fn alarm_blocks_other_commands() {
        let (mut rig, mut node) = started();
        press_at(&mut rig, &mut node, 0);
        run_to(&mut rig, &mut node, 4_000);
        assert_eq!(node.alarm_state(), AlarmState::Active);
        rig.radio.drain();

        for t in [5_000, 5_200] {
            press_at(&mut rig, &mut node, t);
        }
        run_to(&mut rig, &mut node, 9_200);
        assert!(rig.sink.contains(&AppEvent::CommandRejected {
            count: 2,
            reason: RejectReason::AlarmActive
        }));
        assert!(rig.radio.pending().is_empty());
        assert_eq!(node.gate(), GateState::Locked);
    }

    #[test]
    fn opening_blocks_alarm_and_ends_with_menu() {
        let (mut rig, mut node) = started();
        for t in [0, 100, 200] {
            press_at(&mut rig, &mut node, t);
        }
        run_to(&mut rig, &mut node, 4_200);
        assert!(node.opening_active());
        assert!(!node.menu().contains(Command::ToggleAlarm));

        // Single press mid-sequence, then step through the rest of it.
        let mut t = 4_200;
        while t < 21_000 {
            t += 100;
            if t == 5_000 {
                press_at(&mut rig, &mut node, t);
            } else {
                run_to(&mut rig, &mut node, t);
            }
        }
        assert!(rig.sink.contains(&AppEvent::CommandRejected {
            count: 1,
            reason: RejectReason::OpeningInProgress
        }));
        assert!(!node.opening_active());
        assert_eq!(rig.sink.count(|e| *e == AppEvent::OpeningFinished), 1);
        assert_eq!(rig.sink.events().last(), Some(&AppEvent::Menu(node.menu())));
        assert!(node.menu().contains(Command::ToggleAlarm));
    }

    #[test]
    fn replies_attributed_by_sender() {
        let (mut rig, mut node) = started();
        let value = codec::encode(Message::IntegerReply(22)).unwrap();
        node.on_unicast(NodeAddr::ENTRANCE, &value, &mut rig.io());
        node.on_unicast(NodeAddr::GATE, &value, &mut rig.io());
        // Bedroom is not a reply source; raw integers from it are garbage.
        node.on_unicast(NodeAddr::BEDROOM, &value, &mut rig.io());
        assert!(rig.sink.contains(&AppEvent::TemperatureAverage(22)));
        assert!(rig.sink.contains(&AppEvent::ExternalLight(22)));
        assert_eq!(rig.sink.events().len(), 3);
    }

    #[test]
    fn comfort_notice_is_dropped() {
        let (mut rig, mut node) = started();
        let notice = codec::encode(Message::ComfortStart).unwrap();
        node.on_unicast(NodeAddr::BEDROOM, &notice, &mut rig.io());
        assert_eq!(rig.sink.events().len(), 1);
    }

    #[test]
    fn activation_outcome_from_acks() {
        let (mut rig, mut node) = started();
        press_at(&mut rig, &mut node, 0);
        run_to(&mut rig, &mut node, 4_000);
        let ack = codec::encode(Message::AlarmAck).unwrap();
        rig.now = 4_500;
        node.on_unicast(NodeAddr::ENTRANCE, &ack, &mut rig.io());
        node.on_unicast(NodeAddr::GATE, &ack, &mut rig.io());
        run_to(&mut rig, &mut node, 9_000);
        assert_eq!(rig.hw.lit(), Leds::GREEN);
        assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AckReceived(_))), 2);
    }
}
