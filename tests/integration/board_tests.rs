//! Node services hosted on the pin-level mock board.
//!
//! Frames are posted straight into the host's queue, the way a radio
//! receive callback would, and the GPIO pins are checked afterwards.

use homemesh::adapters::EventLog;
use homemesh::app::events::AppEvent;
use homemesh::app::ports::Leds;
use homemesh::config::SystemConfig;
use homemesh::events::NodeEvent;
use homemesh::mesh::codec;
use homemesh::mesh::{Message, NodeAddr, Outbox, Transmission};
use homemesh::node::gate::GateState;
use homemesh::node::{EntranceNode, GateNode, NodeHost};

use crate::mock_hw::MockBoard;

type Host<N> = NodeHost<N, MockBoard, Outbox, EventLog>;

fn boot<N: homemesh::node::NodeService>(service: N) -> Host<N> {
    let mut host = NodeHost::new(service, MockBoard::new(), Outbox::new(), EventLog::new());
    host.start(0);
    host
}

fn unicast(msg: Message) -> NodeEvent {
    NodeEvent::Unicast {
        from: NodeAddr::COORDINATOR,
        payload: codec::encode(msg).unwrap(),
    }
}

fn broadcast(msg: Message) -> NodeEvent {
    NodeEvent::Broadcast {
        from: NodeAddr::COORDINATOR,
        payload: codec::encode(msg).unwrap(),
    }
}

/// Fire timers and handle events at each instant in `instants`.
fn tick_through<N: homemesh::node::NodeService>(host: &mut Host<N>, instants: impl Iterator<Item = u64>) {
    for now in instants {
        host.fire_timers(now);
        host.run(now);
    }
}

#[test]
fn gate_pins_follow_lock_state() {
    let mut gate = boot(GateNode::new(&SystemConfig::default()));
    assert_eq!(gate.hw.pins(), Leds::RED);

    gate.post(unicast(Message::UnlockGate)).unwrap();
    gate.run(100);
    assert_eq!(gate.hw.pins(), Leds::GREEN);
    assert_eq!(gate.service.gate(), GateState::Unlocked);
    assert!(gate.sink.contains(&AppEvent::GateChanged(GateState::Unlocked)));

    // Repeating the same request rewrites nothing on the pins.
    let writes = gate.hw.green.writes();
    gate.post(unicast(Message::UnlockGate)).unwrap();
    gate.run(200);
    assert_eq!(gate.hw.green.writes(), writes);
}

#[test]
fn gate_light_reply_goes_to_coordinator() {
    let mut gate = boot(GateNode::new(&SystemConfig::default()));
    gate.hw.light_raw = 7;
    gate.post(unicast(Message::GetLight)).unwrap();
    gate.run(0);
    let sent = gate.radio.drain();
    assert_eq!(
        sent,
        vec![Transmission::Unicast {
            dest: NodeAddr::COORDINATOR,
            payload: codec::encode(Message::IntegerReply(10)).unwrap(),
            max_retransmissions: 5,
        }]
    );
}

#[test]
fn alarm_blinks_pins_and_restores_them() {
    let mut gate = boot(GateNode::new(&SystemConfig::default()));
    gate.post(broadcast(Message::AlarmOn)).unwrap();
    gate.run(0);
    assert_eq!(gate.hw.pins(), Leds::ALL);

    tick_through(&mut gate, (1..=3).map(|k| k * 2_000));
    // Three blinks from all-on ends all-off.
    assert_eq!(gate.hw.pins(), Leds::NONE);

    gate.post(broadcast(Message::AlarmOff)).unwrap();
    gate.run(6_500);
    assert_eq!(gate.hw.pins(), Leds::RED);

    let acks = gate
        .radio
        .drain()
        .into_iter()
        .filter(|t| t.payload() == b"ALARM_ACK\0")
        .count();
    assert_eq!(acks, 2);
}

#[test]
fn entrance_door_drives_blue_pin_twice() {
    let mut entrance = boot(EntranceNode::new(&SystemConfig::default()));
    entrance.post(broadcast(Message::OpenGateDoor)).unwrap();
    entrance.run(0);
    tick_through(&mut entrance, (1..=10).map(|k| k * 2_000));
    assert_eq!(*entrance.hw.blue.levels.borrow(), vec![false, true, false]);
}

#[test]
fn entrance_samples_from_the_board() {
    let mut entrance = boot(EntranceNode::new(&SystemConfig::default()));
    entrance.hw.temperatures.extend([17, 23]);
    tick_through(&mut entrance, [10_000, 20_000].into_iter());
    assert_eq!(entrance.service.window().average(), Some(18));
}
