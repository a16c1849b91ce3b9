//! End-to-end scenarios on the simulated house.
//!
//! Every test boots all four nodes on a [`SimNetwork`], drives the
//! coordinator button and checks what each node did.

use homemesh::app::commands::{Command, RejectReason};
use homemesh::app::events::{AppEvent, Opening};
use homemesh::app::ports::Leds;
use homemesh::config::SystemConfig;
use homemesh::control::comfort::ComfortStatus;
use homemesh::mesh::{NodeAddr, Role};
use homemesh::node::alarm::{AlarmOutcome, AlarmState};
use homemesh::scheduler::Millis;
use homemesh::sim::SimNetwork;

const GAP: Millis = 300;
const WINDOW: Millis = 4_000;
const LATENCY: Millis = 10;

fn house() -> SimNetwork {
    SimNetwork::new(&SystemConfig::default())
}

/// Select command `n` with a burst starting at `at`.  Returns the instant
/// the burst finalizes.
fn command(net: &mut SimNetwork, n: u8, at: Millis) -> Millis {
    net.press_burst(NodeAddr::COORDINATOR, at, n, GAP);
    at + u64::from(n - 1) * GAP + WINDOW
}

fn selected(net: &SimNetwork) -> Vec<Command> {
    net.log(Role::Coordinator)
        .events()
        .iter()
        .filter_map(|e| match e {
            AppEvent::CommandSelected(c) => Some(*c),
            _ => None,
        })
        .collect()
}

// ── Alarm ─────────────────────────────────────────────────────

#[test]
fn alarm_activation_with_both_acks_shows_ok() {
    let mut net = house();
    let fired = command(&mut net, 1, 1_000);
    net.run_until(fired + 5_000);

    assert_eq!(net.coordinator().alarm_state(), AlarmState::Active);
    assert_eq!(net.entrance().alarm().state(), AlarmState::Active);
    assert_eq!(net.gate().alarm().state(), AlarmState::Active);
    let log = net.log(Role::Coordinator);
    assert!(log.contains(&AppEvent::AckReceived(NodeAddr::ENTRANCE)));
    assert!(log.contains(&AppEvent::AckReceived(NodeAddr::GATE)));
    assert!(log.contains(&AppEvent::AlarmOutcome(AlarmOutcome::Ok)));
    assert_eq!(net.hardware(Role::Coordinator).lit(), Leds::GREEN);
}

#[test]
fn deactivation_leaves_indicator_and_restores_peripherals() {
    let mut net = house();
    let on = command(&mut net, 1, 1_000);
    net.run_until(on + 6_000);
    // Peripherals are blinking every indicator.
    assert!(net.hardware(Role::Gate).toggles_of(Leds::ALL).len() >= 2);

    let off = command(&mut net, 1, on + 6_000);
    net.run_until(off + 10_000);

    assert_eq!(net.coordinator().alarm_state(), AlarmState::Inactive);
    assert_eq!(net.hardware(Role::Coordinator).lit(), Leds::GREEN);
    assert_eq!(net.hardware(Role::Entrance).lit(), Leds::RED);
    assert_eq!(net.hardware(Role::Gate).lit(), Leds::RED);
    assert_eq!(
        net.log(Role::Coordinator)
            .count(|e| matches!(e, AppEvent::AlarmOutcome(_))),
        1
    );
}

#[test]
fn unreachable_gate_means_failure() {
    let mut net = house();
    net.set_link_loss(NodeAddr::COORDINATOR, NodeAddr::GATE, 1.0);
    let fired = command(&mut net, 1, 1_000);
    net.run_until(fired + 5_000);

    assert_eq!(net.gate().alarm().state(), AlarmState::Inactive);
    let log = net.log(Role::Coordinator);
    assert!(log.contains(&AppEvent::AckMissing(NodeAddr::GATE)));
    assert!(!log.contains(&AppEvent::AckMissing(NodeAddr::ENTRANCE)));
    assert!(log.contains(&AppEvent::AlarmOutcome(AlarmOutcome::Failure)));
    assert_eq!(net.hardware(Role::Coordinator).lit(), Leds::RED);
}

#[test]
fn lost_acks_fail_even_though_peripherals_armed() {
    let mut net = house();
    net.set_link_loss(NodeAddr::ENTRANCE, NodeAddr::COORDINATOR, 1.0);
    net.set_link_loss(NodeAddr::GATE, NodeAddr::COORDINATOR, 1.0);
    let fired = command(&mut net, 1, 1_000);
    net.run_until(fired + 5_000);

    assert_eq!(net.entrance().alarm().state(), AlarmState::Active);
    assert_eq!(net.gate().alarm().state(), AlarmState::Active);
    assert!(net
        .log(Role::Coordinator)
        .contains(&AppEvent::AlarmOutcome(AlarmOutcome::Failure)));
}

#[test]
fn garden_lights_toggled_during_alarm_appear_after_it() {
    let mut net = house();
    let on = command(&mut net, 1, 1_000);
    net.press(NodeAddr::ENTRANCE, on + 1_000);
    net.run_until(on + 6_000);
    assert!(net.entrance().garden_lights());

    let off = command(&mut net, 1, on + 6_000);
    net.run_until(off + 1_000);
    assert_eq!(net.hardware(Role::Entrance).lit(), Leds::GREEN);
}

// ── Command input ─────────────────────────────────────────────

#[test]
fn presses_under_window_accumulate() {
    let mut net = house();
    for i in 0..5 {
        net.press(NodeAddr::COORDINATOR, 1_000 + i * 3_900);
    }
    let last = 1_000 + 4 * 3_900;
    net.run_until(last + WINDOW - 1);
    assert!(selected(&net).is_empty());
    assert_eq!(net.coordinator().pending_presses(), 5);

    net.run_until(last + WINDOW);
    assert_eq!(selected(&net), vec![Command::QueryLight]);
}

#[test]
fn press_exactly_one_window_later_starts_over() {
    let mut net = house();
    net.press(NodeAddr::COORDINATOR, 1_000);
    net.press(NodeAddr::COORDINATOR, 1_000 + WINDOW);
    net.run_until(20_000);
    assert_eq!(selected(&net), vec![Command::ToggleAlarm, Command::ToggleAlarm]);
    assert_eq!(net.coordinator().alarm_state(), AlarmState::Inactive);
}

#[test]
fn alarm_active_rejects_opening() {
    let mut net = house();
    let on = command(&mut net, 1, 1_000);
    let open = command(&mut net, 3, on + 1_000);
    net.run_until(open + 1_000);

    assert!(net.log(Role::Coordinator).contains(&AppEvent::CommandRejected {
        count: 3,
        reason: RejectReason::AlarmActive
    }));
    assert!(!net.coordinator().opening_active());
    assert!(!net.gate().opening().is_active());
}

#[test]
fn out_of_range_burst_is_invalid() {
    let mut net = house();
    let fired = command(&mut net, 7, 1_000);
    net.run_until(fired);
    assert!(net.log(Role::Coordinator).contains(&AppEvent::CommandRejected {
        count: 7,
        reason: RejectReason::Invalid
    }));
}

// ── Opening ───────────────────────────────────────────────────

#[test]
fn opening_blinks_gate_eight_times_and_door_twice() {
    let mut net = house();
    let fired = command(&mut net, 3, 1_000);
    net.run_until(fired + 30_000);

    let start = fired + LATENCY;
    let gate: Vec<Millis> = (1..=8).map(|k| start + k * 2_000).collect();
    assert_eq!(net.hardware(Role::Gate).toggles_of(Leds::BLUE), gate);
    assert_eq!(
        net.hardware(Role::Entrance).toggles_of(Leds::BLUE),
        vec![start + 14_000, start + 16_000]
    );

    let gate_log = net.log(Role::Gate);
    assert!(gate_log.contains(&AppEvent::Opening(Opening::GateOpening)));
    assert!(gate_log.contains(&AppEvent::Opening(Opening::GateClosed)));
    assert!(net
        .log(Role::Entrance)
        .contains(&AppEvent::Opening(Opening::DoorClosed)));
    assert!(net.log(Role::Coordinator).contains(&AppEvent::OpeningFinished));
    assert!(!net.coordinator().opening_active());
}

#[test]
fn alarm_is_refused_while_opening() {
    let mut net = house();
    let open = command(&mut net, 3, 1_000);
    let alarm = command(&mut net, 1, open + 1_000);
    net.run_until(alarm + 1_000);
    assert!(net.log(Role::Coordinator).contains(&AppEvent::CommandRejected {
        count: 1,
        reason: RejectReason::OpeningInProgress
    }));
    assert_eq!(net.coordinator().alarm_state(), AlarmState::Inactive);
}

// ── Gate lock and queries ─────────────────────────────────────

#[test]
fn gate_lock_round_trip() {
    let mut net = house();
    let unlock = command(&mut net, 2, 1_000);
    net.run_until(unlock + 1_000);
    assert_eq!(net.hardware(Role::Gate).lit(), Leds::GREEN);

    let lock = command(&mut net, 2, unlock + 1_000);
    net.run_until(lock + 1_000);
    assert_eq!(net.hardware(Role::Gate).lit(), Leds::RED);
    assert_eq!(net.coordinator().gate(), net.gate().gate());
}

#[test]
fn queries_report_window_mean_and_scaled_light() {
    let mut net = house();
    net.hardware_mut(Role::Entrance)
        .script_temperatures([18, 19, 21, 22, 24]);
    net.hardware_mut(Role::Gate).set_light_raw(420);
    net.run_until(55_000);

    let temp = command(&mut net, 4, 55_000);
    net.run_until(temp + 1_000);
    let light = command(&mut net, 5, temp + 1_000);
    net.run_until(light + 1_000);

    let log = net.log(Role::Coordinator);
    assert!(log.contains(&AppEvent::TemperatureAverage(20)));
    assert!(log.contains(&AppEvent::ExternalLight(600)));
}

#[test]
fn lost_query_is_silent() {
    let mut net = house();
    net.set_link_loss(NodeAddr::COORDINATOR, NodeAddr::GATE, 1.0);
    let light = command(&mut net, 5, 1_000);
    net.run_until(light + 10_000);
    assert_eq!(
        net.log(Role::Coordinator)
            .count(|e| matches!(e, AppEvent::ExternalLight(_))),
        0
    );
    assert!(net.coordinator().menu().contains(Command::QueryLight));
}

// ── Comfort ───────────────────────────────────────────────────

#[test]
fn comfort_cycle_in_the_bedroom() {
    let cfg = SystemConfig {
        comfort_sample_interval_secs: 4,
        ..SystemConfig::default()
    };
    let mut net = SimNetwork::new(&cfg);
    net.hardware_mut(Role::Bedroom).set_steady_temperature(14);
    net.press(NodeAddr::BEDROOM, 1_000);
    net.run_until(8_000);
    assert_eq!(net.bedroom().comfort().status(), ComfortStatus::Active);
    assert!(net.bedroom().comfort().air_conditioner());
    assert!(!net.hardware(Role::Bedroom).toggles_of(Leds::BLUE).is_empty());

    net.hardware_mut(Role::Bedroom).set_steady_temperature(30);
    net.run_until(30_000);
    assert!(!net.bedroom().comfort().air_conditioner());
    assert!(!net.hardware(Role::Bedroom).lit().contains(Leds::BLUE));

    let ac: Vec<_> = net
        .log(Role::Bedroom)
        .events()
        .iter()
        .filter(|e| matches!(e, AppEvent::AirConditioner(_)))
        .cloned()
        .collect();
    assert_eq!(
        ac,
        vec![AppEvent::AirConditioner(true), AppEvent::AirConditioner(false)]
    );
    // The coordinator drops the comfort notice.
    assert_eq!(net.log(Role::Coordinator).events().len(), 2);
}

// ── Reproducibility ───────────────────────────────────────────

#[test]
fn same_seed_same_history() {
    let cfg = SystemConfig {
        link: homemesh::config::LinkConfig {
            loss: 0.4,
            ..Default::default()
        },
        ..SystemConfig::default()
    };
    let play = || {
        let mut net = SimNetwork::new(&cfg);
        let on = command(&mut net, 1, 1_000);
        let off = command(&mut net, 1, on + 6_000);
        let temp = command(&mut net, 4, off + 6_000);
        net.run_until(temp + 5_000);
        net.log(Role::Coordinator).events().to_vec()
    };
    assert_eq!(play(), play());
}
