//! HomeMesh host simulator, main entry point.
//!
//! Boots the four-node house on a simulated lossy mesh and plays a set of
//! operator scenarios against it.  Every node's console stream goes to
//! the log.
//!
//! ```text
//!   homemesh [CONFIG.json]
//!
//!   RUST_LOG=debug homemesh      # include link-layer callbacks
//! ```

use anyhow::{Context, Result};
use log::info;

use homemesh::adapters::JsonConfigFile;
use homemesh::app::ports::{ConfigPort, Leds};
use homemesh::config::SystemConfig;
use homemesh::mesh::{NodeAddr, Role};
use homemesh::sim::SimNetwork;

/// Gap between presses of one burst.
const PRESS_GAP_MS: u64 = 300;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => JsonConfigFile::new(&path)
            .load_or_default()
            .with_context(|| format!("loading config from {path}"))?,
        None => SystemConfig::default(),
    };
    config.validate().context("invalid configuration")?;

    alarm_round_trip(&config);
    alarm_with_dead_gate(&config);
    open_gate_and_door(&config);
    sensor_queries(&config);
    bedroom_comfort(&config);

    info!("All scenarios finished.");
    Ok(())
}

fn banner(title: &str) {
    info!("════════ {title} ════════");
}

fn alarm_round_trip(config: &SystemConfig) {
    banner("alarm on, then off");
    let mut net = SimNetwork::new(config);
    net.press(NodeAddr::COORDINATOR, 1_000);
    net.run_until(12_000);
    info!(
        "coordinator indicators after activation: {}",
        net.hardware(Role::Coordinator).lit()
    );
    net.press(NodeAddr::COORDINATOR, 12_000);
    net.run_until(24_000);
    info!(
        "coordinator indicators after deactivation: {}",
        net.hardware(Role::Coordinator).lit()
    );
}

fn alarm_with_dead_gate(config: &SystemConfig) {
    banner("alarm on with the gate unreachable");
    let mut net = SimNetwork::new(config);
    net.set_link_loss(NodeAddr::COORDINATOR, NodeAddr::GATE, 1.0);
    net.press(NodeAddr::COORDINATOR, 1_000);
    net.run_until(12_000);
    info!(
        "coordinator indicators: {} (gate alarm state {:?})",
        net.hardware(Role::Coordinator).lit(),
        net.gate().alarm().state()
    );
}

fn open_gate_and_door(config: &SystemConfig) {
    banner("open gate & door");
    let mut net = SimNetwork::new(config);
    net.press_burst(NodeAddr::COORDINATOR, 1_000, 3, PRESS_GAP_MS);
    net.run_until(30_000);
    info!(
        "blue toggles: gate {}, entrance {}",
        net.hardware(Role::Gate).toggles_of(Leds::BLUE).len(),
        net.hardware(Role::Entrance).toggles_of(Leds::BLUE).len()
    );
}

fn sensor_queries(config: &SystemConfig) {
    banner("temperature and light queries");
    let mut net = SimNetwork::new(config);
    net.hardware_mut(Role::Entrance)
        .script_temperatures([18, 19, 21, 22, 24]);
    net.hardware_mut(Role::Gate).set_light_raw(420);
    net.run_until(55_000);
    net.press_burst(NodeAddr::COORDINATOR, 55_000, 4, PRESS_GAP_MS);
    net.run_until(65_000);
    net.press_burst(NodeAddr::COORDINATOR, 65_000, 5, PRESS_GAP_MS);
    net.run_until(75_000);
}

fn bedroom_comfort(config: &SystemConfig) {
    banner("bedroom comfort mode");
    let mut net = SimNetwork::new(config);
    net.hardware_mut(Role::Bedroom).set_steady_temperature(14);
    net.press(NodeAddr::BEDROOM, 1_000);
    net.run_until(30_000);
    net.hardware_mut(Role::Bedroom).set_steady_temperature(26);
    net.run_until(400_000);
    info!(
        "air conditioner {}",
        if net.bedroom().comfort().air_conditioner() { "on" } else { "off" }
    );
    net.press(NodeAddr::BEDROOM, 400_000);
    net.run_until(405_000);
}
