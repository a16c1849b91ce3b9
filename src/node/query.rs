//! Sensor queries: temperature average from the entrance, external light
//! from the gate.
//!
//! Requests and replies both go out as reliable unicasts.  Replies are
//! bare integers with no correlation to the request that caused them.

use log::info;

use crate::app::ports::Hardware;
use crate::config::SystemConfig;
use crate::mesh::{Message, NodeAddr, RadioExt};
use crate::sensors::{TemperatureWindow, scale_light};

use super::NodeIo;

/// Ask the entrance node for its temperature average.
pub fn request_temperature(io: &mut NodeIo<'_>, max_retransmissions: u8) {
    io.radio
        .send_msg(NodeAddr::ENTRANCE, Message::GetTemperature, max_retransmissions);
}

/// Ask the gate node for the external light level.
pub fn request_light(io: &mut NodeIo<'_>, max_retransmissions: u8) {
    io.radio
        .send_msg(NodeAddr::GATE, Message::GetLight, max_retransmissions);
}

/// Mean of the window.  An empty window is seeded with a fresh reading.
pub fn temperature_reply(window: &mut TemperatureWindow, hw: &mut dyn Hardware) -> i32 {
    if let Some(avg) = window.average() {
        return avg;
    }
    let reading = hw.read_temperature();
    info!("temperature window empty, seeding with {reading}");
    window.push(reading);
    window.average().unwrap_or(reading)
}

/// Instantaneous light reading, scaled.
pub fn light_reply(hw: &mut dyn Hardware, cfg: &SystemConfig) -> i32 {
    scale_light(
        hw.read_light(),
        cfg.light_scale_numerator,
        cfg.light_scale_denominator,
    )
}

/// Send an integer reply back to the coordinator.
pub fn reply(io: &mut NodeIo<'_>, value: i32, max_retransmissions: u8) {
    io.radio.send_msg(
        NodeAddr::COORDINATOR,
        Message::IntegerReply(value),
        max_retransmissions,
    );
}
