//! Entrance node (address 1): door half of the opening sequence,
//! periodic temperature sampling, garden lights and the alarm responder.
//!
//! ```text
//!   OPEN ──▶ 16 14 12 10 8 6 │ 4        2
//!            (silent ticks)  │ opening  closed   ◀── blue toggles
//! ```

use log::{debug, info};

use crate::app::events::{AppEvent, Opening};
use crate::app::ports::Leds;
use crate::config::{SystemConfig, secs};
use crate::mesh::{Message, NodeAddr, NodeIdentity, Role, codec};
use crate::scheduler::TimerId;
use crate::sensors::TemperatureWindow;

use super::alarm::AlarmResponder;
use super::opening::OpeningSequencer;
use super::{NodeIo, NodeService, log_decode_failure, log_stray_timer, query};

pub struct EntranceNode {
    cfg: SystemConfig,
    alarm: AlarmResponder,
    window: TemperatureWindow,
    garden_lights: bool,
    opening: OpeningSequencer,
}

impl EntranceNode {
    pub fn new(cfg: &SystemConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            alarm: AlarmResponder::new(cfg),
            window: TemperatureWindow::new(),
            garden_lights: false,
            opening: OpeningSequencer::new(cfg),
        }
    }

    pub fn garden_lights(&self) -> bool {
        self.garden_lights
    }

    pub fn window(&self) -> &TemperatureWindow {
        &self.window
    }

    pub fn alarm(&self) -> &AlarmResponder {
        &self.alarm
    }

    pub fn opening(&self) -> &OpeningSequencer {
        &self.opening
    }

    fn toggle_garden_lights(&mut self, io: &mut NodeIo<'_>) {
        self.garden_lights = !self.garden_lights;
        let (show, hide) = if self.garden_lights {
            (Leds::GREEN, Leds::RED)
        } else {
            (Leds::RED, Leds::GREEN)
        };

        // While the alarm blinks, edit the pattern it will restore.
        match self.alarm.saved_mut() {
            Some(saved) => *saved = (*saved | show) & !hide,
            None => {
                io.hw.off(hide);
                io.hw.on(show);
            }
        }
        info!("garden lights {}", if self.garden_lights { "on" } else { "off" });
        io.sink.emit(&AppEvent::GardenLights(self.garden_lights));
    }
}

impl NodeService for EntranceNode {
    fn identity(&self) -> NodeIdentity {
        NodeIdentity::of(Role::Entrance)
    }

    fn start(&mut self, io: &mut NodeIo<'_>) {
        io.hw.on(Leds::RED);
        io.timers.set(
            TimerId::TemperatureSample,
            io.now,
            secs(self.cfg.entrance_sample_interval_secs),
        );
    }

    fn on_button(&mut self, io: &mut NodeIo<'_>) {
        self.toggle_garden_lights(io);
    }

    fn on_timer(&mut self, timer: TimerId, io: &mut NodeIo<'_>) {
        match timer {
            TimerId::AlarmBlink => self.alarm.on_blink_tick(io),
            TimerId::TemperatureSample => {
                let reading = io.hw.read_temperature();
                self.window.push(reading);
                debug!("temperature sample {reading}");
                io.sink.emit(&AppEvent::TemperatureSampled(reading));
                io.timers.reset(TimerId::TemperatureSample);
            }
            TimerId::OpeningStep => {
                let Some(tick) = self.opening.tick(io) else {
                    return;
                };
                if tick.is_penultimate() {
                    io.sink.emit(&AppEvent::Opening(Opening::DoorOpening));
                    io.hw.toggle(Leds::BLUE);
                } else if tick.is_last() {
                    io.sink.emit(&AppEvent::Opening(Opening::DoorClosed));
                    io.hw.toggle(Leds::BLUE);
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
                self.opening.begin(io);
            }
            Ok(other) => debug!("{}: ignoring broadcast {other} from {from}", self.identity()),
            Err(e) => log_decode_failure(self.identity(), from, e),
        }
    }

    fn on_unicast(&mut self, from: NodeAddr, payload: &[u8], io: &mut NodeIo<'_>) {
        match codec::decode_tagged(payload) {
            Ok(Message::GetTemperature) => {
                let avg = query::temperature_reply(&mut self.window, io.hw);
                info!("temperature average {avg}");
                query::reply(io, avg, self.cfg.max_retransmissions);
            }
            Ok(other) => debug!("{}: ignoring unicast {other} from {from}", self.identity()),
            Err(e) => log_decode_failure(self.identity(), from, e),
        }
    }
}
