//! Bedroom comfort loop: hysteresis control of the air conditioner.
//!
//! While comfort mode is on, a fixed drive tick runs the loop.  A slower
//! sampling countdown decides when a fresh temperature is taken; every
//! tick re-evaluates the actuator from the latest reading and the window
//! mean, then blinks the blue indicator if the air conditioner is running.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, Hardware, Leds};
use crate::config::SystemConfig;
use crate::scheduler::CancellableLoop;
use crate::sensors::TemperatureWindow;

/// Comfort mode on the bedroom node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComfortStatus {
    #[default]
    Inactive,
    Active,
}

impl ComfortStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Inactive => Self::Active,
            Self::Active => Self::Inactive,
        }
    }
}

/// Temperature thresholds in °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub min: i32,
    pub optimal: i32,
    pub max: i32,
}

impl Thresholds {
    pub fn from_config(cfg: &SystemConfig) -> Self {
        Self {
            min: cfg.comfort_min_c,
            optimal: cfg.comfort_optimal_c,
            max: cfg.comfort_max_c,
        }
    }
}

/// Next actuator state.
///
/// The activation check runs first; the deactivation check only runs if
/// activation did not fire.  Neither firing keeps the current state.
pub fn hysteresis(latest: i32, mean: i32, current: bool, t: Thresholds) -> bool {
    if latest <= t.min || mean < t.optimal {
        true
    } else if latest >= t.max || mean > t.optimal {
        false
    } else {
        current
    }
}

/// Per-activation loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComfortSession {
    /// Seconds until the next sample.
    pub sample_countdown: i64,
    /// Most recent reading, `None` until the first tick samples.
    pub last_reading: Option<i32>,
    /// Window mean as of the most recent sample.
    pub last_average: i32,
}

impl ComfortSession {
    fn new(sample_interval_secs: u32) -> Self {
        Self {
            sample_countdown: i64::from(sample_interval_secs),
            last_reading: None,
            last_average: 0,
        }
    }
}

pub struct ComfortController {
    status: ComfortStatus,
    /// Survives deactivation; only ever refilled, never cleared.
    window: TemperatureWindow,
    /// Also survives deactivation; the dead band holds it.
    air_conditioner: bool,
    session: Option<ComfortSession>,
    tick_loop: CancellableLoop,
    thresholds: Thresholds,
    tick_secs: i64,
    sample_interval_secs: u32,
}

impl ComfortController {
    pub fn new(cfg: &SystemConfig) -> Self {
        Self {
            status: ComfortStatus::Inactive,
            window: TemperatureWindow::new(),
            air_conditioner: false,
            session: None,
            tick_loop: CancellableLoop::Stopped,
            thresholds: Thresholds::from_config(cfg),
            tick_secs: i64::from(cfg.comfort_tick_secs),
            sample_interval_secs: cfg.comfort_sample_interval_secs,
        }
    }

    pub fn status(&self) -> ComfortStatus {
        self.status
    }

    pub fn air_conditioner(&self) -> bool {
        self.air_conditioner
    }

    pub fn session(&self) -> Option<&ComfortSession> {
        self.session.as_ref()
    }

    pub fn window(&self) -> &TemperatureWindow {
        &self.window
    }

    /// Idle indicator pattern for the current status.
    pub fn show_status(&self, hw: &mut dyn Hardware) {
        match self.status {
            ComfortStatus::Active => {
                hw.off(Leds::RED);
                hw.on(Leds::GREEN);
            }
            ComfortStatus::Inactive => {
                hw.on(Leds::RED);
                hw.off(Leds::GREEN | Leds::BLUE);
            }
        }
    }

    /// Switch comfort mode on and start the loop.  The caller arms the
    /// drive tick.
    pub fn activate(&mut self, hw: &mut dyn Hardware, sink: &mut dyn EventSink) {
        self.status = ComfortStatus::Active;
        self.session = Some(ComfortSession::new(self.sample_interval_secs));
        self.tick_loop.start();
        self.show_status(hw);
        info!("comfort activated");
        sink.emit(&AppEvent::ComfortChanged(self.status));
    }

    /// Switch comfort mode off.  The loop stops at its next tick.
    pub fn deactivate(&mut self, hw: &mut dyn Hardware, sink: &mut dyn EventSink) {
        self.status = ComfortStatus::Inactive;
        self.tick_loop.cancel();
        self.session = None;
        self.show_status(hw);
        info!("comfort deactivated");
        sink.emit(&AppEvent::ComfortChanged(self.status));
    }

    /// One drive tick.  Returns `true` if the tick should be re-armed.
    pub fn on_tick(&mut self, hw: &mut dyn Hardware, sink: &mut dyn EventSink) -> bool {
        if !self.tick_loop.on_tick() {
            debug!("comfort tick after cancellation, loop stopped");
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        if session.last_reading.is_none() || session.sample_countdown <= self.tick_secs {
            let reading = hw.read_temperature();
            self.window.push(reading);
            session.last_reading = Some(reading);
            session.last_average = self.window.average().unwrap_or(reading);
            session.sample_countdown = i64::from(self.sample_interval_secs);
            info!("temperature {reading}, average {}", session.last_average);
            sink.emit(&AppEvent::TemperatureSampled(reading));
        }

        if let Some(latest) = session.last_reading {
            let next = hysteresis(latest, session.last_average, self.air_conditioner, self.thresholds);
            if next != self.air_conditioner {
                self.air_conditioner = next;
                info!("air conditioner {}", if next { "on" } else { "off" });
                sink.emit(&AppEvent::AirConditioner(next));
            }
        }

        if self.air_conditioner {
            hw.toggle(Leds::BLUE);
        } else {
            hw.off(Leds::BLUE);
        }

        session.sample_countdown -= self.tick_secs;
        true
    }
}
