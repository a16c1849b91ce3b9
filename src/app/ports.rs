//! Port traits: the hexagonal boundary between node logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (indicator bank, sensors, event sinks, config storage)
//! implement these traits.  Node services only ever see them through
//! [`NodeIo`](crate::node::NodeIo), so the domain core never touches
//! hardware directly.  The radio port lives with the rest of the mesh
//! code in [`crate::mesh::transport`].

use core::fmt;
use core::ops::{BitAnd, BitOr, Not};

use crate::config::SystemConfig;
use crate::scheduler::TimerId;

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LEDs)
// ───────────────────────────────────────────────────────────────

/// A set of the three node indicators, as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Leds(pub u8);

impl Leds {
    pub const NONE: Self = Self(0);
    pub const GREEN: Self = Self(0b001);
    pub const BLUE: Self = Self(0b010);
    pub const RED: Self = Self(0b100);
    pub const ALL: Self = Self(0b111);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 & Self::ALL.0 == 0
    }
}

impl BitOr for Leds {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Leds {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for Leds {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0 & Self::ALL.0)
    }
}

impl fmt::Display for Leds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.contains(Self::RED) { 'R' } else { '-' };
        let g = if self.contains(Self::GREEN) { 'G' } else { '-' };
        let b = if self.contains(Self::BLUE) { 'B' } else { '-' };
        write!(f, "{r}{g}{b}")
    }
}

/// Write-side port for the node's indicator bank.
pub trait IndicatorPort {
    /// Indicators currently lit.
    fn get(&self) -> Leds;

    /// Light every indicator in `leds`; others are untouched.
    fn on(&mut self, leds: Leds);

    /// Switch off every indicator in `leds`; others are untouched.
    fn off(&mut self, leds: Leds);

    /// Invert every indicator in `leds`.
    fn toggle(&mut self, leds: Leds);

    /// Make exactly `leds` lit.
    fn set(&mut self, leds: Leds);
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// One temperature reading in whole °C.
    fn read_temperature(&mut self) -> i32;

    /// One raw photosynthetic light reading (unscaled).
    fn read_light(&mut self) -> i32;
}

/// Everything a node needs from its board.
pub trait Hardware: IndicatorPort + SensorPort {}

impl<T: IndicatorPort + SensorPort> Hardware for T {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → console)
// ───────────────────────────────────────────────────────────────

/// Nodes emit structured [`AppEvent`](super::events::AppEvent)s through
/// this port.  Adapters decide where they go (console log, a test
/// recorder, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations validate before persisting and after loading.
/// Invalid values are rejected with [`ConfigError::ValidationFailed`],
/// never clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`ConfigError::NotFound`] if nothing
    /// has been stored yet.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;

    /// Load, falling back to [`SystemConfig::default()`] when nothing is stored.
    fn load_or_default(&self) -> Result<SystemConfig, ConfigError> {
        match self.load() {
            Err(ConfigError::NotFound) => Ok(SystemConfig::default()),
            other => other,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from event system)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a timer expires.
///
/// This decouples the [`Scheduler`](crate::scheduler::Scheduler) from the
/// node event queue.  [`EventQueue`](crate::events::EventQueue)
/// implements it by enqueueing a timer event.
pub trait SchedulerDelegate {
    fn on_timer_fired(&mut self, timer: TimerId);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::NotFound => Self::Config("not found"),
            ConfigError::Corrupted => Self::Config("corrupted"),
            ConfigError::IoError => Self::Config("I/O error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn led_set_algebra() {
        let rg = Leds::RED | Leds::GREEN;
        assert!(rg.contains(Leds::RED));
        assert!(!rg.contains(Leds::BLUE));
        assert_eq!(!rg, Leds::BLUE);
        assert_eq!(rg & Leds::GREEN, Leds::GREEN);
        assert!(Leds::NONE.is_empty());
    }

    #[test]
    fn led_display() {
        assert_eq!(Leds::ALL.to_string(), "RGB");
        assert_eq!(Leds::RED.to_string(), "R--");
        assert_eq!(Leds::NONE.to_string(), "---");
    }
}
