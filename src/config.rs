//! System configuration parameters
//!
//! All tunable timing constants and thresholds for the four nodes, plus
//! the link model used by the mesh simulator.  Values can be loaded from
//! a JSON file or a postcard blob through a [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Command input (coordinator) ---
    /// Sliding window after the last button press before the burst is finalized (seconds)
    pub input_window_secs: u32,
    /// How long the coordinator collects alarm acknowledgments (seconds)
    pub alarm_ack_wait_secs: u32,

    // --- Alarm responders ---
    /// Period of the all-indicator blink while the alarm is active (seconds)
    pub alarm_blink_interval_secs: u32,

    // --- Gate & door opening ---
    /// Total length of an opening sequence (seconds)
    pub opening_duration_secs: u32,
    /// Tick of an opening sequence (seconds)
    pub opening_step_secs: u32,

    // --- Sensing ---
    /// Entrance node temperature sampling period (seconds)
    pub entrance_sample_interval_secs: u32,
    /// Light reply scaling: reply = raw * numerator / denominator
    pub light_scale_numerator: i32,
    pub light_scale_denominator: i32,

    // --- Comfort (bedroom) ---
    /// Drive tick of the comfort loop (seconds)
    pub comfort_tick_secs: u32,
    /// Resampling interval of the comfort loop (seconds); 60 or 300 in deployments
    pub comfort_sample_interval_secs: u32,
    /// Latest reading at or below this starts the air conditioner (°C)
    pub comfort_min_c: i32,
    /// Mean below this starts, mean above this stops the air conditioner (°C)
    pub comfort_optimal_c: i32,
    /// Latest reading at or above this stops the air conditioner (°C)
    pub comfort_max_c: i32,

    // --- Radio ---
    /// Link-layer retransmission budget for reliable unicast
    pub max_retransmissions: u8,
    /// Simulated link characteristics
    pub link: LinkConfig,
}

/// Radio link model used by the mesh simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Probability (0.0–1.0) that a single transmission is lost
    pub loss: f64,
    /// One-hop delivery latency (milliseconds)
    pub latency_ms: u64,
    /// Delay between reliable-unicast retransmissions (milliseconds)
    pub retransmit_interval_ms: u64,
    /// Seed for the loss model RNG
    pub seed: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            loss: 0.0,
            latency_ms: 10,
            retransmit_interval_ms: 250,
            seed: 0x5eed,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Command input
            input_window_secs: 4,
            alarm_ack_wait_secs: 5,

            // Alarm
            alarm_blink_interval_secs: 2,

            // Opening
            opening_duration_secs: 16,
            opening_step_secs: 2,

            // Sensing
            entrance_sample_interval_secs: 10,
            light_scale_numerator: 10,
            light_scale_denominator: 7,

            // Comfort
            comfort_tick_secs: 2,
            comfort_sample_interval_secs: 60, // 300 for 5 minutes
            comfort_min_c: 15,
            comfort_optimal_c: 19,
            comfort_max_c: 23,

            // Radio
            max_retransmissions: 5,
            link: LinkConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Reject values the state machines cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            self.input_window_secs,
            self.alarm_ack_wait_secs,
            self.alarm_blink_interval_secs,
            self.opening_step_secs,
            self.entrance_sample_interval_secs,
            self.comfort_tick_secs,
            self.comfort_sample_interval_secs,
        ];
        if intervals.contains(&0) {
            return Err(ConfigError::ValidationFailed("intervals must be non-zero"));
        }
        if self.opening_duration_secs == 0
            || self.opening_duration_secs % self.opening_step_secs != 0
        {
            return Err(ConfigError::ValidationFailed(
                "opening duration must be a positive multiple of its step",
            ));
        }
        if self.opening_duration_secs < self.opening_step_secs.saturating_mul(2) {
            return Err(ConfigError::ValidationFailed(
                "opening sequence needs at least two ticks",
            ));
        }
        if !(self.comfort_min_c < self.comfort_optimal_c
            && self.comfort_optimal_c < self.comfort_max_c)
        {
            return Err(ConfigError::ValidationFailed(
                "comfort thresholds must satisfy min < optimal < max",
            ));
        }
        if self.light_scale_denominator == 0 {
            return Err(ConfigError::ValidationFailed("light scale denominator is zero"));
        }
        if !(0.0..=1.0).contains(&self.link.loss) {
            return Err(ConfigError::ValidationFailed("link loss must be within 0..=1"));
        }
        Ok(())
    }

    /// Number of ticks in one opening sequence.
    pub fn opening_ticks(&self) -> u32 {
        self.opening_duration_secs / self.opening_step_secs
    }
}

/// Seconds to scheduler milliseconds.
pub const fn secs(s: u32) -> u64 {
    s as u64 * 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = SystemConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.opening_ticks(), 8);
    }

    #[test]
    fn opening_duration_must_divide_by_step() {
        let c = SystemConfig {
            opening_duration_secs: 15,
            ..SystemConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn thresholds_must_be_ordered() {
        let c = SystemConfig {
            comfort_min_c: 20,
            ..SystemConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn loss_outside_unit_interval_rejected() {
        let mut c = SystemConfig::default();
        c.link.loss = 1.5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn json_overrides_single_field() {
        let mut c = SystemConfig::default();
        c.comfort_sample_interval_secs = 300;
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c2.comfort_sample_interval_secs, 300);
        assert_eq!(c2, c);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = SystemConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: SystemConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c, c2);
    }
}
