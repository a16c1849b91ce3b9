//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `sim_hardware` | IndicatorPort      | In-memory LEDs (call log)   |
//! |                | SensorPort         | Scripted SHT11 / light      |
//! | `log_sink`     | EventSink          | Console log / event record  |
//! | `config_store` | ConfigPort         | JSON file / postcard blob   |
//!
//! The radio port is implemented by [`Outbox`](crate::mesh::Outbox) and
//! carried over the air by [`SimNetwork`](crate::sim::SimNetwork).

pub mod config_store;
pub mod log_sink;
pub mod sim_hardware;

pub use config_store::{JsonConfigFile, MemoryConfigStore};
pub use log_sink::{EventLog, LogEventSink};
pub use sim_hardware::{IndicatorCall, SimHardware};
