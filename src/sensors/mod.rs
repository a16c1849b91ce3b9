//! Sensor helpers: the rolling temperature window and raw-to-unit scaling.
//!
//! Sampling itself happens behind [`SensorPort`](crate::app::ports::SensorPort).

pub mod history;
pub mod light;
pub mod temperature;

pub use history::TemperatureWindow;
pub use light::scale_light;
pub use temperature::sht11_celsius;
