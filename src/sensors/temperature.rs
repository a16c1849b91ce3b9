//! SHT11 digital temperature sensor conversion.
//!
//! The SHT11 reports a 14-bit raw count.  The node firmware converts it
//! to whole degrees with integer arithmetic only:
//!
//! ```text
//! °C = ((raw / 10) - 396) / 10
//! ```
//!
//! i.e. `raw * 0.01 - 39.6` with each division truncating.

/// Convert a raw SHT11 count to whole °C.
pub fn sht11_celsius(raw: u16) -> i32 {
    ((i32::from(raw) / 10) - 396) / 10
}

/// Whole degrees the raw count can express, `sht11_celsius(0)` to
/// `sht11_celsius(u16::MAX)`.
pub const SHT11_MIN_CELSIUS: i32 = -39;
pub const SHT11_MAX_CELSIUS: i32 = 615;

/// Raw count that converts back to `celsius`.  Used to script the
/// simulated sensor in degrees.  Values outside the sensor's range
/// saturate at the nearest end.
pub fn sht11_raw_for(celsius: i32) -> u16 {
    let raw = celsius
        .saturating_mul(10)
        .saturating_add(396)
        .saturating_mul(10);
    raw.clamp(0, i32::from(u16::MAX)) as u16
}
