//! In-memory board for the simulator and tests.
//!
//! Implements [`IndicatorPort`] and [`SensorPort`] without touching any
//! pins.  Every indicator call is recorded with the time it was made, so
//! tests can count blinks and check the final pattern.
//!
//! Temperatures are scripted in °C and passed through the SHT11 integer
//! conversion, exactly as a real node would see them.  Scripted values
//! outside the sensor's range read back as the nearest end, with a
//! warning.

use std::collections::VecDeque;

use log::warn;

use crate::app::ports::{IndicatorPort, Leds, SensorPort};
use crate::scheduler::Millis;
use crate::sensors::temperature::{
    SHT11_MAX_CELSIUS, SHT11_MIN_CELSIUS, sht11_celsius, sht11_raw_for,
};

/// One recorded indicator operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorCall {
    On(Leds),
    Off(Leds),
    Toggle(Leds),
    Set(Leds),
}

pub struct SimHardware {
    lit: Leds,
    now: Millis,
    calls: Vec<(Millis, IndicatorCall)>,
    temperatures: VecDeque<i32>,
    steady_temperature: i32,
    light_raw: i32,
}

impl SimHardware {
    pub fn new() -> Self {
        Self {
            lit: Leds::NONE,
            now: 0,
            calls: Vec::new(),
            temperatures: VecDeque::new(),
            steady_temperature: 20,
            light_raw: 350,
        }
    }

    /// Stamp subsequent indicator calls with `now`.
    pub fn set_clock(&mut self, now: Millis) {
        self.now = now;
    }

    /// Queue readings returned one by one before falling back to the
    /// steady temperature.
    pub fn script_temperatures(&mut self, readings: impl IntoIterator<Item = i32>) {
        self.temperatures.extend(readings);
    }

    pub fn set_steady_temperature(&mut self, celsius: i32) {
        self.steady_temperature = celsius;
    }

    pub fn set_light_raw(&mut self, raw: i32) {
        self.light_raw = raw;
    }

    pub fn lit(&self) -> Leds {
        self.lit
    }

    pub fn calls(&self) -> &[(Millis, IndicatorCall)] {
        &self.calls
    }

    /// Times at which `leds` was toggled.
    pub fn toggles_of(&self, leds: Leds) -> Vec<Millis> {
        self.calls
            .iter()
            .filter(|(_, c)| *c == IndicatorCall::Toggle(leds))
            .map(|(t, _)| *t)
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: IndicatorCall) {
        self.calls.push((self.now, call));
    }
}

impl Default for SimHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorPort for SimHardware {
    fn get(&self) -> Leds {
        self.lit
    }

    fn on(&mut self, leds: Leds) {
        self.record(IndicatorCall::On(leds));
        self.lit = self.lit | leds;
    }

    fn off(&mut self, leds: Leds) {
        self.record(IndicatorCall::Off(leds));
        self.lit = self.lit & !leds;
    }

    fn toggle(&mut self, leds: Leds) {
        self.record(IndicatorCall::Toggle(leds));
        self.lit = Leds((self.lit.0 ^ leds.0) & Leds::ALL.0);
    }

    fn set(&mut self, leds: Leds) {
        self.record(IndicatorCall::Set(leds));
        self.lit = leds & Leds::ALL;
    }
}

impl SensorPort for SimHardware {
    fn read_temperature(&mut self) -> i32 {
        let celsius = self
            .temperatures
            .pop_front()
            .unwrap_or(self.steady_temperature);
        if !(SHT11_MIN_CELSIUS..=SHT11_MAX_CELSIUS).contains(&celsius) {
            warn!("scripted temperature {celsius} outside the sensor range, saturating");
        }
        sht11_celsius(sht11_raw_for(celsius))
    }

    fn read_light(&mut self) -> i32 {
        self.light_raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_then_steady() {
        let mut hw = SimHardware::new();
        hw.set_steady_temperature(22);
        hw.script_temperatures([14, 30]);
        assert_eq!(hw.read_temperature(), 14);
        assert_eq!(hw.read_temperature(), 30);
        assert_eq!(hw.read_temperature(), 22);
        assert_eq!(hw.read_temperature(), 22);
    }

    #[test]
    fn out_of_range_script_saturates() {
        let mut hw = SimHardware::new();
        hw.script_temperatures([-45, -39, 615, 700, i32::MAX]);
        assert_eq!(hw.read_temperature(), -39);
        assert_eq!(hw.read_temperature(), -39);
        assert_eq!(hw.read_temperature(), 615);
        assert_eq!(hw.read_temperature(), 615);
        assert_eq!(hw.read_temperature(), 615);
    }

    #[test]
    fn calls_are_stamped() {
        let mut hw = SimHardware::new();
        hw.set_clock(2_000);
        hw.toggle(Leds::BLUE);
        hw.set_clock(4_000);
        hw.toggle(Leds::BLUE);
        hw.on(Leds::RED);
        assert_eq!(hw.toggles_of(Leds::BLUE), vec![2_000, 4_000]);
        assert_eq!(hw.lit(), Leds::RED);
        assert_eq!(hw.calls().len(), 3);
    }
}
