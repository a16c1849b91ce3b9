//! Pin-level mock board for integration tests.
//!
//! Three recording GPIO pins behind the real [`PinIndicators`] driver plus
//! scripted sensors, so a node service can run on the same driver stack a
//! physical board would use.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use homemesh::app::ports::{IndicatorPort, Leds, SensorPort};
use homemesh::drivers::indicators::PinIndicators;

// ── Recording pin ─────────────────────────────────────────────

/// Output pin that appends every level it is driven to into a shared log.
#[derive(Clone, Default)]
pub struct MockPin {
    pub levels: Rc<RefCell<Vec<bool>>>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.levels.borrow().last().copied().unwrap_or(false)
    }

    pub fn writes(&self) -> usize {
        self.levels.borrow().len()
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub leds: PinIndicators<MockPin, MockPin, MockPin>,
    pub red: MockPin,
    pub green: MockPin,
    pub blue: MockPin,
    pub temperatures: VecDeque<i32>,
    pub light_raw: i32,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        let (red, green, blue) = (MockPin::new(), MockPin::new(), MockPin::new());
        Self {
            leds: PinIndicators::new(red.clone(), green.clone(), blue.clone()),
            red,
            green,
            blue,
            temperatures: VecDeque::new(),
            light_raw: 0,
        }
    }

    /// Pin levels as an indicator pattern.
    pub fn pins(&self) -> Leds {
        let mut lit = Leds::NONE;
        if self.red.is_high() {
            lit = lit | Leds::RED;
        }
        if self.green.is_high() {
            lit = lit | Leds::GREEN;
        }
        if self.blue.is_high() {
            lit = lit | Leds::BLUE;
        }
        lit
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorPort for MockBoard {
    fn get(&self) -> Leds {
        self.leds.get()
    }

    fn on(&mut self, leds: Leds) {
        self.leds.on(leds);
    }

    fn off(&mut self, leds: Leds) {
        self.leds.off(leds);
    }

    fn toggle(&mut self, leds: Leds) {
        self.leds.toggle(leds);
    }

    fn set(&mut self, leds: Leds) {
        self.leds.set(leds);
    }
}

impl SensorPort for MockBoard {
    fn read_temperature(&mut self) -> i32 {
        self.temperatures.pop_front().unwrap_or(20)
    }

    fn read_light(&mut self) -> i32 {
        self.light_raw
    }
}
