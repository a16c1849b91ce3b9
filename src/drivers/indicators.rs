//! Three-LED indicator bank on GPIO output pins.
//!
//! Red, green and blue LEDs on three push-pull outputs, active high.
//! The driver keeps a shadow of what it last wrote so [`IndicatorPort::get`]
//! never has to read the pins back.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{IndicatorPort, Leds};

pub struct PinIndicators<R, G, B> {
    red: R,
    green: G,
    blue: B,
    lit: Leds,
}

impl<R: OutputPin, G: OutputPin, B: OutputPin> PinIndicators<R, G, B> {
    /// Take the pins and switch every LED off.
    pub fn new(red: R, green: G, blue: B) -> Self {
        let mut bank = Self {
            red,
            green,
            blue,
            lit: Leds::ALL,
        };
        bank.write(Leds::NONE);
        bank
    }

    /// Drive the pins to `target`, touching only the ones that change.
    fn write(&mut self, target: Leds) {
        let changed = self.lit.0 ^ target.0;
        if changed & Leds::RED.0 != 0 {
            drive(&mut self.red, target.contains(Leds::RED));
        }
        if changed & Leds::GREEN.0 != 0 {
            drive(&mut self.green, target.contains(Leds::GREEN));
        }
        if changed & Leds::BLUE.0 != 0 {
            drive(&mut self.blue, target.contains(Leds::BLUE));
        }
        self.lit = target;
    }

    pub fn release(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) {
    // GPIO writes on these boards are infallible in practice.
    if high {
        pin.set_high().ok();
    } else {
        pin.set_low().ok();
    }
}

impl<R: OutputPin, G: OutputPin, B: OutputPin> IndicatorPort for PinIndicators<R, G, B> {
    fn get(&self) -> Leds {
        self.lit
    }

    fn on(&mut self, leds: Leds) {
        self.write(self.lit | leds);
    }

    fn off(&mut self, leds: Leds) {
        self.write(self.lit & !leds);
    }

    fn toggle(&mut self, leds: Leds) {
        self.write(Leds((self.lit.0 ^ leds.0) & Leds::ALL.0));
    }

    fn set(&mut self, leds: Leds) {
        self.write(leds & Leds::ALL);
    }
}
