//! Peripheral drivers: the indicator bank and the button-burst accumulator.

pub mod button;
pub mod indicators;
