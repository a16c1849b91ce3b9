//! Closed-loop control.

pub mod comfort;
