//! Application boundary: commands, outbound events and port traits.
//!
//! Node services in [`crate::node`] hold the business rules.  All
//! interaction with hardware happens through the **port traits** defined
//! in [`ports`], keeping the node logic fully testable without real
//! peripherals.

pub mod commands;
pub mod events;
pub mod ports;
