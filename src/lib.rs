//! HomeMesh controller library.
//!
//! Pure node logic for a four-node home-automation mesh: the operator
//! coordinator and the entrance, gate and bedroom peripherals.  Hardware,
//! radio and console sit behind port traits; the [`sim`] module wires
//! every node to simulated boards and a lossy radio for testing and for
//! the demo binary.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod events;
pub mod mesh;
pub mod node;
pub mod scheduler;
pub mod sensors;
pub mod sim;
