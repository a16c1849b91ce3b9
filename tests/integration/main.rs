//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a subsystem against
//! mock or simulated adapters.  All tests run on the host with no real
//! hardware required.

mod board_tests;
mod mock_hw;
mod scenario_tests;
