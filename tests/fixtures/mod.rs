//! Test fixtures for mission-planner.
//!
//! Provides realistic named Lyon-area sites for building missions with
//! real-world coordinate spreads.

pub mod lyon_sites;

pub use lyon_sites::*;
