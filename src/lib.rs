//! Loading and validation of the configuration of a PCB electromagnetic
//! simulation pipeline.
//!
//! - [`simulation`] turns the simulation configuration document and the board
//!   stackup into a [`SimulationConfiguration`][simulation::SimulationConfiguration].
//! - [`settings`] holds the settings of the tool itself (paths, logging).
//! - [`logging`] sets up `tracing` output.

pub mod logging;
pub mod settings;
pub mod simulation;
pub mod traits;
