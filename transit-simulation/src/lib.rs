//! # Transit Simulation
//!
//! Simulates a small rail network and publishes its events to Kafka, then
//! consumes them back into in-memory summaries.
//!
//! ## Architecture
//!
//! 1. **Simulation**: trains, turnstiles and weather, one producer per stream
//! 2. **Consumers**: poll loops feeding the station table, the arrival board,
//!    the turnstile tally and the current weather
//! 3. **Orchestrator**: ticks the simulation and owns the consumer tasks
//!
//! ## Modules
//!
//! - [`catalogue`]: The stations the network runs
//! - [`config`]: Simulation settings from the environment
//! - [`dependencies`]: Wiring for the Kafka-backed binary
//! - [`network`]: Train movement along the lines
//! - [`orchestrator`]: Tick loop and consumer lifecycle
//! - [`simulation`]: Producers and the per-tick publishing
//! - [`weather`]: Seasonal temperature walk

pub mod catalogue;
pub mod config;
pub mod dependencies;
pub mod network;
pub mod orchestrator;
pub mod simulation;
pub mod weather;

#[cfg(test)]
mod test_support;

pub use config::SimulationConfig;
pub use dependencies::Dependencies;
pub use orchestrator::{Orchestrator, RunSummary};
pub use simulation::{Simulation, TickReport};

use thiserror::Error;
use transit_kafka::ConfigError;
use transit_stream::StreamError;

/// Errors that can occur during simulation startup or execution.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),
}
