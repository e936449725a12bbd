//! Shared Kafka utilities for the transit pipeline.
//!
//! This crate resolves the cluster endpoints every producer and consumer
//! needs and turns them into `rdkafka` client configurations.
//!
//! ## Usage
//!
//! ```ignore
//! use transit_kafka::ClusterConfig;
//!
//! // Using environment variables with local defaults
//! let cluster = ClusterConfig::from_env()?;
//!
//! // Producer with idempotent delivery and a 10ms linger
//! let producer_config = cluster.producer_client_config("stations", &Default::default());
//!
//! // Consumer for a topic pattern, replaying from the beginning
//! let consumer_config =
//!     cluster.consumer_client_config("^org.chicago.cta.station.arrivals.*-group", true);
//! ```

mod clients;
mod config;
mod error;

pub use clients::{DEFAULT_PRODUCER_PROPERTIES, PRODUCER_CLIENT_PREFIX};
pub use config::{
    ClusterConfig, DEFAULT_BROKER_URL, DEFAULT_KSQL_URL, DEFAULT_REST_PROXY_URL,
    DEFAULT_SCHEMA_REGISTRY_URL,
};
pub use error::ConfigError;

// Re-export commonly used rdkafka types for convenience
pub use rdkafka::config::ClientConfig;
