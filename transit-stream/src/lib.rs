//! # Transit Stream
//!
//! Event production and consumption for the transit pipeline.
//!
//! ## Architecture
//!
//! The crate is built from four pieces, leaves first:
//!
//! 1. **TopicRegistry**: idempotent, process-wide topic provisioning
//! 2. **EventProducer**: publishes one entity's events to its own topic
//! 3. **PollLoop**: drains a subscription, then sleeps, until cancelled
//! 4. **KeyedAggregator**: last-write-wins table mirrored to a changelog
//!
//! ## Modules
//!
//! - [`topics`]: topic specs, the admin seam and the registry
//! - [`producer`]: the event sink seam and the event producer
//! - [`consumer`]: message sources, assignment policy and the poll loop
//! - [`aggregator`]: keyed aggregation and the station table
//! - [`models`]: consumer-side views (weather, arrivals, turnstiles)
//! - [`errors`]: error types for the stream layer

pub mod aggregator;
pub mod consumer;
pub mod errors;
pub mod models;
pub mod producer;
pub mod topics;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::{Changelog, KeyedAggregator, StationAggregation, Summarize};
pub use consumer::{
    group_id_for, InboundMessage, KafkaSource, LoopStats, MessageHandler, MessageSource,
    OffsetReset, PollLoop, PollLoopConfig,
};
pub use errors::StreamError;
pub use models::{ArrivalBoard, TurnstileTally, WeatherState};
pub use producer::{EventProducer, EventSink, KafkaEventSink, ProducerSettings};
pub use topics::{KafkaTopicAdmin, TopicAdmin, TopicRegistry, TopicSpec};
