//! Error types for the stream layer.
//!
//! Construction-time failures (`Configuration`, `TopicCreationFailed`) are
//! meant to halt startup. Steady-state failures (`Poll`, `Dispatch`,
//! `Serialization`) are isolated by the poll loop and only logged.

use thiserror::Error;
use transit_kafka::ConfigError;

/// Errors that can occur while producing, consuming or aggregating events.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Cluster configuration could not be resolved.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The broker rejected or timed out a topic creation.
    #[error("Failed to create topic {topic}: {cause}")]
    TopicCreationFailed { topic: String, cause: String },

    /// The broker reported an error while polling.
    #[error("Poll error: {0}")]
    Poll(String),

    /// A handler failed on a successfully polled message.
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// A payload did not match the expected record shape.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Kafka client error outside of polling.
    #[error("Kafka error: {0}")]
    Kafka(String),

    /// The producer for this topic has already been closed.
    #[error("Producer for topic {0} is closed")]
    Closed(String),
}

impl StreamError {
    /// Create a topic creation error.
    pub fn topic_creation(topic: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::TopicCreationFailed {
            topic: topic.into(),
            cause: cause.into(),
        }
    }

    /// Create a poll error.
    pub fn poll(msg: impl Into<String>) -> Self {
        Self::Poll(msg.into())
    }

    /// Create a dispatch error.
    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a Kafka error.
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::Kafka(msg.into())
    }
}

impl From<rdkafka::error::KafkaError> for StreamError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::Kafka(err.to_string())
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
