//! Topic provisioning.
//!
//! Producers never create topics directly; they ask the shared
//! [`TopicRegistry`], which talks to the broker through a [`TopicAdmin`].

mod admin;
mod registry;
mod spec;

pub use admin::{CreateOutcome, KafkaTopicAdmin, TopicAdmin};
pub use registry::{TopicRegistry, DEFAULT_CREATION_TIMEOUT};
pub use spec::{TopicSpec, DEFAULT_TOPIC_CONFIG};
