//! Broker-side topic administration.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::types::RDKafkaErrorCode;
use tracing::debug;

use crate::errors::StreamError;
use crate::topics::TopicSpec;
use transit_kafka::ClusterConfig;

/// Default timeout for fetching the broker's topic listing.
const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// How a create request ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The broker created the topic.
    Created,
    /// Another client created the topic first.
    AlreadyExists,
}

/// The broker operations the topic registry relies on.
#[async_trait]
pub trait TopicAdmin: Send + Sync {
    /// Whether the broker currently lists the topic.
    async fn topic_exists(&self, name: &str) -> Result<bool, StreamError>;

    /// Ask the broker to create the topic, waiting at most `timeout`.
    async fn create_topic(
        &self,
        spec: &TopicSpec,
        timeout: Duration,
    ) -> Result<CreateOutcome, StreamError>;
}

/// [`TopicAdmin`] backed by an `rdkafka` admin client.
pub struct KafkaTopicAdmin {
    admin: AdminClient<DefaultClientContext>,
    metadata_timeout: Duration,
}

impl KafkaTopicAdmin {
    /// Create an admin client for the cluster.
    pub fn new(cluster: &ClusterConfig) -> Result<Self, StreamError> {
        let admin = cluster
            .admin_client_config()
            .create()
            .map_err(|e| StreamError::kafka(format!("Failed to create admin client: {}", e)))?;

        Ok(Self {
            admin,
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
        })
    }

    /// Override how long a topic listing may take.
    pub fn with_metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }
}

#[async_trait]
impl TopicAdmin for KafkaTopicAdmin {
    async fn topic_exists(&self, name: &str) -> Result<bool, StreamError> {
        // Fetch the full listing: asking for a single topic by name can
        // trigger broker-side auto-creation.
        let metadata = self
            .admin
            .inner()
            .fetch_metadata(None, self.metadata_timeout)?;

        let exists = metadata.topics().iter().any(|topic| topic.name() == name);
        debug!(topic = %name, exists = exists, "Fetched topic listing");
        Ok(exists)
    }

    async fn create_topic(
        &self,
        spec: &TopicSpec,
        timeout: Duration,
    ) -> Result<CreateOutcome, StreamError> {
        let mut new_topic = NewTopic::new(
            &spec.name,
            spec.partitions,
            TopicReplication::Fixed(spec.replicas),
        );
        for (key, value) in &spec.config {
            new_topic = new_topic.set(key, value);
        }

        let options = AdminOptions::new().operation_timeout(Some(timeout));
        let results = self
            .admin
            .create_topics([&new_topic], &options)
            .await
            .map_err(|e| StreamError::topic_creation(&spec.name, e.to_string()))?;

        match results.into_iter().next() {
            Some(Ok(_)) => Ok(CreateOutcome::Created),
            Some(Err((_, RDKafkaErrorCode::TopicAlreadyExists))) => {
                Ok(CreateOutcome::AlreadyExists)
            }
            Some(Err((topic, code))) => Err(StreamError::topic_creation(topic, code.to_string())),
            None => Err(StreamError::topic_creation(
                &spec.name,
                "broker returned no result for the create request",
            )),
        }
    }
}

impl std::fmt::Debug for KafkaTopicAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaTopicAdmin")
            .field("metadata_timeout", &self.metadata_timeout)
            .finish_non_exhaustive()
    }
}
