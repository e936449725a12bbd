use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::errors::StreamError;
use crate::producer::{EventSink, KafkaEventSink, OutboundRecord};
use crate::topics::{TopicRegistry, TopicSpec};
use transit_kafka::ClusterConfig;
use transit_shared::time_millis;

/// How long `close` and `Drop` wait for buffered records.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything a producer needs to know about the topic it owns.
#[derive(Debug, Clone)]
pub struct ProducerSettings {
    pub topic: TopicSpec,
    pub key_schema: String,
    pub value_schema: String,
    /// Suffix of the client id, defaults to the topic name.
    pub client_name: String,
    /// Broker properties merged over the producer defaults.
    pub overrides: BTreeMap<String, String>,
}

impl ProducerSettings {
    pub fn new(
        topic: TopicSpec,
        key_schema: impl Into<String>,
        value_schema: impl Into<String>,
    ) -> Self {
        Self {
            client_name: topic.name.clone(),
            topic,
            key_schema: key_schema.into(),
            value_schema: value_schema.into(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }
}

/// Publishes one entity's events to the topic it owns.
///
/// The topic is ensured through the registry before a producer is handed
/// out, so a constructed producer can always publish. Buffered records are
/// flushed by [`close`](Self::close), or by `Drop` on any other exit path.
pub struct EventProducer<S: EventSink = KafkaEventSink> {
    settings: ProducerSettings,
    sink: Option<S>,
    flush_timeout: Duration,
}

impl EventProducer<KafkaEventSink> {
    /// Ensure the topic exists, then connect a Kafka producer for it.
    ///
    /// # Errors
    ///
    /// * `StreamError::TopicCreationFailed` - The topic could not be created
    /// * `StreamError::Kafka` - The producer client could not be created
    pub async fn connect(
        registry: &TopicRegistry,
        cluster: &ClusterConfig,
        settings: ProducerSettings,
    ) -> Result<Self, StreamError> {
        registry.ensure(&settings.topic).await?;
        let sink = KafkaEventSink::new(cluster, &settings.client_name, &settings.overrides)?;
        Ok(Self::ready(settings, sink))
    }
}

impl<S: EventSink> EventProducer<S> {
    /// Ensure the topic exists, then publish through the given sink.
    pub async fn with_sink(
        registry: &TopicRegistry,
        settings: ProducerSettings,
        sink: S,
    ) -> Result<Self, StreamError> {
        registry.ensure(&settings.topic).await?;
        Ok(Self::ready(settings, sink))
    }

    fn ready(settings: ProducerSettings, sink: S) -> Self {
        info!(
            topic = %settings.topic.name,
            client = %settings.client_name,
            "Producer ready"
        );
        Self {
            settings,
            sink: Some(sink),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }

    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    pub fn topic(&self) -> &str {
        &self.settings.topic.name
    }

    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    /// Publish an event stamped with the current time.
    pub fn publish<K, V>(&self, key: &K, value: &V) -> Result<(), StreamError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        self.publish_at(key, value, time_millis())
    }

    /// Publish an event with an explicit timestamp in epoch milliseconds.
    ///
    /// Only enqueues the record; delivery happens in the background.
    pub fn publish_at<K, V>(&self, key: &K, value: &V, timestamp: i64) -> Result<(), StreamError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| StreamError::Closed(self.settings.topic.name.clone()))?;

        let key = serde_json::to_vec(key)?;
        let payload = serde_json::to_vec(value)?;

        sink.send(OutboundRecord {
            topic: &self.settings.topic.name,
            key: &key,
            payload: &payload,
            timestamp,
            key_schema: &self.settings.key_schema,
            value_schema: &self.settings.value_schema,
        })?;

        debug!(topic = %self.settings.topic.name, timestamp = timestamp, "Event enqueued");
        Ok(())
    }

    /// Wait until everything enqueued so far is delivered.
    pub fn flush(&self) -> Result<(), StreamError> {
        match &self.sink {
            Some(sink) => sink.flush(self.flush_timeout),
            None => Err(StreamError::Closed(self.settings.topic.name.clone())),
        }
    }

    /// Flush buffered records and release the connection.
    ///
    /// Closing twice is a no-op. Queued records are never purged.
    pub fn close(&mut self) -> Result<(), StreamError> {
        let Some(sink) = self.sink.take() else {
            return Ok(());
        };
        info!(topic = %self.settings.topic.name, "Flushing producer on close");
        sink.flush(self.flush_timeout)
    }
}

impl<S: EventSink> Drop for EventProducer<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(
                topic = %self.settings.topic.name,
                error = %e,
                "Failed to flush producer on drop"
            );
        }
    }
}

impl<S: EventSink> std::fmt::Debug for EventProducer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventProducer")
            .field("topic", &self.settings.topic.name)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
