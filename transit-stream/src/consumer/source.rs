use std::time::Duration;

use rdkafka::consumer::{BaseConsumer, Consumer};
use tracing::info;

use crate::consumer::{AssignmentContext, InboundMessage, OffsetReset};
use crate::errors::StreamError;
use transit_kafka::ClusterConfig;

/// Consumer group id for a topic pattern.
pub fn group_id_for(pattern: &str) -> String {
    format!("{pattern}-group")
}

/// A subscription a [`PollLoop`](crate::PollLoop) drains.
pub trait MessageSource: Send {
    /// Wait at most `timeout` for the next record.
    ///
    /// `None` means nothing is available right now.
    fn poll(&mut self, timeout: Duration) -> Option<Result<InboundMessage, StreamError>>;

    /// Release the subscription. Later polls return `None`.
    fn close(&mut self);
}

/// [`MessageSource`] backed by an `rdkafka` `BaseConsumer`.
pub struct KafkaSource {
    pattern: String,
    consumer: Option<BaseConsumer<AssignmentContext>>,
}

impl KafkaSource {
    /// Join the pattern's consumer group and subscribe to it.
    ///
    /// A pattern starting with `^` is matched as a regex against topic names.
    pub fn subscribe(
        cluster: &ClusterConfig,
        pattern: &str,
        reset: OffsetReset,
    ) -> Result<Self, StreamError> {
        let group_id = group_id_for(pattern);
        let consumer: BaseConsumer<AssignmentContext> = cluster
            .consumer_client_config(&group_id, reset.is_earliest())
            .create_with_context(AssignmentContext::new(&group_id, reset))
            .map_err(|e| StreamError::kafka(format!("Failed to create consumer: {}", e)))?;

        consumer
            .subscribe(&[pattern])
            .map_err(|e| StreamError::kafka(format!("Failed to subscribe to {}: {}", pattern, e)))?;

        info!(
            pattern = %pattern,
            group_id = %group_id,
            offset_reset = ?reset,
            "Subscribed consumer"
        );

        Ok(Self {
            pattern: pattern.to_string(),
            consumer: Some(consumer),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl MessageSource for KafkaSource {
    fn poll(&mut self, timeout: Duration) -> Option<Result<InboundMessage, StreamError>> {
        let consumer = self.consumer.as_ref()?;
        consumer.poll(timeout).map(|result| {
            result
                .map(|message| InboundMessage::from_kafka(&message))
                .map_err(|e| StreamError::poll(e.to_string()))
        })
    }

    fn close(&mut self) {
        if let Some(consumer) = self.consumer.take() {
            consumer.unsubscribe();
            info!(pattern = %self.pattern, "Consumer closed");
        }
    }
}

impl Drop for KafkaSource {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for KafkaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaSource")
            .field("pattern", &self.pattern)
            .field("closed", &self.consumer.is_none())
            .finish()
    }
}
