//! Outbound transport for event producers.

use std::collections::BTreeMap;
use std::time::Duration;

use rdkafka::client::ClientContext;
use rdkafka::error::KafkaError;
use rdkafka::message::{Header, Message, OwnedHeaders};
use rdkafka::producer::{BaseProducer, BaseRecord, DeliveryResult, Producer, ProducerContext};
use rdkafka::types::RDKafkaErrorCode;
use tracing::{error, trace, warn};

use crate::errors::StreamError;
use transit_kafka::ClusterConfig;

/// How many times a full local queue is drained before a send gives up.
const MAX_ENQUEUE_ATTEMPTS: usize = 10;

/// How long to serve delivery reports when the local queue is full.
const QUEUE_FULL_BACKOFF: Duration = Duration::from_millis(100);

/// A record ready to be handed to the transport.
#[derive(Debug, Clone, Copy)]
pub struct OutboundRecord<'a> {
    pub topic: &'a str,
    pub key: &'a [u8],
    pub payload: &'a [u8],
    /// Event time in epoch milliseconds.
    pub timestamp: i64,
    pub key_schema: &'a str,
    pub value_schema: &'a str,
}

/// Transport an [`EventProducer`](crate::EventProducer) publishes through.
///
/// `send` only enqueues; records are delivered in the background and
/// `flush` waits for everything enqueued so far.
pub trait EventSink: Send + Sync {
    fn send(&self, record: OutboundRecord<'_>) -> Result<(), StreamError>;

    fn flush(&self, timeout: Duration) -> Result<(), StreamError>;
}

/// Producer context logging records the broker failed to accept.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryLogger;

impl ClientContext for DeliveryLogger {}

impl ProducerContext for DeliveryLogger {
    type DeliveryOpaque = ();

    fn delivery(
        &self,
        delivery_result: &DeliveryResult<'_>,
        _delivery_opaque: Self::DeliveryOpaque,
    ) {
        match delivery_result {
            Ok(message) => trace!(
                topic = %message.topic(),
                partition = message.partition(),
                offset = message.offset(),
                "Record delivered"
            ),
            Err((err, message)) => error!(
                topic = %message.topic(),
                partition = message.partition(),
                error = %err,
                "Failed to deliver record"
            ),
        }
    }
}

/// [`EventSink`] backed by an `rdkafka` `BaseProducer`.
///
/// Idempotent delivery is enabled through the client configuration, so
/// librdkafka's internal retries never duplicate or reorder a key's records.
pub struct KafkaEventSink {
    producer: BaseProducer<DeliveryLogger>,
}

impl KafkaEventSink {
    /// Connect a producer client.
    ///
    /// # Arguments
    ///
    /// * `cluster` - Cluster endpoints and credentials
    /// * `client_name` - Suffix of the producer's `client.id`
    /// * `overrides` - Broker properties applied over the defaults
    pub fn new(
        cluster: &ClusterConfig,
        client_name: &str,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Self, StreamError> {
        let producer = cluster
            .producer_client_config(client_name, overrides)
            .create_with_context(DeliveryLogger)
            .map_err(|e| StreamError::kafka(format!("Failed to create producer: {}", e)))?;

        Ok(Self { producer })
    }
}

impl EventSink for KafkaEventSink {
    fn send(&self, record: OutboundRecord<'_>) -> Result<(), StreamError> {
        let headers = OwnedHeaders::new()
            .insert(Header {
                key: "key-schema",
                value: Some(record.key_schema),
            })
            .insert(Header {
                key: "value-schema",
                value: Some(record.value_schema),
            });

        let mut base_record = BaseRecord::to(record.topic)
            .key(record.key)
            .payload(record.payload)
            .timestamp(record.timestamp)
            .headers(headers);

        let mut attempts = 1;
        loop {
            match self.producer.send(base_record) {
                Ok(()) => break,
                Err((KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull), returned))
                    if attempts < MAX_ENQUEUE_ATTEMPTS =>
                {
                    warn!(
                        topic = %record.topic,
                        attempt = attempts,
                        "Local producer queue full, waiting for deliveries"
                    );
                    self.producer.poll(QUEUE_FULL_BACKOFF);
                    base_record = returned;
                    attempts += 1;
                }
                Err((e, _)) => return Err(e.into()),
            }
        }

        // Serve delivery reports without blocking
        self.producer.poll(Duration::ZERO);
        Ok(())
    }

    fn flush(&self, timeout: Duration) -> Result<(), StreamError> {
        self.producer
            .flush(timeout)
            .map_err(|e| StreamError::kafka(format!("Failed to flush producer: {}", e)))
    }
}

impl std::fmt::Debug for KafkaEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaEventSink")
            .field("in_flight", &self.producer.in_flight_count())
            .finish_non_exhaustive()
    }
}
