//! Event production.
//!
//! An [`EventProducer`] owns one topic. It makes sure the topic exists
//! through the [`TopicRegistry`](crate::TopicRegistry) before it can publish,
//! and flushes whatever is still buffered when it is closed or dropped.

mod event_producer;
mod sink;

pub use event_producer::{EventProducer, ProducerSettings, DEFAULT_FLUSH_TIMEOUT};
pub use sink::{DeliveryLogger, EventSink, KafkaEventSink, OutboundRecord};
