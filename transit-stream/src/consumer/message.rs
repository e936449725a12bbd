use rdkafka::message::{BorrowedMessage, Message};
use serde::de::DeserializeOwned;

use crate::errors::StreamError;

/// An owned copy of a polled record, detached from the consumer's buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub payload: Option<Vec<u8>>,
    /// Event time in epoch milliseconds, when the broker reported one.
    pub timestamp: Option<i64>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            key: None,
            payload: None,
            timestamp: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub(crate) fn from_kafka(message: &BorrowedMessage<'_>) -> Self {
        Self {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            key: message.key().map(<[u8]>::to_vec),
            payload: message.payload().map(<[u8]>::to_vec),
            timestamp: message.timestamp().to_millis(),
        }
    }

    /// Decode the JSON payload.
    ///
    /// A missing payload (a tombstone) is a serialization error.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StreamError> {
        let payload = self.payload.as_deref().ok_or_else(|| {
            StreamError::serialization(format!(
                "Empty payload at {}[{}]@{}",
                self.topic, self.partition, self.offset
            ))
        })?;
        Ok(serde_json::from_slice(payload)?)
    }

    /// Decode the JSON key.
    pub fn decode_key<T: DeserializeOwned>(&self) -> Result<T, StreamError> {
        let key = self.key.as_deref().ok_or_else(|| {
            StreamError::serialization(format!(
                "Missing key at {}[{}]@{}",
                self.topic, self.partition, self.offset
            ))
        })?;
        Ok(serde_json::from_slice(key)?)
    }
}
