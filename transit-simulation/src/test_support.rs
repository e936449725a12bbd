//! In-memory stand-ins for the broker seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use transit_stream::producer::OutboundRecord;
use transit_stream::topics::CreateOutcome;
use transit_stream::{EventSink, InboundMessage, MessageSource, StreamError, TopicAdmin, TopicSpec};

/// Admin recording every created topic.
#[derive(Default)]
pub struct MemoryAdmin {
    created: Mutex<Vec<String>>,
}

impl MemoryAdmin {
    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl TopicAdmin for MemoryAdmin {
    async fn topic_exists(&self, name: &str) -> Result<bool, StreamError> {
        Ok(self.created.lock().unwrap().iter().any(|t| t == name))
    }

    async fn create_topic(
        &self,
        spec: &TopicSpec,
        _timeout: Duration,
    ) -> Result<CreateOutcome, StreamError> {
        self.created.lock().unwrap().push(spec.name.clone());
        Ok(CreateOutcome::Created)
    }
}

/// Sink counting records per topic. Clones share their counters.
#[derive(Clone, Default)]
pub struct MemorySink {
    payloads: Arc<Mutex<HashMap<String, Vec<Vec<u8>>>>>,
    flushes: Arc<AtomicUsize>,
}

impl MemorySink {
    pub fn count(&self, topic: &str) -> usize {
        self.payloads
            .lock()
            .unwrap()
            .get(topic)
            .map_or(0, Vec::len)
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.payloads
            .lock()
            .unwrap()
            .iter()
            .filter(|(topic, _)| topic.starts_with(prefix))
            .map(|(_, payloads)| payloads.len())
            .sum()
    }

    pub fn payloads(&self, topic: &str) -> Vec<Vec<u8>> {
        self.payloads
            .lock()
            .unwrap()
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl EventSink for MemorySink {
    fn send(&self, record: OutboundRecord<'_>) -> Result<(), StreamError> {
        self.payloads
            .lock()
            .unwrap()
            .entry(record.topic.to_string())
            .or_default()
            .push(record.payload.to_vec());
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> Result<(), StreamError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Source that never yields a record.
#[derive(Default)]
pub struct IdleSource {
    closed: Arc<AtomicBool>,
}

impl IdleSource {
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

impl MessageSource for IdleSource {
    fn poll(&mut self, _timeout: Duration) -> Option<Result<InboundMessage, StreamError>> {
        None
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
