//! Mocks of the broker-facing seams for unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::consumer::{InboundMessage, MessageSource};
use crate::errors::StreamError;
use crate::producer::{EventSink, OutboundRecord};
use crate::topics::{CreateOutcome, TopicAdmin, TopicSpec};

/// Mock admin counting how often the broker is contacted.
pub struct MockAdmin {
    existing: Mutex<HashSet<String>>,
    created: Mutex<Vec<TopicSpec>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    create_delay: Option<Duration>,
    fail_creates: bool,
    fail_listing: bool,
    already_exists: bool,
}

impl MockAdmin {
    pub fn new() -> Self {
        Self {
            existing: Mutex::new(HashSet::new()),
            created: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            create_delay: None,
            fail_creates: false,
            fail_listing: false,
            already_exists: false,
        }
    }

    pub fn with_existing(topics: &[&str]) -> Self {
        let admin = Self::new();
        admin
            .existing
            .lock()
            .unwrap()
            .extend(topics.iter().map(|t| t.to_string()));
        admin
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    pub fn failing_creates(mut self) -> Self {
        self.fail_creates = true;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn reporting_already_exists(mut self) -> Self {
        self.already_exists = true;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn created_specs(&self) -> Vec<TopicSpec> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl TopicAdmin for MockAdmin {
    async fn topic_exists(&self, name: &str) -> Result<bool, StreamError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(StreamError::kafka("Mock listing error"));
        }
        Ok(self.existing.lock().unwrap().contains(name))
    }

    async fn create_topic(
        &self,
        spec: &TopicSpec,
        _timeout: Duration,
    ) -> Result<CreateOutcome, StreamError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_creates {
            return Err(StreamError::topic_creation(&spec.name, "Mock broker rejected topic"));
        }
        if self.already_exists {
            return Ok(CreateOutcome::AlreadyExists);
        }
        self.created.lock().unwrap().push(spec.clone());
        self.existing.lock().unwrap().insert(spec.name.clone());
        Ok(CreateOutcome::Created)
    }
}

/// A record captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentRecord {
    pub topic: String,
    pub key: Vec<u8>,
    pub payload: Vec<u8>,
    pub timestamp: i64,
    pub key_schema: String,
    pub value_schema: String,
}

/// Sink capturing every record. Clones share the same buffers, so a test
/// can keep one while the producer owns another.
#[derive(Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<SentRecord>>>,
    flushes: Arc<AtomicUsize>,
    fail_sends: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<SentRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl EventSink for RecordingSink {
    fn send(&self, record: OutboundRecord<'_>) -> Result<(), StreamError> {
        if self.fail_sends {
            return Err(StreamError::kafka("Mock queue full"));
        }
        self.records.lock().unwrap().push(SentRecord {
            topic: record.topic.to_string(),
            key: record.key.to_vec(),
            payload: record.payload.to_vec(),
            timestamp: record.timestamp,
            key_schema: record.key_schema.to_string(),
            value_schema: record.value_schema.to_string(),
        });
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> Result<(), StreamError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Source replaying a fixed script of poll results, then reporting no data.
pub struct ScriptedSource {
    script: VecDeque<Result<InboundMessage, StreamError>>,
    polls: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<InboundMessage, StreamError>>) -> Self {
        Self {
            script: script.into(),
            polls: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Source delivering `count` JSON messages `{"n": i}` on one partition.
    pub fn numbered(topic: &str, count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|i| {
                    Ok(InboundMessage::new(topic, 0, i as i64)
                        .with_payload(format!("{{\"n\":{i}}}").into_bytes()))
                })
                .collect(),
        )
    }

    pub fn poll_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.polls)
    }

    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closed)
    }
}

impl MessageSource for ScriptedSource {
    fn poll(&mut self, _timeout: Duration) -> Option<Result<InboundMessage, StreamError>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.script.pop_front()
    }

    fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}
