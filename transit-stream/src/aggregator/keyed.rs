//! Last-write-wins keyed table mirrored to a changelog.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;
use tracing::debug;

use crate::errors::StreamError;
use crate::producer::{EventProducer, EventSink};

/// Where every mutation of a [`KeyedAggregator`] is appended.
pub trait Changelog<K, V>: Send {
    fn append(&mut self, key: &K, value: &V) -> Result<(), StreamError>;
}

impl<K, V, S> Changelog<K, V> for EventProducer<S>
where
    K: Serialize,
    V: Serialize,
    S: EventSink,
{
    fn append(&mut self, key: &K, value: &V) -> Result<(), StreamError> {
        self.publish(key, value)
    }
}

/// In-memory changelog, the entries in append order.
impl<K, V> Changelog<K, V> for Vec<(K, V)>
where
    K: Clone + Send,
    V: Clone + Send,
{
    fn append(&mut self, key: &K, value: &V) -> Result<(), StreamError> {
        self.push((key.clone(), value.clone()));
        Ok(())
    }
}

/// Pure mapping from an input record to its key and derived summary.
pub trait Summarize {
    type Input;
    type Key: Eq + Hash + Clone;
    type Summary: Clone;

    fn key(&self, input: &Self::Input) -> Self::Key;

    fn summarize(&self, input: &Self::Input) -> Self::Summary;
}

/// Origin of an input record inside its source topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition<'a> {
    pub topic: &'a str,
    pub partition: i32,
    pub offset: i64,
}

/// What [`KeyedAggregator::apply`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// First record seen for the key.
    Inserted,
    /// Replaced the previous summary for the key.
    Overwritten,
    /// The record was at or behind the last applied offset of its partition.
    Skipped,
}

/// Maintains `key -> latest summary` for one input stream.
///
/// Every mutation is appended to the changelog before the table changes, so
/// if the append fails the table is left as it was and the changelog never
/// lags behind it. Entries are only ever overwritten, never merged or
/// removed.
///
/// Records carrying a [`SourcePosition`] are applied in increasing offset
/// order per topic partition; a redelivered record is skipped.
pub struct KeyedAggregator<M: Summarize, C> {
    mapper: M,
    table: HashMap<M::Key, M::Summary>,
    changelog: C,
    /// Last applied offset by topic, then partition.
    applied_offsets: HashMap<String, HashMap<i32, i64>>,
}

impl<M, C> KeyedAggregator<M, C>
where
    M: Summarize,
    C: Changelog<M::Key, M::Summary>,
{
    pub fn new(mapper: M, changelog: C) -> Self {
        Self {
            mapper,
            table: HashMap::new(),
            changelog,
            applied_offsets: HashMap::new(),
        }
    }

    /// Rebuild the table by replaying changelog entries from empty.
    ///
    /// Replayed entries are not appended again.
    pub fn restore<I>(mapper: M, changelog: C, entries: I) -> Self
    where
        I: IntoIterator<Item = (M::Key, M::Summary)>,
    {
        let mut aggregator = Self::new(mapper, changelog);
        let mut replayed = 0usize;
        for (key, summary) in entries {
            aggregator.table.insert(key, summary);
            replayed += 1;
        }
        debug!(
            replayed = replayed,
            keys = aggregator.table.len(),
            "Restored table from changelog"
        );
        aggregator
    }

    /// Summarize one record and store it under its key.
    pub fn apply(
        &mut self,
        position: Option<SourcePosition<'_>>,
        input: &M::Input,
    ) -> Result<Applied, StreamError> {
        if let Some(position) = position {
            let last_applied = self
                .applied_offsets
                .get(position.topic)
                .and_then(|partitions| partitions.get(&position.partition));
            if let Some(&last) = last_applied {
                if position.offset <= last {
                    debug!(
                        topic = %position.topic,
                        partition = position.partition,
                        offset = position.offset,
                        last_applied = last,
                        "Skipping already applied record"
                    );
                    return Ok(Applied::Skipped);
                }
            }
        }

        let key = self.mapper.key(input);
        let summary = self.mapper.summarize(input);

        self.changelog.append(&key, &summary)?;

        if let Some(position) = position {
            self.applied_offsets
                .entry(position.topic.to_string())
                .or_default()
                .insert(position.partition, position.offset);
        }

        match self.table.insert(key, summary) {
            None => Ok(Applied::Inserted),
            Some(_) => Ok(Applied::Overwritten),
        }
    }

    pub fn get(&self, key: &M::Key) -> Option<&M::Summary> {
        self.table.get(key)
    }

    pub fn table(&self) -> &HashMap<M::Key, M::Summary> {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn changelog(&self) -> &C {
        &self.changelog
    }

    pub fn changelog_mut(&mut self) -> &mut C {
        &mut self.changelog
    }
}
