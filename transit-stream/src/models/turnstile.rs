use std::collections::HashMap;

use crate::consumer::{InboundMessage, MessageHandler};
use crate::errors::StreamError;
use transit_shared::TurnstileEntry;

/// Entry counts per station since the consumer started.
#[derive(Debug, Clone, Default)]
pub struct TurnstileTally {
    counts: HashMap<i64, u64>,
    total: u64,
}

impl TurnstileTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: &TurnstileEntry) {
        *self.counts.entry(entry.station_id).or_default() += 1;
        self.total += 1;
    }

    pub fn entries(&self, station_id: i64) -> u64 {
        self.counts.get(&station_id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn stations(&self) -> usize {
        self.counts.len()
    }
}

impl MessageHandler for TurnstileTally {
    fn handle(&mut self, message: &InboundMessage) -> Result<(), StreamError> {
        let entry: TurnstileEntry = message.decode()?;
        self.record(&entry);
        Ok(())
    }
}
