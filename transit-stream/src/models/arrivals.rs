use std::collections::HashMap;

use tracing::debug;

use crate::consumer::{InboundMessage, MessageHandler};
use crate::errors::StreamError;
use transit_shared::{Arrival, Direction, TrainStatus};

/// The last train seen at one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformStatus {
    pub train_id: String,
    pub train_status: TrainStatus,
}

/// Latest arrival per station and direction, fed from every arrival topic.
#[derive(Debug, Clone, Default)]
pub struct ArrivalBoard {
    platforms: HashMap<(i64, Direction), PlatformStatus>,
}

impl ArrivalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, arrival: &Arrival) {
        self.platforms.insert(
            (arrival.station_id, arrival.direction),
            PlatformStatus {
                train_id: arrival.train_id.clone(),
                train_status: arrival.train_status,
            },
        );
    }

    pub fn latest(&self, station_id: i64, direction: Direction) -> Option<&PlatformStatus> {
        self.platforms.get(&(station_id, direction))
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl MessageHandler for ArrivalBoard {
    fn handle(&mut self, message: &InboundMessage) -> Result<(), StreamError> {
        let arrival: Arrival = message.decode()?;
        debug!(
            topic = %message.topic,
            station_id = arrival.station_id,
            train_id = %arrival.train_id,
            "Train arrived"
        );
        self.record(&arrival);
        Ok(())
    }
}
