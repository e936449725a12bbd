//! Train arrival records.

use serde::{Deserialize, Serialize};

use super::station::Line;

/// Direction of travel through a station.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    A,
    B,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrainStatus {
    OutOfService,
    InService,
    BrokenDown,
}

/// A train arriving at a station, published on the station's own topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Arrival {
    pub station_id: i64,
    pub train_id: String,
    pub direction: Direction,
    pub line: Line,
    pub train_status: TrainStatus,
    /// Station the train came from, if it did not start here.
    pub prev_station_id: Option<i64>,
    pub prev_direction: Option<Direction>,
}

impl Arrival {
    pub fn new(
        station_id: i64,
        train_id: impl Into<String>,
        direction: Direction,
        line: Line,
        train_status: TrainStatus,
    ) -> Self {
        Self {
            station_id,
            train_id: train_id.into(),
            direction,
            line,
            train_status,
            prev_station_id: None,
            prev_direction: None,
        }
    }

    /// Record the station and direction the train arrived from.
    pub fn from_previous(mut self, station_id: i64, direction: Direction) -> Self {
        self.prev_station_id = Some(station_id);
        self.prev_direction = Some(direction);
        self
    }
}
