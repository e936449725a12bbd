//! Event keys.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Key attached to every simulated event: the production time in epoch
/// milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimestampKey {
    pub timestamp: i64,
}

impl TimestampKey {
    /// Key stamped with the current time.
    pub fn now() -> Self {
        Self {
            timestamp: time_millis(),
        }
    }
}

/// Current time in epoch milliseconds.
pub fn time_millis() -> i64 {
    Utc::now().timestamp_millis()
}
