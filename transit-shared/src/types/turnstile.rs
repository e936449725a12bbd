//! Turnstile entry records.

use serde::{Deserialize, Serialize};

use super::station::Line;

/// One rider passing a station's turnstile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnstileEntry {
    pub station_id: i64,
    pub station_name: String,
    pub line: Line,
}
