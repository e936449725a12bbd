//! Station catalogue records and their line classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The "L" line a station is served by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Line {
    Red,
    Blue,
    Green,
    /// The station's flags matched none of the recognized combinations.
    Unknown,
}

impl Line {
    /// Classify a station from its `(red, blue, green)` flags.
    ///
    /// Exactly one flag set selects that line; every other combination is
    /// [`Line::Unknown`] rather than an error.
    ///
    /// ```
    /// use transit_shared::Line;
    ///
    /// assert_eq!(Line::from_flags(false, true, false), Line::Blue);
    /// assert_eq!(Line::from_flags(true, true, false), Line::Unknown);
    /// ```
    pub fn from_flags(red: bool, blue: bool, green: bool) -> Self {
        match (red, blue, green) {
            (true, false, false) => Line::Red,
            (false, true, false) => Line::Blue,
            (false, false, true) => Line::Green,
            _ => Line::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Line::Red => "red",
            Line::Blue => "blue",
            Line::Green => "green",
            Line::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stop as published on the stations topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub stop_id: i64,
    pub direction_id: String,
    pub stop_name: String,
    pub station_name: String,
    pub station_descriptive_name: String,
    pub station_id: i64,
    pub order: i32,
    pub red: bool,
    pub blue: bool,
    pub green: bool,
}

impl Station {
    /// Line derived from the station's color flags.
    pub fn line(&self) -> Line {
        Line::from_flags(self.red, self.blue, self.green)
    }
}

/// Summary of a stop kept in the transformed station table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransformedStation {
    pub station_id: i64,
    pub station_name: String,
    pub order: i32,
    pub line: Line,
}

impl From<&Station> for TransformedStation {
    fn from(station: &Station) -> Self {
        Self {
            station_id: station.stop_id,
            station_name: station.station_name.clone(),
            order: station.order,
            line: station.line(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(red: bool, blue: bool, green: bool) -> Station {
        Station {
            stop_id: 30001,
            direction_id: "E".to_string(),
            stop_name: "Austin (O'Hare-bound)".to_string(),
            station_name: "Austin".to_string(),
            station_descriptive_name: "Austin (Blue Line)".to_string(),
            station_id: 40010,
            order: 3,
            red,
            blue,
            green,
        }
    }

    #[test]
    fn test_single_flag_selects_line() {
        assert_eq!(Line::from_flags(true, false, false), Line::Red);
        assert_eq!(Line::from_flags(false, true, false), Line::Blue);
        assert_eq!(Line::from_flags(false, false, true), Line::Green);
    }

    #[test]
    fn test_unrecognized_flags_are_unknown() {
        assert_eq!(Line::from_flags(false, false, false), Line::Unknown);
        assert_eq!(Line::from_flags(true, false, true), Line::Unknown);
        assert_eq!(Line::from_flags(true, true, true), Line::Unknown);
    }

    #[test]
    fn test_transformed_station_is_keyed_by_stop() {
        let transformed = TransformedStation::from(&station(false, true, false));
        assert_eq!(transformed.station_id, 30001);
        assert_eq!(transformed.station_name, "Austin");
        assert_eq!(transformed.order, 3);
        assert_eq!(transformed.line, Line::Blue);
    }

    #[test]
    fn test_line_serializes_lowercase() {
        let json = serde_json::to_string(&TransformedStation::from(&station(false, false, false)))
            .unwrap();
        assert!(json.contains("\"line\":\"unknown\""));
    }
}
