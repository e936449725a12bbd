//! Weather readings and seasonal baselines.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherStatus {
    #[default]
    Sunny,
    PartlyCloudy,
    Cloudy,
    Windy,
    Precipitation,
}

impl WeatherStatus {
    pub const ALL: [WeatherStatus; 5] = [
        WeatherStatus::Sunny,
        WeatherStatus::PartlyCloudy,
        WeatherStatus::Cloudy,
        WeatherStatus::Windy,
        WeatherStatus::Precipitation,
    ];
}

/// A weather reading as published on the weather topic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeatherReading {
    pub temperature: f64,
    pub status: WeatherStatus,
}

/// Season of a month, used to seed simulated temperatures.
///
/// Months are zero-based indexes (0 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Summer,
    Other,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            0..=3 | 10 | 11 => Season::Winter,
            6..=8 => Season::Summer,
            _ => Season::Other,
        }
    }

    /// Starting temperature (°F) for a simulation that begins in this season.
    pub fn baseline_temperature(&self) -> f64 {
        match self {
            Season::Winter => 40.0,
            Season::Summer => 85.0,
            Season::Other => 70.0,
        }
    }

    /// Direction temperatures drift in: down in winter, up in summer.
    pub fn drift(&self) -> f64 {
        match self {
            Season::Winter => -1.0,
            Season::Summer => 1.0,
            Season::Other => 0.0,
        }
    }
}
