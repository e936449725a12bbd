//! Seasonal weather random walk.

use rand::seq::SliceRandom;
use rand::Rng;

use transit_shared::{Season, WeatherReading, WeatherStatus};

/// Largest temperature change between two readings.
const MAX_STEP: f64 = 10.0;

/// Current simulated weather.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherModel {
    season: Season,
    reading: WeatherReading,
}

impl WeatherModel {
    /// Start from the baseline temperature of the month's season.
    pub fn new(month: u32) -> Self {
        let season = Season::from_month(month);
        Self {
            season,
            reading: WeatherReading {
                temperature: season.baseline_temperature(),
                status: WeatherStatus::Sunny,
            },
        }
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn current(&self) -> WeatherReading {
        self.reading
    }

    /// Move the temperature by a step drawn around the season's drift and
    /// pick a new status.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> WeatherReading {
        self.reading.temperature += triangular(rng, -MAX_STEP, MAX_STEP, self.season.drift());
        self.reading.status = WeatherStatus::ALL
            .choose(rng)
            .copied()
            .unwrap_or_default();
        self.reading
    }
}

/// Sample a triangular distribution over `[low, high]` peaking at `mode`.
fn triangular<R: Rng>(rng: &mut R, low: f64, high: f64, mode: f64) -> f64 {
    let u: f64 = rng.gen();
    let split = (mode - low) / (high - low);
    if u < split {
        low + ((high - low) * (mode - low) * u).sqrt()
    } else {
        high - ((high - low) * (high - mode) * (1.0 - u)).sqrt()
    }
}
