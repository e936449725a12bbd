use tracing::debug;

use crate::consumer::{InboundMessage, MessageHandler};
use crate::errors::StreamError;
use transit_shared::{WeatherReading, WeatherStatus};

/// Temperature reported before the first reading arrives.
pub const INITIAL_TEMPERATURE: f64 = 70.0;

/// Latest weather, replaced wholesale by every reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherState {
    pub temperature: f64,
    pub status: WeatherStatus,
}

impl WeatherState {
    pub fn new() -> Self {
        Self {
            temperature: INITIAL_TEMPERATURE,
            status: WeatherStatus::Sunny,
        }
    }

    pub fn update(&mut self, reading: WeatherReading) {
        self.temperature = reading.temperature;
        self.status = reading.status;
    }
}

impl Default for WeatherState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageHandler for WeatherState {
    fn handle(&mut self, message: &InboundMessage) -> Result<(), StreamError> {
        let reading: WeatherReading = message.decode()?;
        self.update(reading);
        debug!(
            temperature = self.temperature,
            status = ?self.status,
            "Weather updated"
        );
        Ok(())
    }
}
