//! # Transit Shared
//!
//! Record types and naming conventions shared by the producers, consumers and
//! stream transformations of the transit pipeline.
//!
//! - [`types`]: records published to and read from the broker
//! - [`topics`]: topic names and station-name sanitization

pub mod topics;
pub mod types;

pub use topics::topic_safe_station_name;
pub use types::arrival::{Arrival, Direction, TrainStatus};
pub use types::key::{time_millis, TimestampKey};
pub use types::station::{Line, Station, TransformedStation};
pub use types::turnstile::TurnstileEntry;
pub use types::weather::{Season, WeatherReading, WeatherStatus};
