//! Consumer-side views of the transit topics.
//!
//! Each model is a [`MessageHandler`](crate::MessageHandler) owned by the
//! poll loop of the topic it follows.

mod arrivals;
mod turnstile;
mod weather;

pub use arrivals::{ArrivalBoard, PlatformStatus};
pub use turnstile::TurnstileTally;
pub use weather::{WeatherState, INITIAL_TEMPERATURE};
