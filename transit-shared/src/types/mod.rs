//! Record types carried on transit topics.

pub mod arrival;
pub mod key;
pub mod station;
pub mod turnstile;
pub mod weather;
