//! Topic naming for the transit pipeline.
//!
//! Every topic lives under the `org.chicago.cta` namespace. There is one fixed
//! name per entity type, except arrivals, which get a topic per station.

/// Namespace shared by every transit topic.
pub const TOPIC_NAMESPACE: &str = "org.chicago.cta";

/// Station catalogue, one record per stop.
pub const TOPIC_STATIONS: &str = "org.chicago.cta.stations";

/// Changelog of the transformed station table.
pub const TOPIC_STATIONS_TABLE: &str = "org.chicago.cta.stations.table.v1";

/// Rider entries at every turnstile.
pub const TOPIC_TURNSTILE: &str = "org.chicago.cta.turnstile";

/// Weather readings.
pub const TOPIC_WEATHER: &str = "org.chicago.cta.weather.v1";

/// Prefix of the per-station arrival topics.
pub const TOPIC_ARRIVALS_PREFIX: &str = "org.chicago.cta.station.arrivals";

/// Subscription pattern matching every per-station arrival topic.
pub const ARRIVALS_PATTERN: &str = "^org.chicago.cta.station.arrivals.*";

/// Converts a station name into a string that is safe inside a topic name.
///
/// Lowercases the name, spells `/` as `_and_`, turns spaces and hyphens into
/// underscores and drops apostrophes.
///
/// ```
/// use transit_shared::topic_safe_station_name;
///
/// assert_eq!(
///     topic_safe_station_name("Austin-Forest Park/O'Hare"),
///     "austin_forest_park_and_ohare"
/// );
/// ```
pub fn topic_safe_station_name(station_name: &str) -> String {
    station_name
        .to_lowercase()
        .replace('/', "_and_")
        .replace([' ', '-'], "_")
        .replace('\'', "")
}

/// Arrival topic for a single station.
pub fn arrival_topic(station_name: &str) -> String {
    format!(
        "{TOPIC_ARRIVALS_PREFIX}.{}",
        topic_safe_station_name(station_name)
    )
}
