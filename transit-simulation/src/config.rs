//! Simulation settings.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono::{Datelike, Utc};
use transit_kafka::ConfigError;

/// Default seconds between simulation ticks.
const DEFAULT_TICK_SECS: u64 = 5;

/// Default upper bound on turnstile entries per station per tick.
const DEFAULT_TURNSTILE_MAX_ENTRIES: u32 = 5;

/// Default number of trains running on each line.
const DEFAULT_TRAINS_PER_LINE: usize = 2;

/// How the simulated world and its consumers behave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub tick_interval: Duration,
    /// Zero-based month (0 = January) seeding the weather.
    pub month: u32,
    pub turnstile_max_entries: u32,
    pub trains_per_line: usize,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
    /// Whether consumers replay their topics from the beginning on assignment.
    pub offset_earliest: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(DEFAULT_TICK_SECS),
            month: Utc::now().month0(),
            turnstile_max_entries: DEFAULT_TURNSTILE_MAX_ENTRIES,
            trains_per_line: DEFAULT_TRAINS_PER_LINE,
            seed: None,
            offset_earliest: true,
        }
    }
}

impl SimulationConfig {
    /// Create a SimulationConfig from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SIMULATION_TICK_SECS`: Seconds between ticks (default: 5)
    /// - `SIMULATION_MONTH`: Zero-based month, 0-11 (default: current month)
    /// - `TURNSTILE_MAX_ENTRIES`: Max entries per station per tick (default: 5)
    /// - `TRAINS_PER_LINE`: Trains running on each line (default: 2)
    /// - `SIMULATION_SEED`: Seed for the random source (default: entropy)
    /// - `CONSUMER_OFFSET_EARLIEST`: Replay topics on assignment (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tick_secs: u64 = parse(&lookup, "SIMULATION_TICK_SECS")?.unwrap_or(DEFAULT_TICK_SECS);
        if tick_secs == 0 {
            return Err(invalid("SIMULATION_TICK_SECS", "0"));
        }

        let month: u32 = parse(&lookup, "SIMULATION_MONTH")?.unwrap_or(defaults.month);
        if month > 11 {
            return Err(invalid("SIMULATION_MONTH", &month.to_string()));
        }

        let trains_per_line: usize =
            parse(&lookup, "TRAINS_PER_LINE")?.unwrap_or(defaults.trains_per_line);
        if trains_per_line == 0 {
            return Err(invalid("TRAINS_PER_LINE", "0"));
        }

        Ok(Self {
            tick_interval: Duration::from_secs(tick_secs),
            month,
            turnstile_max_entries: parse(&lookup, "TURNSTILE_MAX_ENTRIES")?
                .unwrap_or(defaults.turnstile_max_entries),
            trains_per_line,
            seed: parse(&lookup, "SIMULATION_SEED")?,
            offset_earliest: parse(&lookup, "CONSUMER_OFFSET_EARLIEST")?
                .unwrap_or(defaults.offset_earliest),
        })
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = month;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn parse<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(name, &raw)),
    }
}

fn invalid(name: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.tick_interval, Duration::from_secs(5));
        assert!(config.month <= 11);
        assert_eq!(config.turnstile_max_entries, 5);
        assert_eq!(config.trains_per_line, 2);
        assert_eq!(config.seed, None);
        assert!(config.offset_earliest);
    }

    #[test]
    fn test_overrides() {
        let config = SimulationConfig::from_lookup(lookup_from(&[
            ("SIMULATION_TICK_SECS", "1"),
            ("SIMULATION_MONTH", "7"),
            ("TURNSTILE_MAX_ENTRIES", "0"),
            ("TRAINS_PER_LINE", "3"),
            ("SIMULATION_SEED", "42"),
            ("CONSUMER_OFFSET_EARLIEST", "false"),
        ]))
        .unwrap();

        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.month, 7);
        assert_eq!(config.turnstile_max_entries, 0);
        assert_eq!(config.trains_per_line, 3);
        assert_eq!(config.seed, Some(42));
        assert!(!config.offset_earliest);
    }

    #[test]
    fn test_out_of_range_month_rejected() {
        let err = SimulationConfig::from_lookup(lookup_from(&[("SIMULATION_MONTH", "12")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "SIMULATION_MONTH",
                value: "12".to_string()
            }
        );
    }

    #[test]
    fn test_unparseable_value_rejected() {
        let err = SimulationConfig::from_lookup(lookup_from(&[("SIMULATION_TICK_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "SIMULATION_TICK_SECS",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let zero_tick = lookup_from(&[("SIMULATION_TICK_SECS", "0")]);
        assert!(SimulationConfig::from_lookup(zero_tick).is_err());
    }
}
