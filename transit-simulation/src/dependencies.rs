//! Dependency initialization and wiring for the simulation binary.

use std::sync::Arc;

use tracing::info;

use crate::config::SimulationConfig;
use crate::orchestrator::Orchestrator;
use crate::simulation::Simulation;
use crate::SimulationError;
use transit_kafka::ClusterConfig;
use transit_shared::topics::{
    ARRIVALS_PATTERN, TOPIC_STATIONS, TOPIC_STATIONS_TABLE, TOPIC_TURNSTILE, TOPIC_WEATHER,
};
use transit_stream::{
    ArrivalBoard, EventProducer, KafkaEventSink, KafkaSource, KafkaTopicAdmin, OffsetReset,
    PollLoop, ProducerSettings, StationAggregation, TopicRegistry, TopicSpec, TurnstileTally,
    WeatherState,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// Cluster endpoints come from [`ClusterConfig::from_env`], simulation
    /// settings from [`SimulationConfig::from_env`].
    ///
    /// # Errors
    ///
    /// * `SimulationError::Config` - An environment variable is missing or invalid
    /// * `SimulationError::Stream` - A topic or a Kafka client could not be created
    pub async fn new() -> Result<Self, SimulationError> {
        let cluster = ClusterConfig::from_env()?;
        let config = SimulationConfig::from_env()?;
        info!(
            broker = %cluster.broker_url,
            tick_secs = config.tick_interval.as_secs(),
            month = config.month,
            "Loaded configuration"
        );

        let admin = KafkaTopicAdmin::new(&cluster)?;
        let registry = TopicRegistry::new(Arc::new(admin));

        let simulation = Simulation::start(&registry, &config, |settings| {
            KafkaEventSink::new(&cluster, &settings.client_name, &settings.overrides)
        })
        .await?;

        let mut orchestrator = Orchestrator::new(simulation, config.tick_interval);
        let reset = OffsetReset::from_earliest(config.offset_earliest);

        let station_table = EventProducer::connect(
            &registry,
            &cluster,
            ProducerSettings::new(
                TopicSpec::new(TOPIC_STATIONS_TABLE, 1, 1).compacted(),
                "station_key",
                "transformed_station_value",
            )
            .with_client_name("stations-table"),
        )
        .await?;

        orchestrator.add_consumer(PollLoop::new(
            "stations",
            KafkaSource::subscribe(&cluster, TOPIC_STATIONS, reset)?,
            StationAggregation::new(station_table),
        ));
        orchestrator.add_consumer(PollLoop::new(
            "weather",
            KafkaSource::subscribe(&cluster, TOPIC_WEATHER, reset)?,
            WeatherState::new(),
        ));
        orchestrator.add_consumer(PollLoop::new(
            "arrivals",
            KafkaSource::subscribe(&cluster, ARRIVALS_PATTERN, reset)?,
            ArrivalBoard::new(),
        ));
        orchestrator.add_consumer(PollLoop::new(
            "turnstile",
            KafkaSource::subscribe(&cluster, TOPIC_TURNSTILE, reset)?,
            TurnstileTally::new(),
        ));

        info!("Dependencies initialized");
        Ok(Self { orchestrator })
    }
}
