//! The producing side: one producer per entity stream, driven by ticks.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::network::Network;
use crate::weather::WeatherModel;
use transit_shared::topics::{arrival_topic, TOPIC_STATIONS, TOPIC_TURNSTILE, TOPIC_WEATHER};
use transit_shared::{topic_safe_station_name, TimestampKey, TurnstileEntry};
use transit_stream::{
    EventProducer, EventSink, KafkaEventSink, ProducerSettings, StreamError, TopicRegistry,
    TopicSpec,
};

const ARRIVAL_PARTITIONS: i32 = 10;
const TURNSTILE_PARTITIONS: i32 = 4;
const WEATHER_PARTITIONS: i32 = 4;
const REPLICAS: i32 = 1;

/// What one tick published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub arrivals: usize,
    pub turnstile_entries: usize,
}

/// The simulated world and the producers it publishes through.
pub struct Simulation<S: EventSink = KafkaEventSink> {
    rng: StdRng,
    network: Network,
    weather_model: WeatherModel,
    turnstile_max_entries: u32,
    stations: EventProducer<S>,
    arrivals: HashMap<i64, EventProducer<S>>,
    turnstile: EventProducer<S>,
    weather: EventProducer<S>,
}

impl<S: EventSink> Simulation<S> {
    /// Provision every topic and open a producer for each stream.
    ///
    /// `make_sink` opens the transport for one producer.
    pub async fn start<F>(
        registry: &TopicRegistry,
        config: &SimulationConfig,
        mut make_sink: F,
    ) -> Result<Self, StreamError>
    where
        F: FnMut(&ProducerSettings) -> Result<S, StreamError>,
    {
        let network = Network::new(config.trains_per_line);

        let stations = open(
            registry,
            &mut make_sink,
            ProducerSettings::new(
                TopicSpec::new(TOPIC_STATIONS, 1, REPLICAS),
                "station_key",
                "station_value",
            )
            .with_client_name("stations"),
        )
        .await?;

        let mut arrivals = HashMap::new();
        for stop in network.stops() {
            let settings = ProducerSettings::new(
                TopicSpec::new(arrival_topic(stop.name), ARRIVAL_PARTITIONS, REPLICAS),
                "arrival_key",
                "arrival_value",
            )
            .with_client_name(format!("station-{}", topic_safe_station_name(stop.name)));
            arrivals.insert(stop.station_id, open(registry, &mut make_sink, settings).await?);
        }

        let turnstile = open(
            registry,
            &mut make_sink,
            ProducerSettings::new(
                TopicSpec::new(TOPIC_TURNSTILE, TURNSTILE_PARTITIONS, REPLICAS),
                "turnstile_key",
                "turnstile_value",
            )
            .with_client_name("turnstile"),
        )
        .await?;

        let weather = open(
            registry,
            &mut make_sink,
            ProducerSettings::new(
                TopicSpec::new(TOPIC_WEATHER, WEATHER_PARTITIONS, REPLICAS),
                "weather_key",
                "weather_value",
            )
            .with_client_name("weather"),
        )
        .await?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let weather_model = WeatherModel::new(config.month);
        info!(
            stations = arrivals.len(),
            trains = network.trains().len(),
            season = ?weather_model.season(),
            "Simulation ready"
        );

        Ok(Self {
            rng,
            network,
            weather_model,
            turnstile_max_entries: config.turnstile_max_entries,
            stations,
            arrivals,
            turnstile,
            weather,
        })
    }

    /// Publish every stop of the catalogue to the stations topic.
    pub fn publish_catalogue(&self) -> Result<usize, StreamError> {
        let mut published = 0;
        for stop in self.network.stops() {
            self.stations.publish(&TimestampKey::now(), &stop.station())?;
            published += 1;
        }
        info!(stations = published, "Published station catalogue");
        Ok(published)
    }

    /// Advance the world one step: trains arrive, riders enter, the
    /// weather changes.
    pub fn tick(&mut self) -> Result<TickReport, StreamError> {
        let mut report = TickReport::default();

        for stop_arrival in self.network.advance(&mut self.rng) {
            let Some(producer) = self.arrivals.get(&stop_arrival.stop.station_id) else {
                warn!(station_id = stop_arrival.stop.station_id, "No producer for station");
                continue;
            };
            producer.publish(&TimestampKey::now(), &stop_arrival.arrival)?;
            report.arrivals += 1;
        }

        for stop in self.network.stops() {
            let entries = self.rng.gen_range(0..=self.turnstile_max_entries);
            let entry = TurnstileEntry {
                station_id: stop.station_id,
                station_name: stop.name.to_string(),
                line: stop.line,
            };
            for _ in 0..entries {
                self.turnstile.publish(&TimestampKey::now(), &entry)?;
            }
            report.turnstile_entries += entries as usize;
        }

        let reading = self.weather_model.step(&mut self.rng);
        self.weather.publish(&TimestampKey::now(), &reading)?;

        debug!(
            arrivals = report.arrivals,
            turnstile_entries = report.turnstile_entries,
            temperature = reading.temperature,
            "Tick published"
        );
        Ok(report)
    }

    /// Flush and close every producer, reporting the first failure.
    pub fn close(&mut self) -> Result<(), StreamError> {
        let mut first_error = None;
        let producers = std::iter::once(&mut self.stations)
            .chain(self.arrivals.values_mut())
            .chain([&mut self.turnstile, &mut self.weather]);

        for producer in producers {
            if let Err(e) = producer.close() {
                warn!(topic = %producer.topic(), error = %e, "Failed to close producer");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

async fn open<S, F>(
    registry: &TopicRegistry,
    make_sink: &mut F,
    settings: ProducerSettings,
) -> Result<EventProducer<S>, StreamError>
where
    S: EventSink,
    F: FnMut(&ProducerSettings) -> Result<S, StreamError>,
{
    let sink = make_sink(&settings)?;
    EventProducer::with_sink(registry, settings, sink).await
}
