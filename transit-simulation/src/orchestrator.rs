//! Runs the simulation ticks and the consumer loops until shutdown.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, instrument};

use crate::simulation::Simulation;
use crate::SimulationError;
use transit_stream::{EventSink, KafkaEventSink, LoopStats, MessageHandler, MessageSource, PollLoop};

type ConsumerLauncher =
    Box<dyn FnOnce(broadcast::Receiver<()>) -> JoinHandle<(String, LoopStats)> + Send>;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub failed_ticks: u64,
    pub consumers: usize,
}

/// Orchestrates the simulation and its consumers.
///
/// - Publishes the station catalogue, then ticks the simulation
/// - Runs every registered poll loop on its own task
/// - On shutdown, stops the loops and flushes every producer
pub struct Orchestrator<S: EventSink = KafkaEventSink> {
    simulation: Simulation<S>,
    tick_interval: Duration,
    consumers: Vec<ConsumerLauncher>,
    shutdown_tx: broadcast::Sender<()>,
}

impl<S: EventSink> Orchestrator<S> {
    pub fn new(simulation: Simulation<S>, tick_interval: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            simulation,
            tick_interval,
            consumers: Vec::new(),
            shutdown_tx,
        }
    }

    /// Register a poll loop to start when the orchestrator runs.
    pub fn add_consumer<M, H>(&mut self, mut poll_loop: PollLoop<M, H>)
    where
        M: MessageSource + 'static,
        H: MessageHandler + 'static,
    {
        self.consumers.push(Box::new(move |shutdown_rx| {
            tokio::spawn(async move {
                let stats = poll_loop.run(shutdown_rx).await;
                (poll_loop.name().to_string(), stats)
            })
        }));
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> Result<RunSummary, SimulationError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await
    }

    /// Run until `shutdown` completes.
    ///
    /// A failed tick is logged and the next tick runs as scheduled.
    #[instrument(skip_all)]
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<RunSummary, SimulationError>
    where
        F: Future<Output = ()>,
    {
        info!(consumers = self.consumers.len(), "Starting transit simulation");

        let consumer_count = self.consumers.len();
        let handles: Vec<_> = self
            .consumers
            .drain(..)
            .map(|launch| launch(self.shutdown_tx.subscribe()))
            .collect();

        self.simulation.publish_catalogue()?;

        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut ticks = 0u64;
        let mut failed_ticks = 0u64;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    match self.simulation.tick() {
                        Ok(_) => ticks += 1,
                        Err(e) => {
                            failed_ticks += 1;
                            error!(error = %e, "Simulation tick failed");
                        }
                    }
                }
            }
        }

        let _ = self.shutdown_tx.send(());
        for result in join_all(handles).await {
            match result {
                Ok((name, stats)) => info!(
                    consumer = %name,
                    drains = stats.drains,
                    dispatched = stats.dispatched,
                    failures = stats.failures,
                    poll_errors = stats.poll_errors,
                    "Consumer stopped"
                ),
                Err(e) => error!(error = %e, "Consumer task panicked"),
            }
        }

        self.simulation.close()?;
        info!(ticks = ticks, failed_ticks = failed_ticks, "Transit simulation stopped");

        Ok(RunSummary {
            ticks,
            failed_ticks,
            consumers: consumer_count,
        })
    }
}
