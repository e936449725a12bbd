//! Drain-then-sleep consumption loop.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, error, info, warn};

use crate::consumer::{InboundMessage, MessageSource};
use crate::errors::StreamError;

/// Default timeout of a single poll during the drain phase.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Default pause between drain phases.
pub const DEFAULT_SLEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Where a [`PollLoop`] currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Polling,
    Draining,
    Sleeping,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollLoopConfig {
    pub poll_timeout: Duration,
    pub sleep_interval: Duration,
}

impl Default for PollLoopConfig {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            sleep_interval: DEFAULT_SLEEP_INTERVAL,
        }
    }
}

/// What one drain phase did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainOutcome {
    pub dispatched: usize,
    pub failed: usize,
    /// Whether the phase ended on a poll error rather than an empty poll.
    pub poll_error: bool,
}

/// Counters over the lifetime of a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopStats {
    pub drains: u64,
    pub dispatched: u64,
    pub failures: u64,
    pub poll_errors: u64,
}

impl LoopStats {
    fn record(&mut self, outcome: &DrainOutcome) {
        self.drains += 1;
        self.dispatched += outcome.dispatched as u64;
        self.failures += outcome.failed as u64;
        if outcome.poll_error {
            self.poll_errors += 1;
        }
    }
}

/// Receives every message a [`PollLoop`] polls.
pub trait MessageHandler: Send {
    fn handle(&mut self, message: &InboundMessage) -> Result<(), StreamError>;
}

impl<F> MessageHandler for F
where
    F: FnMut(&InboundMessage) -> Result<(), StreamError> + Send,
{
    fn handle(&mut self, message: &InboundMessage) -> Result<(), StreamError> {
        self(message)
    }
}

/// Turns a pull-based subscription into a long-running consumer task.
///
/// Each iteration drains the source, dispatching every message to the
/// handler until a poll comes back empty, then sleeps for the configured
/// interval. Handler failures are logged and skipped. A poll error is logged
/// and ends the drain phase early. Only the shutdown signal stops the loop,
/// after which the source is closed.
///
/// The drain phase polls synchronously and never yields to the runtime, so
/// each loop should run on its own task.
pub struct PollLoop<S: MessageSource, H: MessageHandler> {
    name: String,
    source: S,
    handler: H,
    config: PollLoopConfig,
    state: LoopState,
    stats: LoopStats,
}

impl<S: MessageSource, H: MessageHandler> PollLoop<S, H> {
    pub fn new(name: impl Into<String>, source: S, handler: H) -> Self {
        Self {
            name: name.into(),
            source,
            handler,
            config: PollLoopConfig::default(),
            state: LoopState::Idle,
            stats: LoopStats::default(),
        }
    }

    pub fn with_config(mut self, config: PollLoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Dispatch every currently available message.
    ///
    /// Returns once a poll reports nothing or fails. Does nothing after
    /// [`close`](Self::close).
    pub fn drain(&mut self) -> DrainOutcome {
        let mut outcome = DrainOutcome::default();
        if self.state == LoopState::Closed {
            return outcome;
        }

        self.state = LoopState::Polling;
        loop {
            match self.source.poll(self.config.poll_timeout) {
                None => break,
                Some(Ok(message)) => {
                    self.state = LoopState::Draining;
                    match self.handler.handle(&message) {
                        Ok(()) => outcome.dispatched += 1,
                        Err(e) => {
                            outcome.failed += 1;
                            error!(
                                consumer = %self.name,
                                topic = %message.topic,
                                partition = message.partition,
                                offset = message.offset,
                                error = %e,
                                "Failed to handle message"
                            );
                        }
                    }
                }
                Some(Err(e)) => {
                    outcome.poll_error = true;
                    warn!(consumer = %self.name, error = %e, "Poll failed, ending drain phase");
                    break;
                }
            }
        }

        self.stats.record(&outcome);
        debug!(
            consumer = %self.name,
            dispatched = outcome.dispatched,
            failed = outcome.failed,
            "Drain phase finished"
        );
        outcome
    }

    /// Drain and sleep until the shutdown signal fires, then close.
    ///
    /// A dropped shutdown sender also stops the loop.
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) -> LoopStats {
        info!(
            consumer = %self.name,
            sleep_interval_ms = self.config.sleep_interval.as_millis() as u64,
            "Starting poll loop"
        );

        loop {
            if !matches!(shutdown.try_recv(), Err(TryRecvError::Empty)) {
                break;
            }

            self.drain();

            self.state = LoopState::Sleeping;
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = tokio::time::sleep(self.config.sleep_interval) => {}
            }
        }

        info!(consumer = %self.name, "Poll loop received shutdown signal");
        self.close();
        self.stats
    }

    /// Release the subscription. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state == LoopState::Closed {
            return;
        }
        self.source.close();
        self.state = LoopState::Closed;
        info!(
            consumer = %self.name,
            drains = self.stats.drains,
            dispatched = self.stats.dispatched,
            failures = self.stats.failures,
            poll_errors = self.stats.poll_errors,
            "Poll loop closed"
        );
    }
}

impl<S: MessageSource, H: MessageHandler> std::fmt::Debug for PollLoop<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollLoop")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
