//! Process-wide topic-creation ledger.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OnceCell};
use tracing::{debug, info, instrument, warn};

use crate::errors::StreamError;
use crate::topics::{CreateOutcome, TopicAdmin, TopicSpec};

/// Default upper bound on a single topic creation.
pub const DEFAULT_CREATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Ensures each topic exists before anything is published to it.
///
/// The registry is shared (behind an `Arc`) by every producer in the process.
/// Each topic name gets one creation slot: the first caller lists the broker's
/// topics and creates the topic if needed, while concurrent callers for the
/// same name wait on that slot and observe its result. Once a slot succeeds,
/// later calls return without contacting the broker.
///
/// The cache is advisory. A failed provisioning is reported to every caller
/// that was waiting on it, and is not cached: the next call that starts after
/// it goes back to the broker.
pub struct TopicRegistry {
    admin: Arc<dyn TopicAdmin>,
    slots: Mutex<HashMap<String, Arc<Slot>>>,
    creation_timeout: Duration,
}

/// Creation slot of one topic name.
#[derive(Default)]
struct Slot {
    known: OnceCell<TopicSpec>,
    /// Held for the duration of a provisioning attempt.
    attempt: AsyncMutex<Option<String>>,
    /// Number of finished attempts, bumped while `attempt` is held.
    generation: AtomicU64,
}

impl TopicRegistry {
    /// Create a registry backed by the given admin.
    pub fn new(admin: Arc<dyn TopicAdmin>) -> Self {
        Self {
            admin,
            slots: Mutex::new(HashMap::new()),
            creation_timeout: DEFAULT_CREATION_TIMEOUT,
        }
    }

    /// Override how long a topic creation may take before it fails.
    pub fn with_creation_timeout(mut self, timeout: Duration) -> Self {
        self.creation_timeout = timeout;
        self
    }

    /// Make sure the topic exists, creating it if the broker does not list it.
    ///
    /// Never alters an existing topic. A spec that differs from the one a
    /// known topic was provisioned with is logged and otherwise ignored.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The topic exists on the broker
    /// * `Err(StreamError::TopicCreationFailed)` - The broker rejected or
    ///   timed out the creation
    #[instrument(skip(self, spec), fields(topic = %spec.name))]
    pub async fn ensure(&self, spec: &TopicSpec) -> Result<(), StreamError> {
        let slot = self.slot(&spec.name);

        if let Some(known) = slot.known.get() {
            debug!("Topic already known to exist");
            warn_on_drift(known, spec);
            return Ok(());
        }

        let joined_at = slot.generation.load(Ordering::SeqCst);
        let mut last_failure = slot.attempt.lock().await;

        if let Some(known) = slot.known.get() {
            warn_on_drift(known, spec);
            return Ok(());
        }
        if slot.generation.load(Ordering::SeqCst) != joined_at {
            // The attempt this call waited on failed
            let cause = last_failure.clone().unwrap_or_default();
            return Err(StreamError::topic_creation(&spec.name, cause));
        }

        let outcome = self.provision(spec).await;
        *last_failure = match &outcome {
            Ok(provisioned) => {
                let _ = slot.known.set(provisioned.clone());
                None
            }
            Err(e) => Some(failure_cause(e)),
        };
        slot.generation.fetch_add(1, Ordering::SeqCst);
        outcome.map(|_| ())
    }

    /// Whether the topic has been provisioned through this registry.
    pub fn is_known(&self, name: &str) -> bool {
        self.lock_slots()
            .get(name)
            .is_some_and(|slot| slot.known.initialized())
    }

    /// Names of every topic known to exist, sorted.
    pub fn known_topics(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .lock_slots()
            .iter()
            .filter(|(_, slot)| slot.known.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    fn slot(&self, name: &str) -> Arc<Slot> {
        self.lock_slots()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Slot>>> {
        // The map is only ever inserted into, so a poisoned guard is still consistent.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn provision(&self, spec: &TopicSpec) -> Result<TopicSpec, StreamError> {
        info!(
            partitions = spec.partitions,
            replicas = spec.replicas,
            "Creating topic if it does not exist"
        );

        let exists = self
            .admin
            .topic_exists(&spec.name)
            .await
            .map_err(|e| creation_failure(&spec.name, e))?;

        if exists {
            info!("Topic already exists");
            return Ok(spec.clone());
        }

        info!("Attempting to create topic");
        let outcome = tokio::time::timeout(
            self.creation_timeout,
            self.admin.create_topic(spec, self.creation_timeout),
        )
        .await
        .map_err(|_| {
            StreamError::topic_creation(
                &spec.name,
                format!("timed out after {:?}", self.creation_timeout),
            )
        })?
        .map_err(|e| creation_failure(&spec.name, e))?;

        match outcome {
            CreateOutcome::Created => info!("Topic created"),
            CreateOutcome::AlreadyExists => {
                info!("Topic was created concurrently by another client")
            }
        }

        Ok(spec.clone())
    }
}

fn creation_failure(topic: &str, err: StreamError) -> StreamError {
    match err {
        err @ StreamError::TopicCreationFailed { .. } => err,
        other => StreamError::topic_creation(topic, other.to_string()),
    }
}

fn failure_cause(err: &StreamError) -> String {
    match err {
        StreamError::TopicCreationFailed { cause, .. } => cause.clone(),
        other => other.to_string(),
    }
}

fn warn_on_drift(known: &TopicSpec, requested: &TopicSpec) {
    if known != requested {
        warn!(
            known_partitions = known.partitions,
            requested_partitions = requested.partitions,
            known_replicas = known.replicas,
            requested_replicas = requested.replicas,
            "Requested topic config differs from the provisioned one; leaving topic unchanged"
        );
    }
}

impl std::fmt::Debug for TopicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicRegistry")
            .field("known_topics", &self.known_topics())
            .field("creation_timeout", &self.creation_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockAdmin;
    use futures::future::join_all;

    fn spec(name: &str) -> TopicSpec {
        TopicSpec::new(name, 4, 1)
    }

    #[tokio::test]
    async fn test_second_ensure_skips_broker() {
        let admin = Arc::new(MockAdmin::new());
        let registry = TopicRegistry::new(admin.clone());

        registry.ensure(&spec("org.chicago.cta.turnstile")).await.unwrap();
        registry.ensure(&spec("org.chicago.cta.turnstile")).await.unwrap();

        assert_eq!(admin.create_calls(), 1);
        assert_eq!(admin.list_calls(), 1);
        assert!(registry.is_known("org.chicago.cta.turnstile"));
    }

    #[tokio::test]
    async fn test_existing_topic_is_not_created() {
        let admin = Arc::new(MockAdmin::with_existing(&["org.chicago.cta.weather.v1"]));
        let registry = TopicRegistry::new(admin.clone());

        registry.ensure(&spec("org.chicago.cta.weather.v1")).await.unwrap();

        assert_eq!(admin.create_calls(), 0);
        assert!(registry.is_known("org.chicago.cta.weather.v1"));
    }

    #[tokio::test]
    async fn test_concurrent_first_use_creates_once() {
        let admin = Arc::new(MockAdmin::new().with_create_delay(Duration::from_millis(20)));
        let registry = Arc::new(TopicRegistry::new(admin.clone()));
        let topic = spec("org.chicago.cta.station.arrivals.clark_and_lake");

        let results = join_all((0..8).map(|_| {
            let registry = Arc::clone(&registry);
            let topic = topic.clone();
            tokio::spawn(async move { registry.ensure(&topic).await })
        }))
        .await;

        for result in results {
            result.unwrap().unwrap();
        }
        assert_eq!(admin.create_calls(), 1);
        assert_eq!(admin.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_distinct_topics_each_created() {
        let admin = Arc::new(MockAdmin::new());
        let registry = TopicRegistry::new(admin.clone());

        registry.ensure(&spec("a")).await.unwrap();
        registry.ensure(&spec("b")).await.unwrap();

        assert_eq!(admin.create_calls(), 2);
        assert_eq!(registry.known_topics(), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_propagates_and_is_not_cached() {
        let admin = Arc::new(MockAdmin::new().failing_creates());
        let registry = TopicRegistry::new(admin.clone());

        let err = registry.ensure(&spec("org.chicago.cta.stations")).await.unwrap_err();
        match err {
            StreamError::TopicCreationFailed { topic, .. } => {
                assert_eq!(topic, "org.chicago.cta.stations")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!registry.is_known("org.chicago.cta.stations"));

        // The next call goes back to the broker
        let _ = registry.ensure(&spec("org.chicago.cta.stations")).await;
        assert_eq!(admin.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_failed_creation() {
        let admin = Arc::new(
            MockAdmin::new()
                .failing_creates()
                .with_create_delay(Duration::from_millis(20)),
        );
        let registry = Arc::new(TopicRegistry::new(admin.clone()));
        let topic = spec("org.chicago.cta.stations");

        let results = join_all((0..8).map(|_| {
            let registry = Arc::clone(&registry);
            let topic = topic.clone();
            tokio::spawn(async move { registry.ensure(&topic).await })
        }))
        .await;

        for result in results {
            let err = result.unwrap().unwrap_err();
            assert!(matches!(err, StreamError::TopicCreationFailed { .. }));
            assert!(err.to_string().contains("Mock broker rejected topic"));
        }
        assert_eq!(admin.create_calls(), 1);
        assert_eq!(admin.list_calls(), 1);
        assert!(!registry.is_known("org.chicago.cta.stations"));

        // A call starting after the failed round contacts the broker again
        let _ = registry.ensure(&topic).await;
        assert_eq!(admin.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_listing_failure_is_creation_failure() {
        let admin = Arc::new(MockAdmin::new().failing_listing());
        let registry = TopicRegistry::new(admin.clone());

        let err = registry.ensure(&spec("t")).await.unwrap_err();
        assert!(matches!(err, StreamError::TopicCreationFailed { .. }));
        assert_eq!(admin.create_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_creation_times_out() {
        let admin = Arc::new(MockAdmin::new().with_create_delay(Duration::from_secs(60)));
        let registry =
            TopicRegistry::new(admin.clone()).with_creation_timeout(Duration::from_millis(50));

        let err = registry.ensure(&spec("slow")).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(!registry.is_known("slow"));
    }

    #[tokio::test]
    async fn test_lost_race_counts_as_success() {
        let admin = Arc::new(MockAdmin::new().reporting_already_exists());
        let registry = TopicRegistry::new(admin.clone());

        registry.ensure(&spec("raced")).await.unwrap();
        assert!(registry.is_known("raced"));
    }

    #[tokio::test]
    async fn test_config_drift_is_not_reconciled() {
        let admin = Arc::new(MockAdmin::new());
        let registry = TopicRegistry::new(admin.clone());

        registry.ensure(&TopicSpec::new("t", 4, 1)).await.unwrap();
        registry.ensure(&TopicSpec::new("t", 10, 3)).await.unwrap();

        assert_eq!(admin.create_calls(), 1);
        assert_eq!(admin.created_specs()[0].partitions, 4);
    }
}
