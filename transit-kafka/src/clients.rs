//! `rdkafka` client-configuration builders.

use std::collections::BTreeMap;

use rdkafka::config::ClientConfig;

use crate::config::ClusterConfig;

/// Prefix for producer `client.id` values.
pub const PRODUCER_CLIENT_PREFIX: &str = "transit";

/// Broker properties every producer starts from.
///
/// Idempotence keeps retries from duplicating or reordering records for a
/// key; the short linger keeps simulated events close to real time.
pub const DEFAULT_PRODUCER_PROPERTIES: &[(&str, &str)] = &[
    ("enable.idempotence", "true"),
    ("queue.buffering.max.ms", "10"),
    ("message.timeout.ms", "30000"),
];

impl ClusterConfig {
    /// Client configuration for an event producer.
    ///
    /// Configures the producer with:
    /// - idempotent delivery and a 10ms buffering window
    /// - SASL/SSL authentication if credentials are provided
    /// - caller overrides applied last
    pub fn producer_client_config(
        &self,
        client_name: &str,
        overrides: &BTreeMap<String, String>,
    ) -> ClientConfig {
        let mut client_config = ClientConfig::new();

        client_config
            .set("bootstrap.servers", &self.broker_url)
            .set("client.id", format!("{PRODUCER_CLIENT_PREFIX}-{client_name}"));

        for (key, value) in DEFAULT_PRODUCER_PROPERTIES {
            client_config.set(*key, *value);
        }

        self.apply_security(&mut client_config);

        for (key, value) in overrides {
            client_config.set(key, value);
        }

        client_config
    }

    /// Client configuration for a consumer in the given group.
    ///
    /// Topics are never auto-created by consumers; only producers provision
    /// them. `offset_earliest` picks where a group without committed offsets
    /// starts reading.
    pub fn consumer_client_config(&self, group_id: &str, offset_earliest: bool) -> ClientConfig {
        let mut client_config = ClientConfig::new();

        client_config
            .set("bootstrap.servers", &self.broker_url)
            .set("group.id", group_id)
            .set("allow.auto.create.topics", "false")
            .set(
                "auto.offset.reset",
                if offset_earliest { "earliest" } else { "latest" },
            )
            .set("session.timeout.ms", "6000");

        self.apply_security(&mut client_config);
        client_config
    }

    /// Client configuration for the admin client used for topic provisioning.
    pub fn admin_client_config(&self) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &self.broker_url)
            .set("client.id", format!("{PRODUCER_CLIENT_PREFIX}-admin"));
        self.apply_security(&mut client_config);
        client_config
    }

    fn apply_security(&self, client_config: &mut ClientConfig) {
        // If SASL credentials are provided, enable SASL/SSL (for managed Kafka)
        // Otherwise, use plaintext (for local development)
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            client_config
                .set("security.protocol", "SASL_SSL")
                .set("sasl.mechanisms", "PLAIN")
                .set("sasl.username", username)
                .set("sasl.password", password);

            if let Some(ca_pem) = &self.ssl_ca_pem {
                client_config.set("ssl.ca.pem", ca_pem);
            }
        }
    }
}
