//! Cluster endpoint configuration.

use std::env;

use crate::error::ConfigError;

/// Default broker address for local development.
pub const DEFAULT_BROKER_URL: &str = "PLAINTEXT://localhost:9092";

/// Default schema registry endpoint.
pub const DEFAULT_SCHEMA_REGISTRY_URL: &str = "http://localhost:8081";

/// Default KSQL server endpoint.
pub const DEFAULT_KSQL_URL: &str = "http://localhost:8088";

/// Default REST proxy endpoint.
pub const DEFAULT_REST_PROXY_URL: &str = "http://localhost:8082";

/// Connection settings shared by every client in the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Kafka bootstrap address (e.g., "PLAINTEXT://localhost:9092")
    pub broker_url: String,
    /// Schema registry endpoint
    pub schema_registry_url: String,
    /// KSQL server endpoint
    pub ksql_url: String,
    /// REST proxy endpoint
    pub rest_proxy_url: String,
    /// SASL username (enables SASL/SSL if set)
    pub username: Option<String>,
    /// SASL password (required if username is set)
    pub password: Option<String>,
    /// Custom CA certificate in PEM format
    pub ssl_ca_pem: Option<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BROKER_URL)
    }
}

impl ClusterConfig {
    /// Create a config for the given broker, with local defaults for the
    /// remaining endpoints.
    pub fn new(broker_url: impl Into<String>) -> Self {
        Self {
            broker_url: broker_url.into(),
            schema_registry_url: DEFAULT_SCHEMA_REGISTRY_URL.to_string(),
            ksql_url: DEFAULT_KSQL_URL.to_string(),
            rest_proxy_url: DEFAULT_REST_PROXY_URL.to_string(),
            username: None,
            password: None,
            ssl_ca_pem: None,
        }
    }

    /// Create a ClusterConfig from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BROKER_URL` - Broker address (default: `PLAINTEXT://localhost:9092`)
    /// - `SCHEMA_REGISTRY_URL` - Schema registry (default: `http://localhost:8081`)
    /// - `KSQL_URL` - KSQL server (default: `http://localhost:8088`)
    /// - `REST_PROXY_URL` - REST proxy (default: `http://localhost:8082`)
    /// - `KAFKA_USERNAME` - SASL username (optional)
    /// - `KAFKA_PASSWORD` - SASL password (optional)
    /// - `KAFKA_SSL_CA_PEM` - Custom CA cert in PEM format (optional)
    ///
    /// An endpoint variable that is present but blank is rejected with
    /// [`ConfigError::MissingEndpoint`] rather than silently replaced by
    /// the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = |name: &'static str, default: &str| -> Result<String, ConfigError> {
            match lookup(name) {
                None => Ok(default.to_string()),
                Some(value) if value.trim().is_empty() => Err(ConfigError::MissingEndpoint(name)),
                Some(value) => Ok(value.trim().to_string()),
            }
        };

        let config = Self {
            broker_url: endpoint("BROKER_URL", DEFAULT_BROKER_URL)?,
            schema_registry_url: endpoint("SCHEMA_REGISTRY_URL", DEFAULT_SCHEMA_REGISTRY_URL)?,
            ksql_url: endpoint("KSQL_URL", DEFAULT_KSQL_URL)?,
            rest_proxy_url: endpoint("REST_PROXY_URL", DEFAULT_REST_PROXY_URL)?,
            username: lookup("KAFKA_USERNAME").filter(|v| !v.is_empty()),
            password: lookup("KAFKA_PASSWORD").filter(|v| !v.is_empty()),
            ssl_ca_pem: lookup("KAFKA_SSL_CA_PEM").filter(|v| !v.is_empty()),
        };

        if config.username.is_some() && config.password.is_none() {
            return Err(ConfigError::InvalidValue {
                name: "KAFKA_PASSWORD",
                value: "<unset>".to_string(),
            });
        }

        Ok(config)
    }

    /// Set SASL credentials.
    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }

    /// Set custom CA certificate.
    pub fn with_ssl_ca(mut self, ca_pem: String) -> Self {
        self.ssl_ca_pem = Some(ca_pem);
        self
    }

    /// Whether SASL/SSL will be negotiated with the broker.
    pub fn uses_sasl(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}
