//! Configuration error types.

use thiserror::Error;

/// Errors raised while resolving cluster configuration.
///
/// These are fatal at startup: nothing can be produced or consumed without
/// a usable endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required connection endpoint resolved to an empty value.
    #[error("Missing required endpoint: {0} is set but empty")]
    MissingEndpoint(&'static str),

    /// A setting could not be interpreted.
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
