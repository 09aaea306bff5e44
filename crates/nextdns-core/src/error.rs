//! Error types for the NextDNS updater
//!
//! Configuration errors are fatal at startup. Everything that can go wrong
//! during an update cycle is recoverable and ends up as a `false` outcome.

use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the updater
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required environment variable is absent or empty
    #[error("{0} environment variable is not set")]
    ConfigMissing(String),

    /// A configuration value could not be parsed or is out of range
    #[error("Invalid {name} value '{value}': {reason}")]
    ConfigInvalid {
        /// Variable or field name
        name: String,
        /// Raw value as supplied
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The endpoint is not an absolute URL with a host
    #[error("Invalid NextDNS endpoint '{endpoint}': {reason}")]
    EndpointInvalid {
        /// Endpoint as configured
        endpoint: String,
        /// Parse failure detail
        reason: String,
    },

    /// Request failed before a response arrived (DNS, connect, timeout)
    #[error("Network error for {endpoint}: {message}")]
    Network {
        /// Endpoint that was called
        endpoint: String,
        /// Error detail from the HTTP stack
        message: String,
    },

    /// Response arrived but was not 200 OK
    #[error("Unexpected status from {endpoint}: {status}")]
    UnexpectedStatus {
        /// Endpoint that was called
        endpoint: String,
        /// Numeric status code
        status_code: u16,
        /// Status line, e.g. "500 Internal Server Error"
        status: String,
    },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl Error {
    /// Create a "missing configuration" error
    pub fn config_missing(name: impl Into<String>) -> Self {
        Self::ConfigMissing(name.into())
    }

    /// Create an "invalid configuration" error
    pub fn config_invalid(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ConfigInvalid {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid endpoint error
    pub fn endpoint_invalid(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EndpointInvalid {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Create a network error
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Whether this error must stop the process
    ///
    /// Only startup problems are fatal. Cycle failures are logged and the
    /// loop carries on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing(_) | Self::ConfigInvalid { .. } | Self::HttpClient(_)
        )
    }
}
