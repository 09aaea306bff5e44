//! Configuration types for the NextDNS updater
//!
//! All configuration comes from environment variables. The readers take a
//! lookup function so the parsing rules can be exercised without touching
//! the process environment.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Endpoint to call every cycle (required)
pub const ENDPOINT_VAR: &str = "NEXTDNS_ENDPOINT";

/// Seconds between cycles (optional)
pub const INTERVAL_VAR: &str = "UPDATE_INTERVAL_SECONDS";

/// Log verbosity (optional)
pub const LOG_LEVEL_VAR: &str = "NEXTDNS_LOG_LEVEL";

/// Log output format (optional)
pub const LOG_FORMAT_VAR: &str = "NEXTDNS_LOG_FORMAT";

/// Interval used when `UPDATE_INTERVAL_SECONDS` is unset
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Total timeout for a single update request
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Updater configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Link-IP endpoint, e.g. `https://link-ip.nextdns.io/<id>/<key>`
    pub endpoint: String,

    /// Seconds to sleep between cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl UpdaterConfig {
    /// Create a configuration with the default interval
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }

    /// Set the interval in seconds
    pub fn with_interval_secs(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// An empty value is treated the same as an unset one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = non_empty(lookup(ENDPOINT_VAR))
            .ok_or_else(|| Error::config_missing(ENDPOINT_VAR))?;

        let interval_secs = match non_empty(lookup(INTERVAL_VAR)) {
            Some(raw) => parse_interval(&raw)?,
            None => DEFAULT_INTERVAL_SECS,
        };

        let config = Self {
            endpoint,
            interval_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// URL syntax is not checked here. A malformed endpoint fails each cycle
    /// instead of stopping the process.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(Error::config_missing(ENDPOINT_VAR));
        }
        if self.interval_secs == 0 {
            return Err(Error::config_invalid(
                INTERVAL_VAR,
                "0",
                "must be a positive integer",
            ));
        }
        Ok(())
    }

    /// Sleep between cycles
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_interval(raw: &str) -> Result<u64> {
    let secs: u64 = raw.parse().map_err(|e: std::num::ParseIntError| {
        Error::config_invalid(INTERVAL_VAR, raw, e.to_string())
    })?;
    if secs == 0 {
        return Err(Error::config_invalid(
            INTERVAL_VAR,
            raw,
            "must be a positive integer",
        ));
    }
    Ok(secs)
}

/// Logging configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Maximum level emitted
    #[serde(default)]
    pub level: LogLevel,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Load logging configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load logging configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = match non_empty(lookup(LOG_LEVEL_VAR)) {
            Some(raw) => raw.parse()?,
            None => LogLevel::default(),
        };
        let format = match non_empty(lookup(LOG_FORMAT_VAR)) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };
        Ok(Self { level, format })
    }
}

/// Log verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(Error::config_invalid(
                LOG_LEVEL_VAR,
                s,
                "valid levels: trace, debug, info, warn, error",
            )),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable lines
    Text,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(Error::config_invalid(
                LOG_FORMAT_VAR,
                s,
                "valid formats: json, text",
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Json => f.write_str("json"),
            LogFormat::Text => f.write_str("text"),
        }
    }
}
