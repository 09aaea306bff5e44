// # nextdns-core
//
// Core library for the NextDNS link-IP updater.
//
// ## Architecture Overview
//
// - **Updater**: Trait for one "tell the endpoint where we are" attempt
// - **HttpUpdater**: Updater that issues a bounded-timeout HTTP GET
// - **UpdateScheduler**: Runs the updater forever on a fixed interval
// - **UpdaterConfig / LoggingConfig**: Environment-driven configuration
//
// ## Design Principles
//
// 1. **Library-First**: The daemon only wires things together
// 2. **Failures are outcomes**: A bad endpoint or bad response becomes
//    `false` plus a log line, never a crash
// 3. **No hidden retries**: The next cycle is the only retry

pub mod config;
pub mod engine;
pub mod error;
pub mod traits;
pub mod updater;

// Re-export core types for convenience
pub use config::{LogFormat, LogLevel, LoggingConfig, UpdaterConfig};
pub use engine::{SchedulerEvent, UpdateScheduler};
pub use error::{Error, Result};
pub use traits::Updater;
pub use updater::HttpUpdater;
