// # nextdnsd - NextDNS link-IP daemon
//
// Thin integration layer: everything about what an update is and when it
// happens lives in nextdns-core. This binary is responsible for:
// 1. Initializing logging
// 2. Reading configuration from environment variables
// 3. Building the runtime and the HTTP updater
// 4. Running the scheduler until SIGTERM/SIGINT
//
// ## Configuration
//
// - `NEXTDNS_ENDPOINT`: link-IP URL to call (required)
// - `UPDATE_INTERVAL_SECONDS`: seconds between updates (default 300)
// - `NEXTDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `NEXTDNS_LOG_FORMAT`: json or text (default json)
//
// ## Example
//
// ```bash
// export NEXTDNS_ENDPOINT=https://link-ip.nextdns.io/abc123/def456
// export UPDATE_INTERVAL_SECONDS=600
//
// nextdnsd
// ```

use anyhow::Result;
use nextdns_core::{HttpUpdater, LogFormat, LoggingConfig, UpdateScheduler, UpdaterConfig};
use std::future::Future;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Crate version, logged at startup
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build timestamp, injected by the release build
const BUILD_TIME: &str = match option_env!("NEXTDNS_BUILD_TIME") {
    Some(time) => time,
    None => "unknown",
};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Terminated by signal
/// - 1: Configuration error
/// - 2: Runtime setup error
#[derive(Debug, Clone, Copy)]
enum UpdaterExitCode {
    /// Terminated by SIGTERM/SIGINT
    CleanShutdown = 0,
    /// Missing or invalid configuration
    ConfigError = 1,
    /// Runtime or HTTP client could not be created
    RuntimeError = 2,
}

impl From<UpdaterExitCode> for ExitCode {
    fn from(code: UpdaterExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let logging = match LoggingConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    if let Err(e) = init_tracing(&logging) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return UpdaterExitCode::ConfigError.into();
    }

    let config = match UpdaterConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "{}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    info!(
        endpoint = %config.endpoint,
        interval_seconds = config.interval_secs,
        version = VERSION,
        build_time = BUILD_TIME,
        "Starting NextDNS IP updater"
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create tokio runtime");
            return UpdaterExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(signal) => {
                info!(signal, "Received shutdown signal, exiting");
                UpdaterExitCode::CleanShutdown
            }
            Err(e) => {
                error!(error = %e, "Daemon error");
                UpdaterExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Install the process-wide subscriber writing to stdout
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(logging.level))
        .with_writer(std::io::stdout);

    match logging.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }

    Ok(())
}

/// Run the scheduler until a termination signal arrives
///
/// # Returns
///
/// The name of the signal that ended the loop.
async fn run_daemon(config: UpdaterConfig) -> Result<&'static str> {
    let updater = HttpUpdater::new()?;
    // Nothing consumes scheduler events here; cycles are reported through logs
    let (scheduler, events) = UpdateScheduler::new(Box::new(updater), &config)?;
    drop(events);

    // Handlers are installed before the first cycle starts
    let shutdown_signal = shutdown_signal()?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let scheduler_run = scheduler.run_with_shutdown(Some(shutdown_rx));
    tokio::pin!(scheduler_run);

    tokio::select! {
        cycles = &mut scheduler_run => {
            anyhow::bail!("Scheduler stopped unexpectedly after {} cycle(s)", cycles);
        }
        signal = shutdown_signal => {
            let signal = signal?;
            // Let an in-flight cycle finish and log before exiting
            let _ = shutdown_tx.send(());
            let cycles = scheduler_run.await;
            info!(cycles, "Scheduler stopped");
            Ok(signal)
        }
    }
}

/// Install SIGTERM/SIGINT handlers
///
/// # Returns
///
/// A future resolving to the name of the first signal received.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = Result<&'static str>>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        Ok::<_, anyhow::Error>(name)
    })
}

/// Install the CTRL-C handler
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = Result<&'static str>>> {
    Ok(async {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
        Ok::<_, anyhow::Error>("SIGINT")
    })
}
