//! Update scheduler
//!
//! The UpdateScheduler is responsible for:
//! - Calling the [`Updater`] once per cycle
//! - Logging the outcome of every cycle
//! - Sleeping for the configured interval between cycles
//!
//! ## Cycle
//!
//! ```text
//!   ┌──────────────────────────────────────────────┐
//!   │                                              │
//!   ▼                                              │
//! attempt_update ──► log + CycleCompleted ──► sleep(interval)
//! ```
//!
//! The sleep only starts once the update has finished, so two attempts never
//! overlap. A failed attempt does not shorten or lengthen the interval.

use crate::config::UpdaterConfig;
use crate::error::Result;
use crate::traits::Updater;

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace};

/// Capacity of the scheduler event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events emitted by the UpdateScheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Scheduler entered its loop
    Started {
        endpoint: String,
        interval_secs: u64,
    },

    /// One cycle finished
    CycleCompleted {
        /// 1-based cycle number
        cycle: u64,
        success: bool,
        completed_at: DateTime<Utc>,
    },

    /// Scheduler left its loop
    Stopped { reason: String, cycles: u64 },
}

/// Periodic update scheduler
///
/// ## Lifecycle
///
/// 1. Create with [`UpdateScheduler::new()`]
/// 2. Start with [`UpdateScheduler::run()`], which never returns, or with
///    [`UpdateScheduler::run_with_shutdown()`]
/// 3. Drop to clean up
///
/// All work happens on the calling task; nothing is spawned.
pub struct UpdateScheduler {
    /// Performs the actual update
    updater: Box<dyn Updater>,

    /// Endpoint passed to every attempt
    endpoint: String,

    /// Sleep between cycles
    interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SchedulerEvent>,

    /// Cycles run so far, across `run*` and `run_cycle`
    cycles: AtomicU64,
}

impl UpdateScheduler {
    /// Create a new scheduler
    ///
    /// # Returns
    ///
    /// A tuple of (scheduler, event_receiver). Events are best-effort: with
    /// the receiver dropped, or left unread until it fills up, they are
    /// discarded without touching the cycle log.
    pub fn new(
        updater: Box<dyn Updater>,
        config: &UpdaterConfig,
    ) -> Result<(Self, mpsc::Receiver<SchedulerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let scheduler = Self {
            updater,
            endpoint: config.endpoint.clone(),
            interval: config.interval(),
            event_tx: tx,
            cycles: AtomicU64::new(0),
        };

        Ok((scheduler, rx))
    }

    /// Interval between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run forever
    ///
    /// Only external termination of the process stops this loop.
    pub async fn run(&self) {
        self.run_internal(None).await;
    }

    /// Run until `shutdown_rx` fires (or its sender is dropped)
    ///
    /// Shutdown is only observed between cycles: an in-flight update always
    /// completes and is logged first. With `None` this behaves like
    /// [`UpdateScheduler::run()`].
    ///
    /// # Returns
    ///
    /// The number of cycles this scheduler has completed.
    pub async fn run_with_shutdown(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> u64 {
        self.run_internal(shutdown_rx).await
    }

    /// Run a single cycle without sleeping
    ///
    /// The cycle is numbered after every cycle this scheduler has run before.
    pub async fn run_cycle(&self) -> bool {
        self.cycle().await
    }

    /// Number of cycles run so far
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> u64 {
        let mut shutdown: Pin<Box<dyn Future<Output = ()> + Send>> = match shutdown_rx {
            Some(rx) => Box::pin(async move {
                let _ = rx.await;
            }),
            None => Box::pin(std::future::pending::<()>()),
        };

        debug!(
            "Scheduler started (updater={}, interval={:?})",
            self.updater.updater_name(),
            self.interval
        );
        self.emit_event(SchedulerEvent::Started {
            endpoint: self.endpoint.clone(),
            interval_secs: self.interval.as_secs(),
        });

        loop {
            self.cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}

                _ = &mut shutdown => {
                    let cycles = self.cycles();
                    info!(cycles, "Shutdown signal received, stopping scheduler");
                    self.emit_event(SchedulerEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                        cycles,
                    });
                    return cycles;
                }
            }
        }
    }

    async fn cycle(&self) -> bool {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let success = self.updater.attempt_update(&self.endpoint).await;
        info!(success, cycle, "Update cycle completed");

        self.emit_event(SchedulerEvent::CycleCompleted {
            cycle,
            success,
            completed_at: Utc::now(),
        });

        success
    }

    fn emit_event(&self, event: SchedulerEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("Event channel full, scheduler event discarded");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                trace!("No event listener, scheduler event discarded");
            }
        }
    }
}
