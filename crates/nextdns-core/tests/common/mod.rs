//! Test doubles and common utilities for contract tests

#![allow(dead_code)]

use nextdns_core::Updater;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing_subscriber::fmt::MakeWriter;

/// Endpoint used where the value never reaches the network
pub const TEST_ENDPOINT: &str = "https://link-ip.nextdns.io/test/test";

/// An Updater that replays a fixed list of outcomes
///
/// Once the script runs out, every further attempt fails.
pub struct ScriptedUpdater {
    script: Vec<bool>,
    delay: Option<Duration>,
    next: AtomicUsize,
    calls: Arc<Mutex<Vec<(Instant, String)>>>,
}

impl ScriptedUpdater {
    pub fn new(script: Vec<bool>) -> Self {
        Self {
            script,
            delay: None,
            next: AtomicUsize::new(0),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every attempt take `delay` before returning
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared handle to the recorded (start instant, endpoint) pairs
    pub fn calls(&self) -> Arc<Mutex<Vec<(Instant, String)>>> {
        self.calls.clone()
    }
}

#[async_trait::async_trait]
impl Updater for ScriptedUpdater {
    async fn attempt_update(&self, endpoint: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), endpoint.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.script.get(index).copied().unwrap_or(false)
    }

    fn updater_name(&self) -> &'static str {
        "scripted"
    }
}

/// In-memory log sink for a tracing fmt subscriber
#[derive(Clone, Default)]
pub struct LogBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    /// Parsed JSON lines emitted by this crate
    pub fn crate_lines(&self) -> Vec<serde_json::Value> {
        let bytes = self.bytes.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("log line is JSON"))
            .filter(|value| {
                value["target"]
                    .as_str()
                    .is_some_and(|t| t.starts_with("nextdns_core"))
            })
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install a JSON subscriber for the current thread that writes into a buffer
pub fn capture_json_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::INFO)
        .with_writer(buffer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
