//! Contract Test: Signal Termination
//!
//! Verifies that the daemon leaves its Running state only through an external
//! signal, and that it then exits with code 0 after logging the outcome.

#![cfg(unix)]

use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const DAEMON: &str = env!("CARGO_BIN_EXE_nextdnsd");

fn message(line: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    value["fields"]["message"].as_str().map(str::to_string)
}

#[tokio::test]
async fn sigterm_exits_cleanly_after_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let mut child = Command::new(DAEMON)
        .env("NEXTDNS_ENDPOINT", format!("{}/abc123/def456", server.uri()))
        .env("UPDATE_INTERVAL_SECONDS", "3600")
        .env("NEXTDNS_LOG_FORMAT", "json")
        .env_remove("NEXTDNS_LOG_LEVEL")
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .expect("daemon spawns");

    let stdout = child.stdout.take().expect("stdout piped");
    let mut lines = BufReader::new(stdout).lines();

    let first_cycle = tokio::time::timeout(Duration::from_secs(20), async {
        while let Some(line) = lines.next_line().await.expect("read stdout") {
            if message(&line).as_deref() == Some("Update cycle completed") {
                return true;
            }
        }
        false
    })
    .await
    .expect("first cycle logged within 20 seconds");
    assert!(first_cycle, "daemon exited before completing a cycle");

    let pid = child.id().expect("daemon still running").to_string();
    let kill = std::process::Command::new("kill")
        .args(["-TERM", &pid])
        .status()
        .expect("kill runs");
    assert!(kill.success());

    let (messages, status) = tokio::time::timeout(Duration::from_secs(10), async {
        let mut messages = Vec::new();
        while let Some(line) = lines.next_line().await.expect("read stdout") {
            if let Some(msg) = message(&line) {
                messages.push(msg);
            }
        }
        let status = child.wait().await.expect("wait succeeds");
        (messages, status)
    })
    .await
    .expect("daemon exits within 10 seconds");

    assert_eq!(status.code(), Some(0));
    assert!(
        messages.iter().any(|m| m == "Received shutdown signal, exiting"),
        "shutdown not logged: {messages:?}"
    );
}
