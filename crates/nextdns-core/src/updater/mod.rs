// # HTTP Updater
//
// Calls the NextDNS link-IP endpoint with a plain GET. NextDNS records the
// source address of the request as the profile's linked IP, so the request
// itself is the whole update; there is no body to send or parse.
//
// ## Outcome classification
//
// | Situation                          | Result                   |
// |------------------------------------|--------------------------|
// | endpoint not absolute / no host    | `Error::EndpointInvalid` |
// | connect, DNS, TLS or timeout error | `Error::Network`         |
// | status 200                         | `Ok(())`                 |
// | any other status                   | `Error::UnexpectedStatus`|

use crate::config::REQUEST_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::traits::Updater;

use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::{debug, error, info};

/// Updater that issues one HTTP GET per attempt
///
/// The client is built once and reused for every cycle.
#[derive(Debug, Clone)]
pub struct HttpUpdater {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpUpdater {
    /// Create an updater with the standard 30 second request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Create an updater with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nextdns-updater/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Total request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform one update and classify the outcome without logging it
    pub async fn update(&self, endpoint: &str) -> Result<()> {
        let url = parse_endpoint(endpoint)?;

        debug!("Calling {} (timeout={:?})", url, self.timeout);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network(endpoint, describe_request_error(&e)))?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(Error::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status_code: status.as_u16(),
                status: status.to_string(),
            })
        }
    }
}

#[async_trait::async_trait]
impl Updater for HttpUpdater {
    async fn attempt_update(&self, endpoint: &str) -> bool {
        match self.update(endpoint).await {
            Ok(()) => {
                info!(endpoint = %endpoint, "Successfully updated NextDNS");
                true
            }
            Err(Error::EndpointInvalid { reason, .. }) => {
                error!(
                    endpoint = %endpoint,
                    error = "invalid NextDNS endpoint",
                    reason = %reason,
                    "Invalid NextDNS endpoint"
                );
                false
            }
            Err(Error::UnexpectedStatus {
                status_code,
                status,
                ..
            }) => {
                error!(
                    endpoint = %endpoint,
                    status_code,
                    status = %status,
                    "Failed to update NextDNS"
                );
                false
            }
            Err(e) => {
                let detail = match &e {
                    Error::Network { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                error!(endpoint = %endpoint, error = %detail, "Error updating NextDNS");
                false
            }
        }
    }

    fn updater_name(&self) -> &'static str {
        "http"
    }
}

/// Parse and check an endpoint string
///
/// The endpoint must be an absolute URL that names a host.
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint).map_err(|e| Error::endpoint_invalid(endpoint, e.to_string()))?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::endpoint_invalid(endpoint, "URL has no host"));
    }

    Ok(url)
}

fn describe_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_endpoint() {
        let url = parse_endpoint("https://link-ip.nextdns.io/abc123/def456").expect("valid");
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("link-ip.nextdns.io"));
    }

    #[test]
    fn test_parse_rejects_relative() {
        assert!(matches!(
            parse_endpoint("invalid-url"),
            Err(Error::EndpointInvalid { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            parse_endpoint(""),
            Err(Error::EndpointInvalid { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_missing_host() {
        for endpoint in ["mailto:someone@example.com", "file:///etc/hosts", "data:text/plain,hi"] {
            assert!(
                matches!(parse_endpoint(endpoint), Err(Error::EndpointInvalid { .. })),
                "{endpoint} should be rejected"
            );
        }
    }

    #[test]
    fn test_default_timeout() {
        let updater = HttpUpdater::new().expect("client builds");
        assert_eq!(updater.timeout(), Duration::from_secs(30));
        assert_eq!(updater.updater_name(), "http");
    }
}
