//! HTTP seam between the fetcher and the network.

use std::fmt;
use std::time::Duration;

use crate::options::PubChemOptions;

/// Status line and body of a completed HTTP exchange.
///
/// Non-success statuses are returned as responses, not errors, so the
/// fetcher can classify them itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Numeric status code.
    pub status: u16,
    /// Reason phrase for the status (e.g. "Not Found").
    pub status_text: String,
    /// Response body decoded as UTF-8.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the server reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// A request that never produced a status line (DNS, TLS, timeout, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TransportError {}

/// Blocking GET transport. Implementations must be shareable across the
/// two request threads of a single fetch.
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request and return whatever status the server sent.
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by a shared [`ureq::Agent`].
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqTransport {
    /// Build an agent honouring the configured timeout and user agent.
    #[must_use]
    pub fn new(options: &PubChemOptions) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(options.timeout_secs)))
            .build();
        Self {
            agent: config.into(),
            user_agent: options.user_agent.clone(),
        }
    }
}

impl HttpTransport for UreqTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status();
        let status_text = status
            .canonical_reason()
            .map_or_else(|| status.as_str().to_owned(), str::to_owned);
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| TransportError(format!("failed to read body: {e}")))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}
