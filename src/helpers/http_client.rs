use std::time::Duration;
use log::{debug, error};
use thiserror::Error;

/// Error types that can occur when talking to an HTTP server
///
/// A response with a non-success status code is not an error at this level,
/// it is returned as an `HttpResponse` so callers can classify it.
#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("HTTP request error: {0}")]
    RequestError(String),

    #[error("Failed to read response body: {0}")]
    ParseError(String),
}

/// Status code and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A trait for HTTP client implementations
/// This version avoids generic methods to enable dynamic dispatch
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    /// Send a GET request and return the response for any status code
    fn get(&self, url: &str) -> Result<HttpResponse, HttpClientError>;

    /// Clone the client as a boxed trait object
    fn clone_box(&self) -> Box<dyn HttpClient>;
}

impl Clone for Box<dyn HttpClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// An HTTP client implementation using a pooled ureq agent
///
/// The agent keeps idle connections around, so sequential requests to the
/// same host reuse them. The timeout bounds the whole request, including
/// connecting and reading the body.
#[derive(Clone, Debug)]
pub struct UreqHttpClient {
    agent: ureq::Agent,
    timeout: Duration,
}

impl UreqHttpClient {
    /// Create a new HTTP client with the specified timeout
    pub fn new(timeout_secs: u64) -> Self {
        let timeout = Duration::from_secs(timeout_secs);
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(&format!("lrcfetch/{}", env!("CARGO_PKG_VERSION")))
            .build();

        Self { agent, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for UreqHttpClient {
    /// HTTP client with the LRCLIB default timeout (30 seconds)
    fn default() -> Self {
        Self::new(30)
    }
}

impl HttpClient for UreqHttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpClientError> {
        debug!("GET request to {}", url);

        let response = match self.agent.get(url).call() {
            Ok(resp) => resp,
            // ureq reports 4xx/5xx as errors, but they still carry a response
            Err(ureq::Error::Status(code, resp)) => {
                debug!("GET request returned status {}", code);
                resp
            }
            Err(e) => {
                error!("GET request failed: {}", e);
                return Err(HttpClientError::RequestError(e.to_string()));
            }
        };

        let status = response.status();
        match response.into_string() {
            Ok(text) => Ok(HttpResponse::new(status, text)),
            Err(e) => {
                error!("Failed to read response body: {}", e);
                Err(HttpClientError::ParseError(e.to_string()))
            }
        }
    }

    fn clone_box(&self) -> Box<dyn HttpClient> {
        Box::new(self.clone())
    }
}

/// Create a new HTTP client using the default implementation
pub fn new_http_client(timeout_secs: u64) -> Box<dyn HttpClient> {
    Box::new(UreqHttpClient::new(timeout_secs))
}
