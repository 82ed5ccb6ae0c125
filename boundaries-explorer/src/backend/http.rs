//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::error::NetworkError;

/// Default request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("boundaries-explorer/", env!("CARGO_PKG_VERSION"));

/// Trait for asynchronous HTTP GET requests.
///
/// The backend only reads, so GET is the whole surface. Implementations map
/// transport failures and non-success statuses to [`NetworkError`].
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request and returns the body.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, NetworkError>> + Send;
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with the default timeout.
    pub fn new() -> Result<Self, NetworkError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| NetworkError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, NetworkError> {
        trace!(url = url, "GET");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = url, error = %e, "Request failed");
            NetworkError::Http(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = url, status = status.as_u16(), "Non-success status");
            return Err(NetworkError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| NetworkError::Http(format!("Failed to read response: {}", e)))?;

        debug!(url = url, bytes = body.len(), "Response received");
        Ok(body.to_vec())
    }
}
