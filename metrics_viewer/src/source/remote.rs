//! Remote management API source
//!
//! Metrics are retrieved through a caller supplied client that already knows
//! how to reach and authenticate against a management endpoint. The client is
//! held as an opaque [`RemoteClient`] so any backend can be plugged in.
//! [`ManagementClient`] is the stock implementation for endpoints serving
//! `<base>/api/v1/metrics` behind token or basic authentication.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::trace;

use super::Error;

/// Path of the metrics resource below a management API base URL
pub const METRICS_PATH: &str = "api/v1/metrics";

#[derive(thiserror::Error, Debug)]
/// Errors produced by a [`RemoteClient`]
pub enum ClientError {
    /// The credentials were rejected
    #[error("not authorized: {0}")]
    Unauthorized(StatusCode),
    /// The endpoint answered with an unexpected non-2xx status
    #[error("unexpected status: {0}")]
    Status(StatusCode),
    /// The request did not complete
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    /// Any other client specific failure
    #[error("{0}")]
    Other(String),
}

/// An authenticated client able to retrieve metrics text
#[async_trait]
pub trait RemoteClient: fmt::Debug + Send + Sync {
    /// Retrieve the complete exposition text
    async fn metrics(&self) -> Result<String, ClientError>;

    /// Human readable description of the endpoint, used in logs
    fn endpoint(&self) -> String;
}

/// The remote management API source
#[derive(Debug, Clone)]
pub struct Remote {
    client: Arc<dyn RemoteClient>,
}

impl Remote {
    /// Create a new [`Remote`] instance around `client`
    #[must_use]
    pub fn new(client: Arc<dyn RemoteClient>) -> Self {
        Self { client }
    }

    /// Description of the endpoint behind the client
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.client.endpoint()
    }

    /// Retrieve metrics through the client
    ///
    /// # Errors
    ///
    /// Function will error if the client does, wrapping its error.
    pub async fn fetch(&self) -> Result<String, Error> {
        Ok(self.client.metrics().await?)
    }
}

#[derive(Clone, PartialEq, Eq)]
/// How [`ManagementClient`] authenticates
pub enum Credentials {
    /// Bearer access token
    AccessToken(String),
    /// Basic authentication
    Basic {
        /// User name
        username: String,
        /// Password, may be empty
        password: Option<String>,
    },
    /// No authentication
    Anonymous,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// [`RemoteClient`] for management APIs serving [`METRICS_PATH`]
#[derive(Debug)]
pub struct ManagementClient {
    endpoint: String,
    credentials: Credentials,
    client: reqwest::Client,
}

impl ManagementClient {
    /// Create a new [`ManagementClient`] for the API rooted at `base_url`
    ///
    /// # Errors
    ///
    /// Function will error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        deadline: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(deadline).build()?;
        Ok(Self {
            endpoint: format!("{}/{METRICS_PATH}", base_url.trim_end_matches('/')),
            credentials,
            client,
        })
    }
}

#[async_trait]
impl RemoteClient for ManagementClient {
    async fn metrics(&self) -> Result<String, ClientError> {
        let request = self.client.get(&self.endpoint);
        let request = match &self.credentials {
            Credentials::AccessToken(token) => request.bearer_auth(token),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, password.as_ref())
            }
            Credentials::Anonymous => request,
        };

        let resp = request.send().await?;
        let status = resp.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ClientError::Unauthorized(status));
            }
            s if !s.is_success() => return Err(ClientError::Status(status)),
            _ => {}
        }

        let text = resp.text().await?;
        trace!(endpoint = %self.endpoint, bytes = text.len(), "fetched remote metrics");
        Ok(text)
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}
