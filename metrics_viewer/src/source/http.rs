//! HTTP(S) endpoint source
//!
//! Issues a GET against a metrics endpoint, optionally with basic
//! authentication.

use std::time::Duration;

use tracing::trace;

use super::Error;

#[derive(Clone, PartialEq, Eq)]
/// Configuration for [`Http`]
pub struct Config {
    /// URI to scrape
    pub uri: String,
    /// Basic auth user name, no authentication when unset
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// The HTTP endpoint source
#[derive(Debug)]
pub struct Http {
    config: Config,
    client: reqwest::Client,
}

impl Http {
    /// Create a new [`Http`] instance whose requests give up after `deadline`
    ///
    /// # Errors
    ///
    /// Function will error if the HTTP client cannot be constructed.
    pub fn new(config: Config, deadline: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(deadline)
            .build()
            .map_err(Error::Client)?;
        Ok(Self { config, client })
    }

    /// The URI this source requests
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    /// Request the endpoint once
    ///
    /// # Errors
    ///
    /// Function will error on transport failure or a non-2xx status.
    pub async fn fetch(&self) -> Result<String, Error> {
        let uri = &self.config.uri;
        let mut request = self.client.get(uri);
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }

        let resp = request.send().await.map_err(|source| Error::Request {
            uri: uri.clone(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                uri: uri.clone(),
                status,
            });
        }

        let text = resp.text().await.map_err(|source| Error::Request {
            uri: uri.clone(),
            source,
        })?;
        trace!(%uri, bytes = text.len(), "scraped metrics endpoint");
        Ok(text)
    }
}
