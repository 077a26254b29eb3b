//! Metrics sources
//!
//! A source retrieves raw exposition text on demand. Exactly one source is
//! active per run, constructed once from [`Config`] and then driven by the
//! [`crate::poller::Poller`] through the [`Fetch`] trait. Sources never retry,
//! a failed fetch is reported and the poller tries again next cycle.

use std::{fmt, io, path::PathBuf, time::Duration};

use async_trait::async_trait;

pub mod file;
pub mod http;
pub mod mock;
pub mod remote;

#[derive(thiserror::Error, Debug)]
/// Errors produced by a [`Fetch`] implementation
///
/// Every variant means the source was unavailable for one cycle.
pub enum Error {
    /// The metrics file could not be read
    #[error("could not read {}: {source}", path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },
    /// The HTTP request did not complete
    #[error("request to {uri} failed: {source}")]
    Request {
        /// Requested URI
        uri: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },
    /// The HTTP endpoint answered with a non-2xx status
    #[error("{uri} responded with status {status}")]
    Status {
        /// Requested URI
        uri: String,
        /// Status code of the response
        status: reqwest::StatusCode,
    },
    /// The remote management client failed
    #[error("remote metrics client failed: {0}")]
    Remote(#[from] remote::ClientError),
    /// The fetch did not finish before its deadline
    #[error("fetch did not complete within {0:?}")]
    Timeout(Duration),
    /// The HTTP client could not be constructed
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// The capability to retrieve raw metrics text now
#[async_trait]
pub trait Fetch: Send {
    /// Retrieve the complete exposition text
    async fn fetch(&mut self) -> Result<String, Error>;
}

/// Configuration for [`Source`]
#[derive(Debug, Clone)]
pub enum Config {
    /// See [`file::Config`] for details.
    File(file::Config),
    /// See [`http::Config`] for details.
    Http(http::Config),
    /// A caller supplied, already authenticated remote client.
    Remote(remote::Remote),
    /// See [`mock::Config`] for details.
    Mock(mock::Config),
}

/// The active metrics source
#[derive(Debug)]
pub enum Source {
    /// See [`file::File`] for details.
    File(file::File),
    /// See [`http::Http`] for details.
    Http(http::Http),
    /// See [`remote::Remote`] for details.
    Remote(remote::Remote),
    /// See [`mock::Mock`] for details.
    Mock(mock::Mock),
}

impl Source {
    /// Create a new [`Source`] instance
    ///
    /// `deadline` bounds every network request the source makes.
    ///
    /// # Errors
    ///
    /// Function will error if the HTTP client cannot be constructed.
    pub fn new(config: Config, deadline: Duration) -> Result<Self, Error> {
        Ok(match config {
            Config::File(conf) => Self::File(file::File::new(conf)),
            Config::Http(conf) => Self::Http(http::Http::new(conf, deadline)?),
            Config::Remote(remote) => Self::Remote(remote),
            Config::Mock(conf) => Self::Mock(mock::Mock::new(conf)),
        })
    }
}

#[async_trait]
impl Fetch for Source {
    async fn fetch(&mut self) -> Result<String, Error> {
        match self {
            Self::File(inner) => inner.fetch().await,
            Self::Http(inner) => inner.fetch().await,
            Self::Remote(inner) => inner.fetch().await,
            Self::Mock(inner) => Ok(inner.fetch()),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(inner) => write!(f, "file {}", inner.path().display()),
            Self::Http(inner) => write!(f, "url {}", inner.uri()),
            Self::Remote(inner) => write!(f, "remote {}", inner.endpoint()),
            Self::Mock(_) => f.write_str("mock data"),
        }
    }
}
