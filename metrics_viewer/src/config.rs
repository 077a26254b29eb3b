//! This module turns what the end user asked for into a validated [`Config`].
//! All configuration errors surface here, before any polling starts.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use serde::Deserialize;

use crate::{
    aggregate::IgnoreSet,
    filter::Filter,
    source::{
        self, file, http, mock,
        remote::{self, ClientError, Credentials, ManagementClient, Remote},
    },
};

/// Poll interval, in seconds, when none is given
pub const DEFAULT_INTERVAL_SECONDS: i64 = 5;

/// Errors produced by [`Settings`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No source was selected and mock data was not requested
    #[error("one flag is required: --file, --url or --remote-url")]
    NoSource,
    /// More than one source was selected
    #[error("only one flag is required: --file, --url or --remote-url")]
    MultipleSources,
    /// The metrics file could not be opened
    #[error("Failed to open metrics file {path:?}: {source}")]
    FileUnreadable {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// The interval was zero or negative
    #[error("interval must be a positive number of seconds, got {0}")]
    NonPositiveInterval(i64),
    /// A basic auth password was given without a user to go with it
    #[error("a password requires a user")]
    PasswordWithoutUser,
    /// The filter did not compile
    #[error("Invalid filter expression: {0}")]
    InvalidFilter(#[from] regex::Error),
    /// Error for a serde [`serde_yaml`].
    #[error("Failed to deserialize yaml: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    /// Error reading a configuration file
    #[error("Failed to read config file {path:?}: {source}")]
    ReadFile {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// The remote management client could not be built
    #[error("Failed to construct remote client: {0}")]
    RemoteClient(#[from] ClientError),
}

fn default_interval() -> i64 {
    DEFAULT_INTERVAL_SECONDS
}

/// Connection settings for a remote management API
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RemoteSettings {
    /// Base URL of the management API
    pub url: String,
    /// Bearer access token, preferred over user and password
    pub access_token: Option<String>,
    /// Basic auth user name
    pub user: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
}

/// Unresolved configuration, as written in a YAML file or given as flags
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Read metrics from this file
    pub file: Option<PathBuf>,
    /// Scrape metrics from this URL
    pub url: Option<String>,
    /// Basic auth user name for `url`
    pub user: Option<String>,
    /// Basic auth password for `url`
    pub password: Option<String>,
    /// Retrieve metrics from a remote management API
    pub remote: Option<RemoteSettings>,
    /// Seconds between polls
    #[serde(default = "default_interval")]
    pub interval: i64,
    /// Keep only families whose name matches this regular expression
    pub filter: Option<String>,
    /// Comma separated label names to aggregate over, or `ALL` / `NONE`
    #[serde(default)]
    pub aggregate_ignore_labels: IgnoreSet,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file: None,
            url: None,
            user: None,
            password: None,
            remote: None,
            interval: DEFAULT_INTERVAL_SECONDS,
            filter: None,
            aggregate_ignore_labels: IgnoreSet::default(),
        }
    }
}

/// Validated configuration, ready to drive a [`crate::poller::Poller`]
#[derive(Debug, Clone)]
pub struct Config {
    /// The one active source
    pub source: source::Config,
    /// Time between the start of two cycles, also the fetch deadline
    pub interval: Duration,
    /// Family name filter
    pub filter: Filter,
    /// Labels dropped from the aggregation key
    pub ignore: IgnoreSet,
}

impl Settings {
    /// Parse [`Settings`] from YAML
    ///
    /// # Errors
    ///
    /// Function will error if `contents` is not valid settings YAML.
    pub fn from_yaml(contents: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Load [`Settings`] from the YAML file at `path`
    ///
    /// # Errors
    ///
    /// Function will error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        Self::from_yaml(&contents)
    }

    /// Validate these settings and resolve them into a [`Config`]
    ///
    /// `mock_enabled` allows running without any source, in which case
    /// synthetic data is served.
    ///
    /// # Errors
    ///
    /// Function will error if not exactly one source is selected, the file
    /// source cannot be opened, the interval is not positive or the filter is
    /// not a valid regular expression.
    pub fn resolve(self, mock_enabled: bool) -> Result<Config, Error> {
        let file = self.file.filter(|path| !path.as_os_str().is_empty());
        let url = non_empty(self.url);
        let remote = self.remote.filter(|remote| !remote.url.is_empty());

        let selected = [file.is_some(), url.is_some(), remote.is_some()]
            .into_iter()
            .filter(|selected| *selected)
            .count();
        match selected {
            0 if !mock_enabled => return Err(Error::NoSource),
            0 | 1 => {}
            _ => return Err(Error::MultipleSources),
        }

        if let Some(path) = &file {
            fs::File::open(path).map_err(|source| Error::FileUnreadable {
                path: path.clone(),
                source: Box::new(source),
            })?;
        }

        let interval = u64::try_from(self.interval)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or(Error::NonPositiveInterval(self.interval))?;

        let filter = match non_empty(self.filter) {
            Some(pattern) => Filter::new(&pattern)?,
            None => Filter::match_all(),
        };

        let source = if let Some(path) = file {
            source::Config::File(file::Config { path })
        } else if let Some(uri) = url {
            let (username, password) = (non_empty(self.user), non_empty(self.password));
            if username.is_none() && password.is_some() {
                return Err(Error::PasswordWithoutUser);
            }
            source::Config::Http(http::Config {
                uri,
                username,
                password,
            })
        } else if let Some(remote) = remote {
            source::Config::Remote(remote_source(remote, interval)?)
        } else {
            source::Config::Mock(mock::Config::default())
        };

        Ok(Config {
            source,
            interval,
            filter,
            ignore: self.aggregate_ignore_labels,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn remote_source(settings: RemoteSettings, deadline: Duration) -> Result<Remote, Error> {
    let password = non_empty(settings.password);
    let credentials = match (non_empty(settings.access_token), non_empty(settings.user)) {
        (Some(token), _) => Credentials::AccessToken(token),
        (None, Some(username)) => Credentials::Basic { username, password },
        (None, None) if password.is_some() => return Err(Error::PasswordWithoutUser),
        (None, None) => Credentials::Anonymous,
    };
    let client = ManagementClient::new(&settings.url, credentials, deadline)?;
    let client: Arc<dyn remote::RemoteClient> = Arc::new(client);
    Ok(Remote::new(client))
}
