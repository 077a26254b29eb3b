//! File source
//!
//! Reads a file holding exposition text. The whole file is read again on
//! every fetch, there is no tailing.

use std::path::{Path, PathBuf};

use tracing::trace;

use super::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Configuration for [`File`]
pub struct Config {
    /// Path of the metrics file
    pub path: PathBuf,
}

/// The file backed source
#[derive(Debug)]
pub struct File {
    path: PathBuf,
}

impl File {
    /// Create a new [`File`] instance
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { path: config.path }
    }

    /// The path this source reads
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the entire file
    ///
    /// Invalid UTF-8 is replaced with U+FFFD so the offending lines surface
    /// as parse warnings instead of failing the whole read.
    ///
    /// # Errors
    ///
    /// Function will error if the file cannot be opened or read.
    pub async fn fetch(&self) -> Result<String, Error> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| Error::Io {
                path: self.path.clone(),
                source,
            })?;
        trace!(path = %self.path.display(), bytes = bytes.len(), "read metrics file");
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        })
    }
}
