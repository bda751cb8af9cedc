//! Runtime archive fetcher
//!
//! Downloading and unpacking is delegated to an out-of-process fetcher
//! invoked as `<fetcher> <url> <destination>`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::FetchError;

/// Name of the fetcher shipped in the buildpack's `bin/` directory.
pub const JDK_FETCHER: &str = "jdk-fetcher";

/// Downloads the archive at `url` and unpacks it into `dest`.
#[async_trait]
pub trait RuntimeFetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// Runs an external fetcher program.
///
/// The child inherits the environment and the parent's stdout/stderr.
/// Any non-zero exit is a total failure.
#[derive(Debug, Clone)]
pub struct ProcessFetcher {
    program: PathBuf,
    leading_args: Vec<String>,
}

impl ProcessFetcher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ProcessFetcher {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments passed before the url and destination.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl RuntimeFetcher for ProcessFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        info!("Fetching {} into {:?}", url, dest);
        debug!("running {:?} {:?}", self.program, self.leading_args);

        let status = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(url)
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| FetchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(FetchError::Failed {
                program: self.program.clone(),
                url: url.to_string(),
                code: status.code(),
            });
        }

        Ok(())
    }
}
