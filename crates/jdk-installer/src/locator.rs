//! Download location of a JDK archive and its remote validation
//!
//! Building a plausible URL and checking that an archive actually lives
//! there are separate steps, so the installer can stop before the fetch
//! with an error naming the URL.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::LocationError;
use crate::version::Version;

/// Base URL used when `DEFAULT_JDK_BASE_URL` is not set.
pub const DEFAULT_JDK_BASE_URL: &str = "https://lang-jvm.s3.amazonaws.com/jdk";

/// Build the archive URL `<base>/<stack>/<vendor><tag>.tar.gz`.
///
/// The stack is mandatory; there is no default image family.
pub fn locate(
    version: &Version,
    stack: Option<&str>,
    base_url: &str,
) -> Result<String, LocationError> {
    let stack = stack
        .filter(|s| !s.is_empty())
        .ok_or(LocationError::MissingStack)?;

    Ok(format!(
        "{}/{}/{}.tar.gz",
        base_url.trim_end_matches('/'),
        stack,
        version
    ))
}

/// Result of a metadata-only request against an archive URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx or 3xx
    Available(u16),
    /// Any other status
    Unavailable(u16),
    /// Transport failure
    Unreachable(String),
}

impl ProbeOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, ProbeOutcome::Available(_))
    }

    /// Turn a non-available outcome into the error for `url`.
    pub fn into_result(self, url: &str) -> Result<(), LocationError> {
        match self {
            ProbeOutcome::Available(_) => Ok(()),
            ProbeOutcome::Unavailable(status) => Err(LocationError::Unavailable {
                url: url.to_string(),
                status,
            }),
            ProbeOutcome::Unreachable(reason) => Err(LocationError::Unreachable {
                url: url.to_string(),
                reason,
            }),
        }
    }
}

/// Checks whether an archive exists at a URL without downloading it.
#[async_trait]
pub trait ArchiveProbe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// HEAD-request probe backed by reqwest
pub struct HttpProbe {
    http_client: reqwest::Client,
}

impl HttpProbe {
    /// Create a probe with the installer's user agent.
    pub fn new() -> Result<Self, LocationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("jvm-buildpack-jdk-installer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LocationError::Client(e.to_string()))?;

        Ok(HttpProbe { http_client })
    }

    /// Wrap an existing client.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        HttpProbe { http_client }
    }
}

#[async_trait]
impl ArchiveProbe for HttpProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        debug!("HEAD {}", url);
        match self.http_client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || status.is_redirection() {
                    ProbeOutcome::Available(status.as_u16())
                } else {
                    warn!("archive probe for {} returned {}", url, status);
                    ProbeOutcome::Unavailable(status.as_u16())
                }
            }
            Err(e) => {
                warn!("archive probe for {} failed: {}", url, e);
                ProbeOutcome::Unreachable(e.to_string())
            }
        }
    }
}
