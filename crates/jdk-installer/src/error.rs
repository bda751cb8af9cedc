//! Error types for jdk-installer

use std::path::PathBuf;

use thiserror::Error;

use crate::installer::InstallStage;

/// Project or installer configuration that cannot be turned into a version
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Declared version matches none of the supported naming schemes
    #[error("unparseable version string {value:?}")]
    UnparseableVersion { value: String },

    /// Declared version, with the file it came from
    #[error("invalid java.runtime.version {value:?} in {}", .path.display())]
    InvalidDeclaredVersion { value: String, path: PathBuf },

    /// system.properties exists but could not be read
    #[error("failed to read {}: {source}", .path.display())]
    ReadProperties {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Default version table rejected at construction
    #[error("invalid default version table: {0}")]
    InvalidDefaults(String),
}

/// Download location could not be built or does not hold an archive
#[derive(Error, Debug)]
pub enum LocationError {
    /// STACK is not set
    #[error("missing stack: set STACK to the target image family")]
    MissingStack,

    /// Probe answered with a non-success status
    #[error("Invalid JDK version: {url} (HTTP {status})")]
    Unavailable { url: String, status: u16 },

    /// Probe could not reach the endpoint
    #[error("Invalid JDK version: {url} ({reason})")]
    Unreachable { url: String, reason: String },

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// External fetcher failed; the layer contents are not a usable JDK
#[derive(Error, Debug)]
pub enum FetchError {
    /// Destination layer directory could not be created
    #[error("failed to create {}: {source}", .path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fetcher could not be started
    #[error("failed to run {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fetcher exited unsuccessfully
    #[error("{} failed for {url} (exit code {})", .program.display(), exit_code(.code))]
    Failed {
        program: PathBuf,
        url: String,
        code: Option<i32>,
    },
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Local filesystem failure while configuring an installed JDK
#[derive(Error, Debug)]
pub enum PostInstallError {
    /// Trust store could not be replaced with a symlink
    #[error("failed to link trust store {}: {source}", .path.display())]
    TrustStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bundled profile.d template is missing or unreadable
    #[error("failed to read profile template {}: {source}", .path.display())]
    TemplateMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Profile script could not be written
    #[error("failed to write profile script {}: {source}", .path.display())]
    ProfileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// .jdk-overlay could not be applied
    #[error("failed to apply JDK overlay at {}: {source}", .path.display())]
    Overlay {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Layer metadata could not be written or read
#[derive(Error, Debug)]
pub enum PersistError {
    /// Metadata file I/O
    #[error("layer metadata I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML encoding
    #[error("failed to encode layer metadata: {0}")]
    Encode(#[from] toml::ser::Error),

    /// TOML decoding
    #[error("failed to decode layer metadata {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Any failure of an installation, tagged with the stage it was reached from
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("installation error: {0}")]
    Location(#[from] LocationError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("post-install error: {0}")]
    PostInstall(#[from] PostInstallError),

    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

impl InstallError {
    /// Last stage the installer completed before this failure.
    pub fn stage(&self) -> InstallStage {
        match self {
            InstallError::Configuration(_) => InstallStage::Start,
            InstallError::Location(_) => InstallStage::VersionResolved,
            InstallError::Fetch(_) => InstallStage::LocationValidated,
            InstallError::PostInstall(PostInstallError::TrustStore { .. }) => InstallStage::Fetched,
            InstallError::PostInstall(PostInstallError::Overlay { .. }) => {
                InstallStage::ProfilesWritten
            }
            InstallError::PostInstall(_) => InstallStage::CertsLinked,
            InstallError::Persist(_) => InstallStage::OverlayApplied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_error_names_url() {
        let err = LocationError::Unavailable {
            url: "https://example.test/heroku-18/openjdk1.8.0_191.tar.gz".to_string(),
            status: 404,
        };
        let msg = err.to_string();
        assert!(msg.contains("openjdk1.8.0_191.tar.gz"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn test_fetch_error_without_exit_code() {
        let err = FetchError::Failed {
            program: PathBuf::from("jdk-fetcher"),
            url: "https://example.test/a.tar.gz".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("exit code none"));
    }

    #[test]
    fn test_install_error_stage_mapping() {
        let err: InstallError = LocationError::MissingStack.into();
        assert_eq!(err.stage(), InstallStage::VersionResolved);

        let err: InstallError = ConfigurationError::UnparseableVersion {
            value: "banana".to_string(),
        }
        .into();
        assert_eq!(err.stage(), InstallStage::Start);
        assert!(err.to_string().contains("banana"));

        let err: InstallError = PostInstallError::TemplateMissing {
            path: PathBuf::from("profile.d/jvm.sh"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
        .into();
        assert_eq!(err.stage(), InstallStage::CertsLinked);
    }
}
