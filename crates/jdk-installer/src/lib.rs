//! JDK installer for the JVM buildpack
//!
//! Decides which JDK an application needs, checks that an archive for it
//! exists, has an external fetcher unpack it into a launch layer, and then
//! configures the result: trust store link, profile scripts, the
//! application's `.jdk-overlay`, and layer metadata.
//!
//! The network probe and the fetcher sit behind [`ArchiveProbe`] and
//! [`RuntimeFetcher`] so tests can substitute the in-memory versions from
//! [`fakes`].

pub mod certs;
pub mod config;
mod error;
pub mod fakes;
pub mod fetcher;
pub mod installer;
pub mod layer;
pub mod locator;
pub mod overlay;
pub mod profile;
pub mod properties;
pub mod telemetry;
pub mod version;

pub use error::{
    ConfigurationError, FetchError, InstallError, LocationError, PersistError, PostInstallError,
};

pub use certs::TrustStoreLinker;
pub use config::InstallerConfig;
pub use fetcher::{ProcessFetcher, RuntimeFetcher};
pub use installer::{installed_runtime, InstallStage, InstalledRuntime, Installer, JDK_LAYER};
pub use layer::{Launch, Layer};
pub use locator::{locate, ArchiveProbe, HttpProbe, ProbeOutcome};
pub use overlay::apply_overlay;
pub use profile::EnvironmentProvisioner;
pub use properties::detect_version;
pub use telemetry::init_tracing;
pub use version::{DefaultVersions, Version};

/// Result type for installer operations
pub type Result<T> = std::result::Result<T, InstallError>;
