//! JDK installation orchestration
//!
//! One linear pass per build:
//!
//! ```text
//! Start -> VersionResolved -> LocationValidated -> Fetched -> CertsLinked
//!       -> ProfilesWritten -> OverlayApplied -> Done
//! ```
//!
//! The first failing step ends the install; nothing is retried. Every
//! step overwrites or leaves already-correct state alone, so re-running a
//! build against a populated layer is safe.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::certs::TrustStoreLinker;
use crate::config::InstallerConfig;
use crate::error::{FetchError, InstallError};
use crate::fetcher::{ProcessFetcher, RuntimeFetcher};
use crate::layer::Layer;
use crate::locator::{locate, ArchiveProbe, HttpProbe};
use crate::overlay::apply_overlay;
use crate::profile::EnvironmentProvisioner;
use crate::properties::detect_version;
use crate::version::Version;
use crate::Result;

/// Name of the launch layer the JDK is installed into.
pub const JDK_LAYER: &str = "jdk";

/// Progress of a single installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InstallStage {
    Start,
    VersionResolved,
    LocationValidated,
    Fetched,
    CertsLinked,
    ProfilesWritten,
    OverlayApplied,
    Done,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallStage::Start => "start",
            InstallStage::VersionResolved => "version-resolved",
            InstallStage::LocationValidated => "location-validated",
            InstallStage::Fetched => "fetched",
            InstallStage::CertsLinked => "certs-linked",
            InstallStage::ProfilesWritten => "profiles-written",
            InstallStage::OverlayApplied => "overlay-applied",
            InstallStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A successfully installed JDK, persisted as the layer's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledRuntime {
    /// Root of the installed JDK
    pub home: PathBuf,
    /// Version that was installed
    pub version: Version,
}

/// Resolves, fetches and configures a JDK
pub struct Installer {
    config: InstallerConfig,
    probe: Arc<dyn ArchiveProbe>,
    fetcher: Arc<dyn RuntimeFetcher>,
    linker: TrustStoreLinker,
    provisioner: EnvironmentProvisioner,
}

impl Installer {
    /// Installer with explicit probe and fetcher capabilities.
    pub fn new(
        config: InstallerConfig,
        probe: Arc<dyn ArchiveProbe>,
        fetcher: Arc<dyn RuntimeFetcher>,
    ) -> Self {
        let linker = TrustStoreLinker::new(config.system_trust_store.clone());
        let provisioner = EnvironmentProvisioner::new(config.profile_templates_dir());
        Installer {
            config,
            probe,
            fetcher,
            linker,
            provisioner,
        }
    }

    /// Installer using an HTTP HEAD probe and the configured fetcher program.
    pub fn from_config(config: InstallerConfig) -> Result<Self> {
        let probe = Arc::new(HttpProbe::new()?);
        let fetcher = Arc::new(ProcessFetcher::new(config.fetcher.clone()));
        Ok(Self::new(config, probe, fetcher))
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Version the application asks for, or the default.
    pub fn resolve_version(&self, app_dir: &Path) -> Result<Version> {
        Ok(detect_version(app_dir, &self.config.defaults)?)
    }

    /// Archive URL for `version`, checked to exist.
    pub async fn validate_location(&self, version: &Version) -> Result<String> {
        let url = locate(version, self.config.stack.as_deref(), &self.config.base_url)?;
        self.probe.probe(&url).await.into_result(&url)?;
        Ok(url)
    }

    /// Install the JDK for the application at `app_dir` into `layer`.
    pub async fn install(&self, app_dir: &Path, layer: &Layer) -> Result<InstalledRuntime> {
        let version = self.resolve_version(app_dir)?;
        info!(stage = %InstallStage::VersionResolved, "Resolved JDK {}", version);

        let url = self.validate_location(&version).await?;
        info!(stage = %InstallStage::LocationValidated, "Found {}", url);

        // a previous record must not outlive a fetch that overwrites the layer
        layer.remove_metadata().map_err(|source| FetchError::Destination {
            path: layer.metadata_path().to_path_buf(),
            source,
        })?;

        let home = layer.root().to_path_buf();
        std::fs::create_dir_all(&home).map_err(|source| FetchError::Destination {
            path: home.clone(),
            source,
        })?;
        self.fetcher.fetch(&url, &home).await?;
        info!(stage = %InstallStage::Fetched, "Fetched JDK into {:?}", home);

        let linked = self.linker.link(&home)?;
        info!(stage = %InstallStage::CertsLinked, "Trust store: {:?}", linked);

        self.provisioner.provision(layer)?;
        info!(stage = %InstallStage::ProfilesWritten, "Profile scripts written");

        let overlaid = apply_overlay(app_dir, &home)?;
        info!(stage = %InstallStage::OverlayApplied, "Overlay files: {}", overlaid);

        let installed = InstalledRuntime { home, version };
        layer.write_metadata(&installed)?;
        info!(
            stage = %InstallStage::Done,
            "Installed {} at {:?}", installed.version, installed.home
        );

        Ok(installed)
    }
}

/// Read the runtime recorded in `layer` by a previous install.
pub fn installed_runtime(layer: &Layer) -> Result<InstalledRuntime> {
    layer.read_metadata().map_err(InstallError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeFetcher, RuntimeLayout, StaticProbe};
    use crate::layer::Launch;
    use crate::locator::ProbeOutcome;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        app: TempDir,
        launch: TempDir,
        buildpack: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let buildpack = tempdir().unwrap();
            let profile = buildpack.path().join("profile.d");
            std::fs::create_dir_all(&profile).unwrap();
            std::fs::write(profile.join("jvm.sh"), "export JAVA_HOME=\"$HOME/.jdk\"\n").unwrap();
            std::fs::write(profile.join("jdbc.sh"), "true\n").unwrap();
            Fixture {
                app: tempdir().unwrap(),
                launch: tempdir().unwrap(),
                buildpack,
            }
        }

        fn config(&self) -> InstallerConfig {
            InstallerConfig::new(self.buildpack.path())
                .with_stack("test-stack")
                .with_base_url("http://mirror.local/jdk")
                .with_system_trust_store(self.buildpack.path().join("no-system-cacerts"))
        }

        fn layer(&self) -> Layer {
            Launch::new(self.launch.path()).layer(JDK_LAYER)
        }
    }

    #[test]
    fn test_stage_order_and_names() {
        assert!(InstallStage::Start < InstallStage::VersionResolved);
        assert!(InstallStage::OverlayApplied < InstallStage::Done);
        assert_eq!(InstallStage::LocationValidated.to_string(), "location-validated");
    }

    #[tokio::test]
    async fn test_validate_location_uses_probe() {
        let fx = Fixture::new();
        let probe = Arc::new(StaticProbe::available());
        let fetcher = Arc::new(FakeFetcher::new(RuntimeLayout::Modular));
        let installer = Installer::new(fx.config(), probe.clone(), fetcher);

        let version = installer.resolve_version(fx.app.path()).unwrap();
        let url = installer.validate_location(&version).await.unwrap();

        assert_eq!(url, "http://mirror.local/jdk/test-stack/openjdk1.8.0_191.tar.gz");
        assert_eq!(probe.probed(), vec![url]);
    }

    #[tokio::test]
    async fn test_install_records_metadata() {
        let fx = Fixture::new();
        let installer = Installer::new(
            fx.config(),
            Arc::new(StaticProbe::available()),
            Arc::new(FakeFetcher::new(RuntimeLayout::Legacy)),
        );

        let installed = installer.install(fx.app.path(), &fx.layer()).await.unwrap();

        assert_eq!(installed.home, fx.layer().root());
        assert_eq!(installed_runtime(&fx.layer()).unwrap(), installed);
    }

    #[tokio::test]
    async fn test_unavailable_archive_stops_before_fetch() {
        let fx = Fixture::new();
        let fetcher = Arc::new(FakeFetcher::new(RuntimeLayout::Legacy));
        let installer = Installer::new(
            fx.config(),
            Arc::new(StaticProbe::new(ProbeOutcome::Unavailable(404))),
            fetcher.clone(),
        );

        let err = installer.install(fx.app.path(), &fx.layer()).await.unwrap_err();

        assert_eq!(err.stage(), InstallStage::VersionResolved);
        assert!(fetcher.calls().is_empty());
        assert!(!fx.layer().metadata_path().exists());
    }
}
