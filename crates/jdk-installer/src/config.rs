//! Installer configuration
//!
//! Environment overrides (`STACK`, `DEFAULT_JDK_BASE_URL`) plus the
//! buildpack-relative paths of the fetcher and profile templates.

use std::path::{Path, PathBuf};

use crate::certs::SYSTEM_TRUST_STORE;
use crate::fetcher::JDK_FETCHER;
use crate::locator::DEFAULT_JDK_BASE_URL;
use crate::version::DefaultVersions;

/// Environment variable naming the target image family.
pub const STACK_ENV: &str = "STACK";

/// Environment variable overriding the archive base URL.
pub const BASE_URL_ENV: &str = "DEFAULT_JDK_BASE_URL";

/// Everything the installer needs besides the application and layer.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Target image family; required to locate an archive
    pub stack: Option<String>,
    /// Archive base URL
    pub base_url: String,
    /// Buildpack root holding `bin/` and `profile.d/`
    pub buildpack_dir: PathBuf,
    /// External fetcher program
    pub fetcher: PathBuf,
    /// System-managed trust store to link against
    pub system_trust_store: PathBuf,
    /// Generation to default-tag table
    pub defaults: DefaultVersions,
}

impl InstallerConfig {
    /// Config with built-in defaults and no stack.
    pub fn new(buildpack_dir: impl Into<PathBuf>) -> Self {
        let buildpack_dir = buildpack_dir.into();
        InstallerConfig {
            stack: None,
            base_url: DEFAULT_JDK_BASE_URL.to_string(),
            fetcher: buildpack_dir.join("bin").join(JDK_FETCHER),
            buildpack_dir,
            system_trust_store: PathBuf::from(SYSTEM_TRUST_STORE),
            defaults: DefaultVersions::default(),
        }
    }

    /// Config from the process environment.
    pub fn from_env(buildpack_dir: impl Into<PathBuf>) -> Self {
        Self::from_lookup(buildpack_dir, |key| std::env::var(key).ok())
    }

    /// Config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(buildpack_dir: impl Into<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut config = Self::new(buildpack_dir);
        config.stack = var(STACK_ENV);
        if let Some(base_url) = var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        config
    }

    pub fn with_stack(mut self, stack: &str) -> Self {
        self.stack = Some(stack.to_string());
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_fetcher(mut self, fetcher: impl Into<PathBuf>) -> Self {
        self.fetcher = fetcher.into();
        self
    }

    pub fn with_system_trust_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.system_trust_store = path.into();
        self
    }

    pub fn with_defaults(mut self, defaults: DefaultVersions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Directory holding the profile.d templates.
    pub fn profile_templates_dir(&self) -> PathBuf {
        self.buildpack_dir.join(crate::layer::PROFILE_DIR)
    }

    pub fn buildpack_dir(&self) -> &Path {
        &self.buildpack_dir
    }
}
