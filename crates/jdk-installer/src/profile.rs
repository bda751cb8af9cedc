//! Environment bootstrap scripts
//!
//! Copies the buildpack's `profile.d` templates into the JDK layer so the
//! launched process gets `JAVA_HOME`, JVM defaults and JDBC variables.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::PostInstallError;
use crate::layer::{Layer, PROFILE_DIR};

/// Templates copied verbatim into every JDK layer.
pub const PROFILE_TEMPLATES: [&str; 2] = ["jvm.sh", "jdbc.sh"];

/// Writes the bundled profile scripts into a layer.
#[derive(Debug, Clone)]
pub struct EnvironmentProvisioner {
    templates_dir: PathBuf,
}

impl EnvironmentProvisioner {
    /// Provisioner reading templates from `templates_dir`.
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        EnvironmentProvisioner {
            templates_dir: templates_dir.into(),
        }
    }

    /// Provisioner for the templates shipped at `<buildpack>/profile.d`.
    pub fn for_buildpack(buildpack_dir: &Path) -> Self {
        Self::new(buildpack_dir.join(PROFILE_DIR))
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Copy all templates into `layer`. Every template is read before any
    /// script is written.
    pub fn provision(&self, layer: &Layer) -> Result<Vec<PathBuf>, PostInstallError> {
        let templates = PROFILE_TEMPLATES
            .iter()
            .map(|name| {
                let path = self.templates_dir.join(name);
                std::fs::read_to_string(&path)
                    .map(|contents| (*name, contents))
                    .map_err(|source| PostInstallError::TemplateMissing { path, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut written = Vec::with_capacity(templates.len());
        for (name, contents) in templates {
            written.push(layer.write_profile(name, &contents)?);
        }

        info!("Installed profile scripts {:?}", PROFILE_TEMPLATES);
        Ok(written)
    }
}
