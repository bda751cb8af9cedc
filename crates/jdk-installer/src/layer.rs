//! Launch layers
//!
//! A layer is a directory under the launch root, with its metadata kept
//! beside it as `<launch>/<name>.toml`. Later build stages find the
//! installed JDK through that metadata.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{PersistError, PostInstallError};

/// Directory inside a layer holding environment bootstrap scripts.
pub const PROFILE_DIR: &str = "profile.d";

/// Root of the launch layers for this build
#[derive(Debug, Clone)]
pub struct Launch {
    root: PathBuf,
}

impl Launch {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Launch { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handle for the layer called `name`. Nothing is created on disk.
    pub fn layer(&self, name: &str) -> Layer {
        Layer {
            name: name.to_string(),
            root: self.root.join(name),
            metadata: self.root.join(format!("{name}.toml")),
        }
    }
}

/// A single launch layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    name: String,
    root: PathBuf,
    metadata: PathBuf,
}

impl Layer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata
    }

    /// Write `metadata` as TOML, replacing any previous record.
    pub fn write_metadata<T: Serialize>(&self, metadata: &T) -> Result<(), PersistError> {
        let encoded = toml::to_string(metadata)?;
        if let Some(parent) = self.metadata.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PersistError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.metadata, encoded).map_err(|source| PersistError::Io {
            path: self.metadata.clone(),
            source,
        })?;
        debug!("wrote layer metadata {:?}", self.metadata);
        Ok(())
    }

    /// Read the record written by [`write_metadata`](Self::write_metadata).
    pub fn read_metadata<T: DeserializeOwned>(&self) -> Result<T, PersistError> {
        let content = std::fs::read_to_string(&self.metadata).map_err(|source| PersistError::Io {
            path: self.metadata.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| PersistError::Decode {
            path: self.metadata.clone(),
            source,
        })
    }

    /// Remove the metadata record, if any.
    pub fn remove_metadata(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.metadata) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Write `<layer>/profile.d/<file>`, replacing any existing script.
    pub fn write_profile(&self, file: &str, contents: &str) -> Result<PathBuf, PostInstallError> {
        let dir = self.root.join(PROFILE_DIR);
        let path = dir.join(file);
        std::fs::create_dir_all(&dir)
            .and_then(|()| std::fs::write(&path, contents))
            .map_err(|source| PostInstallError::ProfileWrite {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}
