//! Trust store linking
//!
//! When the image provides a system-managed Java trust store, the JDK's
//! bundled `cacerts` is replaced by a symlink to it so both see the same
//! certificate authorities.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::PostInstallError;

/// Trust store maintained by the image's ca-certificates package.
pub const SYSTEM_TRUST_STORE: &str = "/etc/ssl/certs/java/cacerts";

/// Bundled trust store locations, older nested layout first.
pub const BUNDLED_TRUST_STORES: [&str; 2] = ["jre/lib/security/cacerts", "lib/security/cacerts"];

/// Replaces a JDK's bundled trust store with a link to the system one.
#[derive(Debug, Clone)]
pub struct TrustStoreLinker {
    system_store: PathBuf,
}

impl Default for TrustStoreLinker {
    fn default() -> Self {
        Self::new(SYSTEM_TRUST_STORE)
    }
}

impl TrustStoreLinker {
    pub fn new(system_store: impl Into<PathBuf>) -> Self {
        TrustStoreLinker {
            system_store: system_store.into(),
        }
    }

    pub fn system_store(&self) -> &Path {
        &self.system_store
    }

    /// Link the first bundled trust store found under `jdk_home`.
    ///
    /// Returns the linked path, or `None` when there is no system store or
    /// no bundled store. A bundled path that already points at the system
    /// store is left untouched.
    pub fn link(&self, jdk_home: &Path) -> Result<Option<PathBuf>, PostInstallError> {
        if !self.system_store.exists() {
            debug!("no system trust store at {:?}", self.system_store);
            return Ok(None);
        }

        let Some(bundled) = BUNDLED_TRUST_STORES
            .iter()
            .map(|rel| jdk_home.join(rel))
            .find(|p| p.symlink_metadata().is_ok())
        else {
            debug!("no bundled trust store under {:?}", jdk_home);
            return Ok(None);
        };

        if std::fs::read_link(&bundled).is_ok_and(|target| target == self.system_store) {
            debug!("{:?} already linked", bundled);
            return Ok(Some(bundled));
        }

        self.replace_with_link(&bundled)
            .map_err(|source| PostInstallError::TrustStore {
                path: bundled.clone(),
                source,
            })?;

        info!("Linked {:?} -> {:?}", bundled, self.system_store);
        Ok(Some(bundled))
    }

    fn replace_with_link(&self, bundled: &Path) -> io::Result<()> {
        std::fs::remove_file(bundled)?;
        symlink_file(&self.system_store, bundled)
    }
}

#[cfg(unix)]
fn symlink_file(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink_file(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(original, link)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn system_store(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("etc/ssl/certs/java/cacerts");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"system certs").unwrap();
        path
    }

    fn bundled(home: &Path, rel: &str) -> PathBuf {
        let path = home.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"bundled certs").unwrap();
        path
    }

    #[test]
    fn test_links_legacy_layout() {
        let sys = tempdir().unwrap();
        let home = tempdir().unwrap();
        let store = system_store(&sys);
        let cacerts = bundled(home.path(), "jre/lib/security/cacerts");

        let linked = TrustStoreLinker::new(&store).link(home.path()).unwrap();

        assert_eq!(linked, Some(cacerts.clone()));
        assert_eq!(std::fs::read_link(&cacerts).unwrap(), store);
        assert_eq!(std::fs::read(&cacerts).unwrap(), b"system certs");
    }

    #[test]
    fn test_links_flat_layout() {
        let sys = tempdir().unwrap();
        let home = tempdir().unwrap();
        let store = system_store(&sys);
        let cacerts = bundled(home.path(), "lib/security/cacerts");

        let linked = TrustStoreLinker::new(&store).link(home.path()).unwrap();

        assert_eq!(linked, Some(cacerts.clone()));
        assert_eq!(std::fs::read_link(&cacerts).unwrap(), store);
    }

    #[test]
    fn test_only_first_match_is_linked() {
        let sys = tempdir().unwrap();
        let home = tempdir().unwrap();
        let store = system_store(&sys);
        let legacy = bundled(home.path(), "jre/lib/security/cacerts");
        let flat = bundled(home.path(), "lib/security/cacerts");

        TrustStoreLinker::new(&store).link(home.path()).unwrap();

        assert!(std::fs::read_link(&legacy).is_ok());
        assert!(std::fs::read_link(&flat).is_err());
        assert_eq!(std::fs::read(&flat).unwrap(), b"bundled certs");
    }

    #[test]
    fn test_noop_without_system_store() {
        let sys = tempdir().unwrap();
        let home = tempdir().unwrap();
        let legacy = bundled(home.path(), "jre/lib/security/cacerts");
        let flat = bundled(home.path(), "lib/security/cacerts");

        let linker = TrustStoreLinker::new(sys.path().join("missing/cacerts"));
        assert_eq!(linker.link(home.path()).unwrap(), None);

        for path in [legacy, flat] {
            assert!(std::fs::read_link(&path).is_err());
            assert_eq!(std::fs::read(&path).unwrap(), b"bundled certs");
        }
    }

    #[test]
    fn test_noop_without_bundled_store() {
        let sys = tempdir().unwrap();
        let home = tempdir().unwrap();
        let store = system_store(&sys);

        assert_eq!(TrustStoreLinker::new(&store).link(home.path()).unwrap(), None);
        assert!(std::fs::read_dir(home.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_relinking_is_idempotent() {
        let sys = tempdir().unwrap();
        let home = tempdir().unwrap();
        let store = system_store(&sys);
        let cacerts = bundled(home.path(), "lib/security/cacerts");
        let linker = TrustStoreLinker::new(&store);

        linker.link(home.path()).unwrap();
        let again = linker.link(home.path()).unwrap();

        assert_eq!(again, Some(cacerts.clone()));
        assert_eq!(std::fs::read_link(&cacerts).unwrap(), store);
    }

    #[test]
    fn test_dangling_link_is_replaced() {
        let sys = tempdir().unwrap();
        let home = tempdir().unwrap();
        let store = system_store(&sys);
        let cacerts = home.path().join("lib/security/cacerts");
        std::fs::create_dir_all(cacerts.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(home.path().join("gone"), &cacerts).unwrap();

        TrustStoreLinker::new(&store).link(home.path()).unwrap();

        assert_eq!(std::fs::read_link(&cacerts).unwrap(), store);
    }
}
