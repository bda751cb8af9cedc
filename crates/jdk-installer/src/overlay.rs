//! Application-supplied JDK overlay
//!
//! Files under `<app>/.jdk-overlay/` are copied onto the installed JDK,
//! replacing files at the same relative path (custom `cacerts`, security
//! policy files and the like).

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::PostInstallError;

/// Overlay directory name in the application root.
pub const JDK_OVERLAY_DIR: &str = ".jdk-overlay";

/// Copy `<app_dir>/.jdk-overlay` onto `jdk_home`.
///
/// Returns the number of files copied; zero when there is no overlay.
/// A destination that is a symlink is removed first, so the overlay never
/// writes through a link into a file outside the JDK. Symlinks inside the
/// overlay itself are skipped, not followed.
pub fn apply_overlay(app_dir: &Path, jdk_home: &Path) -> Result<usize, PostInstallError> {
    let overlay = app_dir.join(JDK_OVERLAY_DIR);
    if !overlay.is_dir() {
        debug!("no {} in {:?}", JDK_OVERLAY_DIR, app_dir);
        return Ok(0);
    }

    let files = collect_files(&overlay).map_err(|source| PostInstallError::Overlay {
        path: overlay.clone(),
        source,
    })?;

    for src in &files {
        let relative = src.strip_prefix(&overlay).unwrap_or(src);
        let dest = jdk_home.join(relative);
        copy_replacing(src, &dest).map_err(|source| PostInstallError::Overlay {
            path: dest.clone(),
            source,
        })?;
    }

    info!("Applied {} file(s) from {}", files.len(), JDK_OVERLAY_DIR);
    Ok(files.len())
}

fn copy_replacing(src: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if dest.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()) {
        std::fs::remove_file(dest)?;
    }
    std::fs::copy(src, dest)?;
    Ok(())
}

/// Regular files below `dir`, sorted.
fn collect_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files_recursive(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            warn!("skipping symlink {:?} in {}", path, JDK_OVERLAY_DIR);
        } else if file_type.is_dir() {
            collect_files_recursive(&path, files)?;
        } else if file_type.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_no_overlay_is_noop() {
        let app = tempdir().unwrap();
        let home = tempdir().unwrap();
        assert_eq!(apply_overlay(app.path(), home.path()).unwrap(), 0);
        assert!(std::fs::read_dir(home.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_copies_nested_files() {
        let app = tempdir().unwrap();
        let home = tempdir().unwrap();
        let overlay = app.path().join(JDK_OVERLAY_DIR);
        std::fs::create_dir_all(overlay.join("jre/lib/security")).unwrap();
        std::fs::write(overlay.join("test.txt"), "hello").unwrap();
        std::fs::write(overlay.join("jre/lib/security/java.policy"), "grant {};").unwrap();

        let copied = apply_overlay(app.path(), home.path()).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(std::fs::read_to_string(home.path().join("test.txt")).unwrap(), "hello");
        assert_eq!(
            std::fs::read_to_string(home.path().join("jre/lib/security/java.policy")).unwrap(),
            "grant {};"
        );
    }

    #[test]
    fn test_overwrites_existing_file() {
        let app = tempdir().unwrap();
        let home = tempdir().unwrap();
        std::fs::create_dir_all(app.path().join(JDK_OVERLAY_DIR).join("bin")).unwrap();
        std::fs::write(app.path().join(JDK_OVERLAY_DIR).join("bin/tool"), "new").unwrap();
        std::fs::create_dir_all(home.path().join("bin")).unwrap();
        std::fs::write(home.path().join("bin/tool"), "old").unwrap();

        apply_overlay(app.path(), home.path()).unwrap();

        assert_eq!(std::fs::read_to_string(home.path().join("bin/tool")).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_replaces_symlink_instead_of_writing_through() {
        let app = tempdir().unwrap();
        let home = tempdir().unwrap();
        let sys = tempdir().unwrap();
        let system_store = sys.path().join("cacerts");
        std::fs::write(&system_store, "system").unwrap();

        let cacerts = home.path().join("lib/security/cacerts");
        std::fs::create_dir_all(cacerts.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(&system_store, &cacerts).unwrap();

        let overlay_cacerts = app.path().join(JDK_OVERLAY_DIR).join("lib/security/cacerts");
        std::fs::create_dir_all(overlay_cacerts.parent().unwrap()).unwrap();
        std::fs::write(&overlay_cacerts, "custom").unwrap();

        apply_overlay(app.path(), home.path()).unwrap();

        assert!(std::fs::read_link(&cacerts).is_err());
        assert_eq!(std::fs::read_to_string(&cacerts).unwrap(), "custom");
        assert_eq!(std::fs::read_to_string(&system_store).unwrap(), "system");
    }

    #[cfg(unix)]
    #[test]
    fn test_overlay_symlinks_are_skipped() {
        let app = tempdir().unwrap();
        let home = tempdir().unwrap();
        let overlay = app.path().join(JDK_OVERLAY_DIR);
        std::fs::create_dir_all(overlay.join("conf")).unwrap();
        std::fs::write(overlay.join("conf/net.properties"), "x=1").unwrap();
        std::os::unix::fs::symlink(&overlay, overlay.join("conf/loop")).unwrap();
        std::os::unix::fs::symlink(overlay.join("conf/net.properties"), overlay.join("alias"))
            .unwrap();

        let copied = apply_overlay(app.path(), home.path()).unwrap();

        assert_eq!(copied, 1);
        assert!(home.path().join("conf/net.properties").is_file());
        assert!(home.path().join("conf/loop").symlink_metadata().is_err());
        assert!(home.path().join("alias").symlink_metadata().is_err());
    }
}
