//! In-process fakes for the probe and fetcher capabilities (testing only)
//!
//! `StaticProbe` answers every URL with one outcome and `FakeFetcher`
//! lays down a minimal JDK tree instead of downloading anything.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::fetcher::RuntimeFetcher;
use crate::locator::{ArchiveProbe, ProbeOutcome};

// ---------------------------------------------------------------------------
// StaticProbe
// ---------------------------------------------------------------------------

/// Probe returning a fixed outcome and recording probed URLs.
#[derive(Debug)]
pub struct StaticProbe {
    outcome: ProbeOutcome,
    probed: Mutex<Vec<String>>,
}

impl StaticProbe {
    pub fn new(outcome: ProbeOutcome) -> Self {
        StaticProbe {
            outcome,
            probed: Mutex::new(Vec::new()),
        }
    }

    /// Probe that finds every archive.
    pub fn available() -> Self {
        Self::new(ProbeOutcome::Available(200))
    }

    /// URLs probed so far, in order.
    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveProbe for StaticProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        self.probed.lock().unwrap().push(url.to_string());
        self.outcome.clone()
    }
}

// ---------------------------------------------------------------------------
// FakeFetcher
// ---------------------------------------------------------------------------

/// Directory layout of the fake JDK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeLayout {
    /// JDK 8 and older: trust store under `jre/lib/security`
    Legacy,
    /// JDK 9 and newer: trust store under `lib/security`
    Modular,
}

impl RuntimeLayout {
    pub fn trust_store(&self) -> &'static str {
        match self {
            RuntimeLayout::Legacy => "jre/lib/security/cacerts",
            RuntimeLayout::Modular => "lib/security/cacerts",
        }
    }
}

/// Fetcher writing `bin/java` and a bundled `cacerts` into the destination.
#[derive(Debug)]
pub struct FakeFetcher {
    layout: RuntimeLayout,
    fail_with: Option<i32>,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeFetcher {
    pub fn new(layout: RuntimeLayout) -> Self {
        FakeFetcher {
            layout,
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fetcher that exits with `code` without touching the destination.
    pub fn failing(code: i32) -> Self {
        FakeFetcher {
            layout: RuntimeLayout::Modular,
            fail_with: Some(code),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(url, destination)` pairs fetched so far.
    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RuntimeFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), dest.to_path_buf()));

        if let Some(code) = self.fail_with {
            return Err(FetchError::Failed {
                program: PathBuf::from("fake-fetcher"),
                url: url.to_string(),
                code: Some(code),
            });
        }

        let write = |rel: &str, contents: &str| -> std::io::Result<()> {
            let path = dest.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            // replace links left by a previous install, as untar would
            if path.symlink_metadata().is_ok() {
                std::fs::remove_file(&path)?;
            }
            std::fs::write(path, contents)
        };

        write("bin/java", "#!/bin/sh\n")
            .and_then(|()| write(self.layout.trust_store(), "bundled certs"))
            .and_then(|()| write("release", &format!("SOURCE=\"{url}\"\n")))
            .map_err(|source| FetchError::Destination {
                path: dest.to_path_buf(),
                source,
            })
    }
}
