//! JDK version resolution
//!
//! Turns the version string a project declares into a fully qualified
//! `(major, tag, vendor)` triple. The JVM ecosystem carries two naming
//! schemes: legacy `1.N` names up to 8 and flat `N.x` names from 9 on.
//! Both funnel into one [`Version`] through [`DefaultVersions::parse`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Generation installed when a project declares nothing.
pub const DEFAULT_JDK_MAJOR_VERSION: u32 = 8;

/// Distributor prefix of the archive names.
pub const DEFAULT_VENDOR: &str = "openjdk";

/// First generation using flat `N.x` numbering.
pub const FLAT_NUMBERING_FROM: u32 = 10;

static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)$").expect("valid bare number pattern"));
static FLAT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.").expect("valid flat prefix pattern"));
static LEGACY_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1\.(\d)$").expect("valid legacy pattern"));
static BARE_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d)$").expect("valid bare digit pattern"));
static LEGACY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1\.(\d)(?:\D|$)").expect("valid legacy prefix pattern"));

/// A resolved JDK version.
///
/// The tag always encodes the same generation as `major`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVersion")]
pub struct Version {
    major: u32,
    tag: String,
    vendor: String,
}

/// Unchecked wire form of [`Version`]; decoding goes through [`Version::new`].
#[derive(Deserialize)]
struct RawVersion {
    major: u32,
    tag: String,
    vendor: String,
}

impl TryFrom<RawVersion> for Version {
    type Error = ConfigurationError;

    fn try_from(raw: RawVersion) -> Result<Self, Self::Error> {
        Version::new(raw.major, raw.tag, raw.vendor)
    }
}

impl Version {
    /// Build a version, rejecting empty tags and cross-generation tags.
    pub fn new(
        major: u32,
        tag: impl Into<String>,
        vendor: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let tag = tag.into();
        if tag.is_empty() || !encodes_generation(major, &tag) {
            return Err(ConfigurationError::UnparseableVersion { value: tag });
        }
        Ok(Version {
            major,
            tag,
            vendor: vendor.into(),
        })
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.vendor, self.tag)
    }
}

/// Whether `tag` is a release of generation `major`, either as `N...` or `1.N...`.
fn encodes_generation(major: u32, tag: &str) -> bool {
    let flat = major.to_string();
    let legacy = format!("1.{major}");
    [flat, legacy].iter().any(|prefix| {
        tag.strip_prefix(prefix.as_str())
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
    })
}

/// Generation to default-tag table, injected into the installer.
///
/// Supporting a new generation means adding an entry here, not a branch
/// in the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultVersions {
    default_major: u32,
    vendor: String,
    flat_from: u32,
    tags: BTreeMap<u32, String>,
}

impl DefaultVersions {
    /// Validate and build a table.
    ///
    /// The default generation must have an entry and every tag must encode
    /// its own generation, which keeps [`default_version`](Self::default_version)
    /// infallible.
    pub fn new(
        default_major: u32,
        vendor: impl Into<String>,
        flat_from: u32,
        tags: BTreeMap<u32, String>,
    ) -> Result<Self, ConfigurationError> {
        if !tags.contains_key(&default_major) {
            return Err(ConfigurationError::InvalidDefaults(format!(
                "no tag for default generation {default_major}"
            )));
        }
        if let Some((major, tag)) = tags
            .iter()
            .find(|(major, tag)| tag.is_empty() || !encodes_generation(**major, tag))
        {
            return Err(ConfigurationError::InvalidDefaults(format!(
                "tag {tag:?} is not a release of generation {major}"
            )));
        }
        Ok(DefaultVersions {
            default_major,
            vendor: vendor.into(),
            flat_from,
            tags,
        })
    }

    pub fn default_major(&self) -> u32 {
        self.default_major
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Default tag of a generation, if supported.
    pub fn tag_for(&self, major: u32) -> Option<&str> {
        self.tags.get(&major).map(String::as_str)
    }

    /// The version installed when a project declares none.
    pub fn default_version(&self) -> Version {
        Version {
            major: self.default_major,
            tag: self.tags[&self.default_major].clone(),
            vendor: self.vendor.clone(),
        }
    }

    fn is_flat(&self, major: u32) -> bool {
        major >= self.flat_from && self.tags.contains_key(&major)
    }

    fn is_legacy(&self, major: u32) -> bool {
        major < self.flat_from && self.tags.contains_key(&major)
    }

    /// Generation captured by `re`, written without leading zeros.
    fn captured_major(re: &Regex, candidate: &str) -> Option<u32> {
        let digits = re.captures(candidate)?.get(1)?.as_str();
        digits
            .parse::<u32>()
            .ok()
            .filter(|major| major.to_string() == digits)
    }

    fn default_for(&self, major: u32) -> Version {
        Version {
            major,
            tag: self.tags[&major].clone(),
            vendor: self.vendor.clone(),
        }
    }

    fn verbatim(&self, major: u32, candidate: &str) -> Result<Version, ConfigurationError> {
        Version::new(major, candidate, self.vendor.clone())
    }

    /// Resolve a declared version string.
    ///
    /// Rules are tried in order, first match wins:
    /// 1. bare flat generation (`"11"`) resolves to that generation's default tag
    /// 2. flat dotted tag (`"11.0.1"`) is taken verbatim
    /// 3. bare legacy name (`"1.8"`) resolves to the default tag
    /// 4. bare legacy digit (`"8"`) resolves to the default tag
    /// 5. legacy tag with qualifiers (`"1.8.0_181"`) is taken verbatim
    pub fn parse(&self, candidate: &str) -> Result<Version, ConfigurationError> {
        if let Some(major) = Self::captured_major(&BARE_NUMBER, candidate) {
            if self.is_flat(major) {
                return Ok(self.default_for(major));
            }
        }

        if let Some(major) = Self::captured_major(&FLAT_PREFIX, candidate) {
            if self.is_flat(major) {
                return self.verbatim(major, candidate);
            }
        }

        if let Some(major) = Self::captured_major(&LEGACY_EXACT, candidate) {
            if self.is_legacy(major) {
                return Ok(self.default_for(major));
            }
        }

        if let Some(major) = Self::captured_major(&BARE_DIGIT, candidate) {
            if self.is_legacy(major) {
                return Ok(self.default_for(major));
            }
        }

        if let Some(major) = Self::captured_major(&LEGACY_PREFIX, candidate) {
            if self.is_legacy(major) {
                return self.verbatim(major, candidate);
            }
        }

        Err(ConfigurationError::UnparseableVersion {
            value: candidate.to_string(),
        })
    }
}

impl Default for DefaultVersions {
    fn default() -> Self {
        let tags = [
            (7, "1.7.0_191"),
            (8, "1.8.0_191"),
            (9, "9.0.4"),
            (10, "10.0.2"),
            (11, "11.0.1"),
        ]
        .into_iter()
        .map(|(major, tag)| (major, tag.to_string()))
        .collect();

        DefaultVersions {
            default_major: DEFAULT_JDK_MAJOR_VERSION,
            vendor: DEFAULT_VENDOR.to_string(),
            flat_from: FLAT_NUMBERING_FROM,
            tags,
        }
    }
}
