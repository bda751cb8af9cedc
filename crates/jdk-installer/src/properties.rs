//! Project configuration: `system.properties`
//!
//! Only one key matters to the installer, `java.runtime.version`.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::ConfigurationError;
use crate::version::{DefaultVersions, Version};

/// Name of the project configuration file in the application root.
pub const SYSTEM_PROPERTIES_FILE: &str = "system.properties";

/// Key holding the declared runtime version.
pub const RUNTIME_VERSION_KEY: &str = "java.runtime.version";

/// Parse Java `.properties` text into a key/value map.
///
/// Handles `=`, `:` and whitespace separators, `#`/`!` comment lines and
/// backslash line continuations. Later keys replace earlier ones.
pub fn parse_properties(content: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();
    let mut logical = String::new();

    for raw in content.lines() {
        let line = raw.trim_start();
        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        // an odd number of trailing backslashes continues the line
        let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 1 {
            logical.push_str(&line[..line.len() - 1]);
            continue;
        }
        logical.push_str(line);

        if let Some((key, value)) = split_entry(&logical) {
            props.insert(key, value);
        }
        logical.clear();
    }

    if let Some((key, value)) = split_entry(&logical) {
        props.insert(key, value);
    }

    props
}

fn split_entry(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let split_at = line.find(|c: char| c == '=' || c == ':' || c.is_whitespace());
    let (key, value) = match split_at {
        Some(idx) => {
            let rest = line[idx..].trim_start();
            let rest = rest
                .strip_prefix('=')
                .or_else(|| rest.strip_prefix(':'))
                .unwrap_or(rest);
            (&line[..idx], rest.trim())
        }
        None => (line, ""),
    };
    Some((key.to_string(), value.to_string()))
}

/// Determine the JDK version an application asks for.
///
/// A missing `system.properties`, or one without `java.runtime.version`,
/// yields the table's default version. A file that exists but cannot be
/// read, or declares an unparseable version, is an error.
pub fn detect_version(
    app_dir: &Path,
    defaults: &DefaultVersions,
) -> Result<Version, ConfigurationError> {
    let path = app_dir.join(SYSTEM_PROPERTIES_FILE);
    if !path.exists() {
        debug!("no {} in {:?}, using default", SYSTEM_PROPERTIES_FILE, app_dir);
        return Ok(defaults.default_version());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| {
        ConfigurationError::ReadProperties {
            path: path.clone(),
            source,
        }
    })?;

    match parse_properties(&content).get(RUNTIME_VERSION_KEY) {
        Some(declared) => {
            info!("{} declares {}={}", SYSTEM_PROPERTIES_FILE, RUNTIME_VERSION_KEY, declared);
            defaults
                .parse(declared)
                .map_err(|_| ConfigurationError::InvalidDeclaredVersion {
                    value: declared.clone(),
                    path,
                })
        }
        None => {
            debug!("{} has no {}, using default", SYSTEM_PROPERTIES_FILE, RUNTIME_VERSION_KEY);
            Ok(defaults.default_version())
        }
    }
}
