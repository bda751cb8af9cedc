//! Tracing setup for buildpack binaries.
//!
//! Build output is read by people watching a deploy, so plain mode prints
//! bare messages; levels and fields appear only once `level` is DEBUG or
//! finer. JSON lines are available for CI log collectors.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events are shown at the requested level. Everything else
/// (HTTP client internals) stays at WARN unless `RUST_LOG` says otherwise.
const BUILDPACK_TARGETS: [&str; 2] = ["jdk_installer", "jvm_buildpack"];

/// Default filter directive for `level`.
fn default_directive(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directive = String::from("warn");
    for target in BUILDPACK_TARGETS {
        directive.push_str(&format!(",{target}={level}"));
    }
    directive
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level` when set. Only the first call in a process
/// takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));
    let verbose = level >= Level::DEBUG;

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
            .ok();
    } else {
        registry
            .with(
                fmt::layer()
                    .without_time()
                    .with_target(verbose)
                    .with_level(verbose)
                    .compact(),
            )
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_scopes_buildpack_crates() {
        assert_eq!(
            default_directive(Level::DEBUG),
            "warn,jdk_installer=debug,jvm_buildpack=debug"
        );
        assert!(EnvFilter::try_new(default_directive(Level::INFO)).is_ok());
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
        tracing::info!("still logging");
    }
}
