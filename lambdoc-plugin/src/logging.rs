//! Diagnostics output
//!
//! The plugin logs through `tracing`. When the host has not installed a
//! subscriber of its own, `init` installs one writing to stderr.

use std::str::FromStr;
use tracing::Level;

/// Environment variable selecting the log level
pub const LOG_ENV: &str = "LAMBDOC_LOG";

/// Level used when `LAMBDOC_LOG` is unset or not a level name
pub const DEFAULT_LEVEL: Level = Level::WARN;

/// Parse a level name such as `debug` or `WARN`
pub fn parse_level(value: Option<&str>) -> Level {
    value
        .and_then(|v| Level::from_str(v.trim()).ok())
        .unwrap_or(DEFAULT_LEVEL)
}

/// Install a stderr subscriber at the `LAMBDOC_LOG` level.
///
/// Returns `false` when a global subscriber was already set.
pub fn init() -> bool {
    let level = parse_level(std::env::var(LOG_ENV).ok().as_deref());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}
