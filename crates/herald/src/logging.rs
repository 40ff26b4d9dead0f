//! Logging system setup and configuration
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` overrides the level
//! taken from the configuration file and command line.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;

/// Builds the level filter, preferring `RUST_LOG` when it is set.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the logging system
///
/// Human readable output by default, structured JSON when
/// `settings.json_format` is set.
///
/// # Arguments
///
/// * `settings` - Logging settings with command line overrides already applied
///
/// # Returns
///
/// An error if a global subscriber is already installed.
pub fn setup_logging(settings: &LoggingSettings) -> Result<()> {
    let filter = build_filter(&settings.level);
    let registry = tracing_subscriber::registry().with(filter);

    let result = if settings.json_format {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    result.map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}
