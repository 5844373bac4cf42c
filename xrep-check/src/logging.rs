//! Tracing setup for the checker binary
//!
//! The subscriber is installed before the config file is read so that the
//! config loader's own log lines are kept. It starts at `info` (or
//! `RUST_LOG`); the configured level is applied afterwards through a reload
//! handle unless `RUST_LOG` was set.

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Level used until the config file has been read
pub const STARTUP_LEVEL: &str = "info";

/// Handle for replacing the active filter
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Where the active filter came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    /// `RUST_LOG` was set and wins over the config file
    Environment,
    /// The startup level, waiting for the config file
    Startup,
}

/// Filter to install at startup
pub fn startup_filter() -> (EnvFilter, FilterSource) {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, FilterSource::Environment),
        Err(_) => (EnvFilter::new(STARTUP_LEVEL), FilterSource::Startup),
    }
}

/// Install the global subscriber; logs go to stderr so stdout carries only
/// the report.
pub fn init_tracing() -> (FilterHandle, FilterSource) {
    let (filter, source) = startup_filter();
    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    (handle, source)
}

/// Switch to the configured level. Returns `false` (and changes nothing)
/// when `RUST_LOG` is in charge.
///
/// # Errors
///
/// Fails when `level` is not a valid filter directive or the subscriber
/// behind `handle` is gone.
pub fn apply_config_level(
    handle: &FilterHandle,
    source: FilterSource,
    level: &str,
) -> anyhow::Result<bool> {
    if source == FilterSource::Environment {
        return Ok(false);
    }
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log level in config: {:?}", level))?;
    handle
        .reload(filter)
        .context("Cannot apply configured log level")?;
    Ok(true)
}
