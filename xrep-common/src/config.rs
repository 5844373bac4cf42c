//! Bootstrap configuration for front ends of the report engine
//!
//! Settings sources, highest priority first:
//! 1. Explicit path (command-line `--config`)
//! 2. `XREP_CONFIG` environment variable
//! 3. Platform config file (`<config dir>/xrep/config.toml`)
//! 4. Built-in defaults
//!
//! A config file that is missing from an implicit location is not an error;
//! the defaults are used and a warning is logged. An explicitly named file
//! must exist and parse.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "XREP_CONFIG";

/// Configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct TomlConfig {
    /// Echo stage progress messages to stdout as they are recorded
    #[serde(default)]
    pub console_output: bool,

    /// Also print the developer view (all messages, all types)
    #[serde(default)]
    pub developer_messages: bool,

    /// Print user messages even when there are no errors or warnings
    #[serde(default)]
    pub verbose: bool,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a config file.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the file cannot be read,
    /// [`Error::TomlParse`] if it is not valid TOML for this schema.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration following the priority order above.
    ///
    /// # Errors
    ///
    /// Fails only when an explicitly requested file (argument or
    /// environment variable) is unreadable or malformed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config from {}", path.display());
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            info!("Loading config from {} ({})", path, CONFIG_ENV_VAR);
            return Self::from_file(Path::new(&path));
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            Some(path) => {
                warn!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Platform location of the config file (not checked for existence)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("xrep").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert!(!config.console_output);
        assert!(!config.developer_messages);
        assert!(!config.verbose);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str("console_output = true\n").unwrap();
        assert!(config.console_output);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_logging_section() {
        let config: TomlConfig = toml::from_str("[logging]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_default_path_ends_with_app_dir() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("xrep/config.toml"));
        }
    }
}
