//! Wire configuration.
//!
//! `WireConfig` holds the few knobs the codec layer has: the maximum size of
//! a single inbound message and the protocol version new handshakes
//! advertise. It can be built programmatically, from environment variables,
//! or from a TOML file.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::logging::targets;

/// Protocol revision advertised by default.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Default inbound message limit (10MB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Codec-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WireConfig {
    /// Largest accepted inbound message in bytes.
    pub max_message_size: usize,
    /// Protocol version used by initialize requests and results.
    pub protocol_version: String,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_owned(),
        }
    }
}

impl WireConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables
    ///
    /// | Variable | Values | Description |
    /// |----------|--------|-------------|
    /// | `MCPWIRE_MAX_MESSAGE_SIZE` | bytes | Inbound message limit |
    /// | `MCPWIRE_PROTOCOL_VERSION` | string | Advertised protocol version |
    ///
    /// Unparseable or empty values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`WireConfig::from_env`], reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("MCPWIRE_MAX_MESSAGE_SIZE") {
            match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => config.max_message_size = size,
                _ => log::warn!(
                    target: targets::CONFIG,
                    "ignoring MCPWIRE_MAX_MESSAGE_SIZE={raw:?}: expected a positive integer"
                ),
            }
        }

        if let Some(version) = lookup("MCPWIRE_PROTOCOL_VERSION") {
            let version = version.trim();
            if version.is_empty() {
                log::warn!(target: targets::CONFIG, "ignoring empty MCPWIRE_PROTOCOL_VERSION");
            } else {
                config.protocol_version = version.to_owned();
            }
        }

        config
    }

    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        log::debug!(target: targets::CONFIG, "loaded wire config from {}", path.display());
        Ok(config)
    }

    /// Checks the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_size == 0 {
            return Err(ConfigError::Invalid(
                "max_message_size must be positive".to_owned(),
            ));
        }
        if self.protocol_version.is_empty() {
            return Err(ConfigError::Invalid(
                "protocol_version must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Sets the maximum message size.
    #[must_use]
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Sets the protocol version.
    #[must_use]
    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The TOML was malformed or had unknown keys.
    Parse(toml::de::Error),
    /// A value was out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "invalid config: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}
