//! Configuration types for the MQTT message logger.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Main configuration, as read from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageLogConfig {
    /// Log every available field instead of the short form
    pub verbose: bool,
    /// Include PUBLISH and will payloads
    pub payload: bool,
    /// Replace CONNECT passwords with `<redacted>`
    pub redact_password: bool,
    /// Line format
    pub format: OutputFormat,
    /// Per-event switches
    pub events: EventToggles,
    /// Where formatted lines go
    pub outputs: Vec<OutputConfig>,
}

impl Default for MessageLogConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            payload: true,
            redact_password: false,
            format: OutputFormat::Plain,
            events: EventToggles::default(),
            outputs: vec![OutputConfig::Tracing],
        }
    }
}

impl MessageLogConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a configuration file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Like [`read`](Self::read), but never fails: a missing, unreadable or
    /// invalid file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded configuration");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not load configuration, using defaults");
                Self::default()
            }
        }
    }

    /// The immutable settings handed to the formatters.
    pub fn formatter_config(&self) -> FormatterConfig {
        FormatterConfig {
            verbose: self.verbose,
            include_payload: self.payload,
            redact_password: self.redact_password,
            format: self.format,
        }
    }
}

/// Settings every formatter reads. Built once and shared read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatterConfig {
    pub verbose: bool,
    pub include_payload: bool,
    pub redact_password: bool,
    pub format: OutputFormat,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        MessageLogConfig::default().formatter_config()
    }
}

/// Supported line formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable single line
    #[default]
    Plain,
    /// Single-line JSON object
    Json,
}

/// Which protocol events get logged. Everything is on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EventToggles {
    pub client_connect: bool,
    /// Covers DISCONNECT packets and lifecycle disconnects
    pub client_disconnect: bool,
    pub connack_send: bool,
    pub publish_received: bool,
    pub publish_send: bool,
    pub subscribe_received: bool,
    pub suback_send: bool,
    pub unsubscribe_received: bool,
    pub unsuback_send: bool,
    pub ping_request_received: bool,
    pub ping_response_send: bool,
    pub puback_received: bool,
    pub puback_send: bool,
    pub pubrec_received: bool,
    pub pubrec_send: bool,
    pub pubrel_received: bool,
    pub pubrel_send: bool,
    pub pubcomp_received: bool,
    pub pubcomp_send: bool,
}

impl Default for EventToggles {
    fn default() -> Self {
        Self::all(true)
    }
}

impl EventToggles {
    pub fn all(enabled: bool) -> Self {
        Self {
            client_connect: enabled,
            client_disconnect: enabled,
            connack_send: enabled,
            publish_received: enabled,
            publish_send: enabled,
            subscribe_received: enabled,
            suback_send: enabled,
            unsubscribe_received: enabled,
            unsuback_send: enabled,
            ping_request_received: enabled,
            ping_response_send: enabled,
            puback_received: enabled,
            puback_send: enabled,
            pubrec_received: enabled,
            pubrec_send: enabled,
            pubrel_received: enabled,
            pubrel_send: enabled,
            pubcomp_received: enabled,
            pubcomp_send: enabled,
        }
    }
}

/// Output destination configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    /// Emit through `tracing` at INFO
    Tracing,
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Write to file
    File {
        path: PathBuf,
        /// Rotate files by size (bytes)
        #[serde(default)]
        max_size: Option<u64>,
        /// Maximum number of rotated files to keep
        #[serde(default)]
        max_files: Option<u32>,
    },
}
