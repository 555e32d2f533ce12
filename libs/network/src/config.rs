//! Configuration for the coordinator handle and the publish exchange
//!
//! Loadable from TOML:
//!
//! ```toml
//! request_timeout_ms = 5000
//! mailbox_capacity = 64
//! default_bind = "127.0.0.1"
//! reuse_addr = true
//! ```
//!
//! Every field is optional in TOML; missing fields take their defaults.

use crate::error::{Result, TransportError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Network coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Bound on waiting for a coordinator reply; `None` waits indefinitely
    pub request_timeout_ms: Option<u64>,

    /// Capacity of the coordinator mailbox
    pub mailbox_capacity: usize,

    /// Interface used when a publish request names none
    pub default_bind: Option<String>,

    /// Default `SO_REUSEADDR` flag for publish requests
    pub reuse_addr: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: Some(5_000),
            mailbox_capacity: 64,
            default_bind: None,
            reuse_addr: false,
        }
    }
}

impl NetworkConfig {
    /// Configuration that waits for the coordinator without a bound
    pub fn unbounded() -> Self {
        Self {
            request_timeout_ms: None,
            ..Self::default()
        }
    }

    /// Reply timeout as a `Duration`, if bounded
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Parse from TOML text and validate
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            TransportError::configuration(format!("Failed to parse TOML: {}", e), None)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TransportError::io(format!("Failed to read {}", path.display()), e)
        })?;
        Self::from_toml(&content)
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            TransportError::configuration(format!("Failed to serialize to TOML: {}", e), None)
        })
    }

    /// Validate field ranges
    pub fn validate(&self) -> Result<()> {
        if self.mailbox_capacity == 0 {
            return Err(TransportError::configuration(
                "Mailbox capacity must be greater than 0",
                Some("mailbox_capacity"),
            ));
        }

        if self.request_timeout_ms == Some(0) {
            return Err(TransportError::configuration(
                "Request timeout must be greater than 0 (omit it to wait indefinitely)",
                Some("request_timeout_ms"),
            ));
        }

        if let Some(bind) = &self.default_bind {
            if bind.trim().is_empty() {
                return Err(TransportError::configuration(
                    "Default bind address cannot be blank",
                    Some("default_bind"),
                ));
            }
        }

        Ok(())
    }
}
