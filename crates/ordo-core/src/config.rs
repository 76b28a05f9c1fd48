//! Engine configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! max_order = 1000000
//! compact_on_release = false
//! conflict_retries = 2
//! busy_timeout_ms = 5000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{OrdoError, Result};

/// Ceiling for any stored position
pub const DEFAULT_MAX_ORDER: u32 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Highest position a record may hold
    pub max_order: u32,

    /// Reindex the parent in the same transaction that releases a record.
    /// Off by default: releasing leaves a gap that only `reindex` closes.
    pub compact_on_release: bool,

    /// How many times a `SiblingConflict` re-runs the whole operation
    pub conflict_retries: u32,

    /// How long a SQLite connection waits for another writer's lock
    pub busy_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_order: DEFAULT_MAX_ORDER,
            compact_on_release: false,
            conflict_retries: 2,
            busy_timeout_ms: 5_000,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// `Config` if the document is malformed, has unknown keys, or fails [`validate`](Self::validate)
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(s).map_err(|e| OrdoError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// `Io` if the file cannot be read, otherwise as [`from_toml_str`](Self::from_toml_str)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    /// `Config` when `max_order` is zero (no position could ever be valid)
    pub fn validate(&self) -> Result<()> {
        if self.max_order == 0 {
            return Err(OrdoError::Config {
                message: "max_order must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
