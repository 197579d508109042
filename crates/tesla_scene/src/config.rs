//! Codec limits
//!
//! Limits bound what a decoder will accept from untrusted input and what an
//! encoder will agree to write. They can be set in code, read from TOML, and
//! overridden from the environment:
//!
//! ```toml
//! max_depth = 64
//! max_string_len = 4096
//! max_file_size = 268435456
//! ```
//!
//! | Variable | Field |
//! |---|---|
//! | `TESM_MAX_DEPTH` | `max_depth` |
//! | `TESM_MAX_STRING_LEN` | `max_string_len` |
//! | `TESM_MAX_FILE_SIZE` | `max_file_size` |

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Ceiling for `max_depth`; decoding recurses once per nesting level
pub const MAX_DEPTH_LIMIT: u32 = 1024;

/// Codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Deepest node level accepted; the root is level 0. Values above
    /// [`MAX_DEPTH_LIMIT`] are treated as the limit.
    pub max_depth: u32,

    /// Longest attribute or material name in bytes
    pub max_string_len: u32,

    /// Largest file the load helpers will read
    pub max_file_size: u64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_string_len: 4096,
            max_file_size: 256 * 1024 * 1024,
        }
    }
}

impl CodecConfig {
    /// Tight limits for files from untrusted sources
    pub fn strict() -> Self {
        Self {
            max_depth: 16,
            max_string_len: 256,
            max_file_size: 16 * 1024 * 1024,
        }
    }

    /// Loose limits for trusted tooling
    pub fn permissive() -> Self {
        Self {
            max_depth: MAX_DEPTH_LIMIT,
            max_string_len: 1024 * 1024,
            max_file_size: u32::MAX as u64 + 6,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self.clamped()
    }

    pub fn with_max_string_len(mut self, max_string_len: u32) -> Self {
        self.max_string_len = max_string_len;
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Parse from TOML; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        Ok(config.clamped())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded codec config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `TESM_*` environment variables; unparsable values are ignored
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_value("TESM_MAX_DEPTH") {
            self.max_depth = v;
        }
        if let Some(v) = env_value("TESM_MAX_STRING_LEN") {
            self.max_string_len = v;
        }
        if let Some(v) = env_value("TESM_MAX_FILE_SIZE") {
            self.max_file_size = v;
        }
        self.clamped()
    }

    /// Nesting limit the codec enforces
    pub fn depth_limit(&self) -> u32 {
        self.max_depth.min(MAX_DEPTH_LIMIT)
    }

    fn clamped(mut self) -> Self {
        if self.max_depth > MAX_DEPTH_LIMIT {
            log::warn!(
                "max_depth {} exceeds the limit of {}, clamping",
                self.max_depth,
                MAX_DEPTH_LIMIT
            );
            self.max_depth = MAX_DEPTH_LIMIT;
        }
        self
    }
}

fn env_value<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => {
            log::info!("{} overridden from environment: {}", name, raw);
            Some(value)
        }
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a number", name, raw);
            None
        }
    }
}
