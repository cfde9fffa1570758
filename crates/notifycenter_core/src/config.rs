//! Notification center runtime configuration.
//!
//! # Responsibility
//! - Hold tunables shared by the store and list view.
//! - Decode host-provided JSON config with defaults for missing keys.
//!
//! # Invariants
//! - A validated config always has `page_size` within `1..=MAX_PAGE_SIZE`.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Configuration for one notification center instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CenterConfig {
    /// Number of list items revealed per page.
    pub page_size: usize,
    /// Whether `add_sample` also inserts the sample through the gateway.
    pub mirror_samples_remotely: bool,
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            mirror_samples_remotely: true,
        }
    }
}

impl CenterConfig {
    /// Parses and validates a JSON config document.
    ///
    /// # Errors
    /// - `Parse` for malformed JSON or unknown keys.
    /// - `InvalidPageSize` when `page_size` is out of range.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidPageSize(self.page_size));
        }
        Ok(())
    }
}

/// Configuration decode/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    InvalidPageSize(usize),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid config: {message}"),
            Self::InvalidPageSize(value) => write!(
                f,
                "page_size must be within 1..={MAX_PAGE_SIZE}, got {value}"
            ),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{CenterConfig, ConfigError, DEFAULT_PAGE_SIZE};

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = CenterConfig::from_json_str("{}").unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.mirror_samples_remotely);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = CenterConfig::from_json_str(r#"{"page_size": 0}"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPageSize(0));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CenterConfig::from_json_str(r#"{"pagesize": 5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
