//! Directory configuration.
//!
//! Paging bounds and workflow defaults. Configuration is loaded from
//! environment variables with defaults matching the public API contract.

use chain_org::BusinessType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pagination::PageLimits;

/// Largest configurable page size.
pub const PAGE_LIMIT_CEILING: usize = 1000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Configuration for the organization directory and branch request workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Page size used when a request names none (or an unusable one).
    pub default_page_limit: usize,

    /// Largest page size a request may ask for.
    pub max_page_limit: usize,

    /// Business type applied to branch drafts that name none.
    pub default_business_type: BusinessType,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            default_page_limit: 30,
            max_page_limit: 100,
            default_business_type: BusinessType::Restaurant,
        }
    }
}

impl DirectoryConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ORG_PAGE_DEFAULT_LIMIT`: Default page size (default: 30)
    /// - `ORG_PAGE_MAX_LIMIT`: Maximum page size (default: 100)
    /// - `ORG_DEFAULT_BUSINESS_TYPE`: Business type for drafts without one (default: restaurant)
    ///
    /// Unparsable values fall back to the default. The loaded bounds are
    /// validated before they are returned.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let config = Self {
            default_page_limit: lookup("ORG_PAGE_DEFAULT_LIMIT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default.default_page_limit),
            max_page_limit: lookup("ORG_PAGE_MAX_LIMIT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default.max_page_limit),
            default_business_type: lookup("ORG_DEFAULT_BUSINESS_TYPE")
                .and_then(|s| BusinessType::parse(&s))
                .unwrap_or(default.default_business_type),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the paging bounds are coherent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_limit == 0 || self.max_page_limit > PAGE_LIMIT_CEILING {
            return Err(ConfigError::InvalidValue {
                key: "ORG_PAGE_MAX_LIMIT".to_string(),
                message: format!("must be between 1 and {}", PAGE_LIMIT_CEILING),
            });
        }
        if self.default_page_limit == 0 || self.default_page_limit > self.max_page_limit {
            return Err(ConfigError::InvalidValue {
                key: "ORG_PAGE_DEFAULT_LIMIT".to_string(),
                message: format!("must be between 1 and {}", self.max_page_limit),
            });
        }
        Ok(())
    }

    /// Paging bounds handed to the paginator.
    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default: self.default_page_limit,
            max: self.max_page_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = DirectoryConfig::default();
        assert_eq!(config.default_page_limit, 30);
        assert_eq!(config.max_page_limit, 100);
        assert_eq!(config.default_business_type, BusinessType::Restaurant);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("ORG_PAGE_DEFAULT_LIMIT", "20"),
            ("ORG_PAGE_MAX_LIMIT", "not-a-number"),
            ("ORG_DEFAULT_BUSINESS_TYPE", "cafe"),
        ]
        .into_iter()
        .collect();

        let config = DirectoryConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.default_page_limit, 20);
        assert_eq!(config.max_page_limit, 100);
        assert_eq!(config.default_business_type, BusinessType::Cafe);
    }

    #[test]
    fn test_validate_rejects_incoherent_limits() {
        let mut config = DirectoryConfig::default();
        config.default_page_limit = 150;
        assert!(config.validate().is_err());

        config.default_page_limit = 0;
        assert!(config.validate().is_err());

        config.default_page_limit = 10;
        config.max_page_limit = 0;
        assert!(config.validate().is_err());

        config.max_page_limit = usize::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup_rejects_zero_default_limit() {
        let result = DirectoryConfig::from_lookup(|k| {
            (k == "ORG_PAGE_DEFAULT_LIMIT").then(|| "0".to_string())
        });

        match result {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "ORG_PAGE_DEFAULT_LIMIT"),
            other => panic!("expected invalid default limit, got {:?}", other),
        }
    }

    #[test]
    fn test_from_lookup_rejects_default_above_max() {
        let vars: HashMap<&str, &str> = [("ORG_PAGE_DEFAULT_LIMIT", "50"), ("ORG_PAGE_MAX_LIMIT", "20")]
            .into_iter()
            .collect();

        assert!(DirectoryConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).is_err());
    }
}
