//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");

    if config.org.document.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "org.document".to_string(),
            message: "document path cannot be empty".to_string(),
        }
        .into());
    }

    if config.crypto.concurrency == 0 {
        return Err(ConfigError::InvalidValue {
            field: "crypto.concurrency".to_string(),
            message: "must be at least 1".to_string(),
        }
        .into());
    }

    if config.invites.ttl_hours == 0 {
        return Err(ConfigError::InvalidValue {
            field: "invites.ttl_hours".to_string(),
            message: "must be at least 1".to_string(),
        }
        .into());
    }

    debug!("configuration validation passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let mut config = Config::default();
        config.crypto.concurrency = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_ttl() {
        let mut config = Config::default();
        config.invites.ttl_hours = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_document() {
        let mut config = Config::default();
        config.org.document = PathBuf::new();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("org.document"));
    }
}
