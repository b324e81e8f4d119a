//! Configuration validation rules.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is outside 100ms..=5min
    /// - `llm_timeout_ms` is outside 1s..=10min
    /// - `user_agent` or `openai_model` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if !(100..=300_000).contains(&self.timeout_ms) {
            return Err(invalid("timeout_ms", "must be between 100ms and 5 minutes"));
        }

        if !(1_000..=600_000).contains(&self.llm_timeout_ms) {
            return Err(invalid("llm_timeout_ms", "must be between 1s and 10 minutes"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.openai_model.trim().is_empty() {
            return Err(invalid("openai_model", "must not be empty"));
        }

        if self.blocked_domains.is_empty() {
            tracing::warn!("blocked_domains is empty; social links may be followed as recipe pages");
        }

        if self.recipe_hints.is_empty() {
            tracing::warn!("recipe_hints is empty; outbound recipe links will never be resolved");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 300_001, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_llm_timeout_bounds() {
        let config = AppConfig { llm_timeout_ms: 999, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "llm_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_strings() {
        let config = AppConfig { user_agent: " ".into(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));

        let config = AppConfig { openai_model: String::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "openai_model"));
    }

    #[test]
    fn test_validate_allows_empty_domain_sets() {
        let config = AppConfig { blocked_domains: Vec::new(), recipe_hints: Vec::new(), ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
