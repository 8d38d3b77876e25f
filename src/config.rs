//! Engine configuration
//!
//! Defaults describe a polite single-site crawl. Every field can be
//! overridden from a TOML file or by the CLI flags in `main.rs`.

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Tunables shared by every session of one engine instance
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Maximum number of concurrent page fetches per session
    pub max_concurrent: usize,

    /// Per-request timeout in seconds
    pub fetch_timeout_secs: u64,

    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            fetch_timeout_secs: 10,
            connect_timeout_secs: 5,
            user_agent: concat!("sitebound/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl EngineConfig {
    /// Checks that the configuration describes a runnable crawl
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::Validation(
                "max-concurrent must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch-timeout-secs must be at least 1".to_string(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Loads and validates a configuration from a TOML file
///
/// Missing fields fall back to their defaults, so a config file only needs
/// to name the values it changes.
pub fn load_config(path: &Path) -> ConfigResult<EngineConfig> {
    let raw = std::fs::read_to_string(path)?;
    let config: EngineConfig = toml::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = EngineConfig {
            max_concurrent: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let config = EngineConfig {
            user_agent: "  ".to_string(),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str("max-concurrent = 3").unwrap();
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.fetch_timeout_secs, 10);
    }

    #[test]
    fn test_full_toml() {
        let config: EngineConfig = toml::from_str(
            r#"
            max-concurrent = 4
            fetch-timeout-secs = 20
            connect-timeout-secs = 2
            user-agent = "testbot/0.1"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.fetch_timeout_secs, 20);
        assert_eq!(config.user_agent, "testbot/0.1");
    }
}
