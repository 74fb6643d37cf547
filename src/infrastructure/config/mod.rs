//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub scheduler: SchedulerConfig,
    pub security: SecurityConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    /// Required at the start of every command; empty disables the check
    pub prefix: String,
    pub register_help_command: bool,
    pub base_help_text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SchedulerConfig {
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SecurityConfig {
    pub rate_limit: Option<RateLimitConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AdaptersConfig {
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "phial".to_string(),
            prefix: "!".to_string(),
            register_help_command: true,
            base_help_text: "All available commands:".to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { poll_interval_ms: 1000 }
    }
}

impl Default for AdaptersConfig {
    fn default() -> Self {
        Self {
            console: Some(ConsoleConfig { enabled: true }),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue("scheduler.poll-interval-ms must be positive".to_string()));
        }
        if let Some(limit) = &self.security.rate_limit {
            if limit.max_requests == 0 || limit.window_seconds == 0 {
                return Err(ConfigError::InvalidValue(
                    "security.rate-limit needs positive max-requests and window-seconds".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn console_enabled(&self) -> bool {
        self.adapters.console.as_ref().map_or(false, |c| c.enabled)
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            config.bot.prefix = prefix;
        }

        if let Ok(name) = std::env::var("BOT_NAME") {
            config.bot.name = name;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.bot.name, "phial");
        assert_eq!(config.bot.prefix, "!");
        assert!(config.bot.register_help_command);
        assert_eq!(config.bot.base_help_text, "All available commands:");
        assert_eq!(config.scheduler.poll_interval_ms, 1000);
        assert!(config.security.rate_limit.is_none());
        assert!(config.console_enabled());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "bot:\n  prefix: \"\"\n  register-help-command: false\nsecurity:\n  rate-limit:\n    max-requests: 5\n    window-seconds: 10\n",
        )
        .unwrap();
        assert_eq!(config.bot.prefix, "");
        assert_eq!(config.bot.name, "phial");
        assert!(!config.bot.register_help_command);
        assert_eq!(config.scheduler.poll_interval_ms, 1000);
        let limit = config.security.rate_limit.unwrap();
        assert_eq!((limit.max_requests, limit.window_seconds), (5, 10));
    }

    #[test]
    fn default_yaml_parses_back() {
        let yaml = Config::default().to_yaml().unwrap();
        assert!(yaml.contains("poll-interval-ms: 1000"));
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.bot.prefix, "!");
    }

    #[test]
    fn zero_poll_interval_is_invalid() {
        let err = Config::from_yaml("scheduler:\n  poll-interval-ms: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert!(matches!(Config::from_yaml("bot: [1, 2"), Err(ConfigError::Parse(_))));
    }
}
