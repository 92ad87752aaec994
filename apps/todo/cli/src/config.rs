//! Configuration for the todo CLI

use core_config::{ApiConfig, ConfigError, Environment, FromEnv};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub api: ApiConfig,
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let api = ApiConfig::from_env()?;

        Ok(Self { environment, api })
    }
}

impl Config {
    /// Warn about settings that are legal but unexpected for the environment
    pub fn check(&self) {
        if self.environment.use_https() && !self.api.tasks_url.starts_with("https://") {
            warn!(url = %self.api.tasks_url, "Production task API is not using HTTPS");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_config_from_env_defaults() {
        temp_env::with_vars(
            [
                ("APP_ENV", None::<&str>),
                ("TODO_API_URL", None::<&str>),
                ("TODO_AUTH_URL", None::<&str>),
                ("TODO_API_TIMEOUT_SECS", None::<&str>),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.environment.is_development());
                assert_eq!(config.api, ApiConfig::default());
                assert_eq!(config.api.timeout, Duration::from_secs(30));
            },
        );
    }

    #[test]
    fn test_config_from_env_production() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("TODO_API_URL", Some("https://todo.example.com/api/tasks")),
                ("TODO_AUTH_URL", None::<&str>),
                ("TODO_API_TIMEOUT_SECS", None::<&str>),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.environment.is_production());
                assert_eq!(config.api.auth_url, "https://todo.example.com/api/auth");
                config.check();
            },
        );
    }

    #[test]
    fn test_config_from_env_invalid_timeout() {
        temp_env::with_var("TODO_API_TIMEOUT_SECS", Some("-1"), || {
            assert!(Config::from_env().is_err());
        });
    }
}
