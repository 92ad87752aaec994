//! Shared configuration for the task client workspace
//!
//! - [`Environment`]: development vs production switch (`APP_ENV`)
//! - [`FromEnv`]: configuration loaded from environment variables
//! - [`ApiConfig`]: remote task and auth endpoints
//! - [`tracing`]: subscriber bootstrap used by binaries

pub mod api;
pub mod tracing;

pub use api::ApiConfig;

use std::env;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment (dev = local API, prod = deployed API)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development, // Local API, human-readable logs
    Production,  // Deployed API over HTTPS, JSON logs
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    // Whether HTTPS features should be enabled
    pub fn use_https(&self) -> bool {
        self.is_production()
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load and parse environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
