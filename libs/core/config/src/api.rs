use crate::{env_or_default, ConfigError, FromEnv};
use std::env;
use std::time::Duration;

/// Default task endpoint of the remote API
pub const DEFAULT_TASKS_URL: &str = "http://localhost:5000/api/tasks";

const TASKS_PATH: &str = "/api/tasks";
const AUTH_PATH: &str = "/api/auth";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Remote API endpoints used by the task client
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the task collection (`GET`/`POST` here, `PUT`/`DELETE` on `/{id}`)
    pub tasks_url: String,
    /// Base URL of the auth routes (`/register`, `/login`, `/me`)
    pub auth_url: String,
    /// Per-request timeout applied by the HTTP clients
    pub timeout: Duration,
}

impl ApiConfig {
    /// Build a config from a tasks URL, deriving the auth URL from it.
    pub fn new(tasks_url: impl Into<String>) -> Self {
        let tasks_url = trim_trailing_slash(tasks_url.into());
        let auth_url = derive_auth_url(&tasks_url);

        Self {
            tasks_url,
            auth_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = trim_trailing_slash(auth_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of a single task resource
    pub fn task_url(&self, id: &str) -> String {
        format!("{}/{}", self.tasks_url, id)
    }

    /// URL of an auth route, e.g. `auth_route("login")`
    pub fn auth_route(&self, route: &str) -> String {
        format!("{}/{}", self.auth_url, route)
    }
}

impl FromEnv for ApiConfig {
    /// Reads from environment variables with local-development defaults:
    /// - TODO_API_URL: defaults to http://localhost:5000/api/tasks
    /// - TODO_AUTH_URL: defaults to TODO_API_URL with /api/tasks replaced by /api/auth
    /// - TODO_API_TIMEOUT_SECS: defaults to 30
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(env_or_default("TODO_API_URL", DEFAULT_TASKS_URL));

        if let Ok(auth_url) = env::var("TODO_AUTH_URL") {
            config = config.with_auth_url(auth_url);
        }

        let timeout_secs: u64 = env_or_default("TODO_API_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "TODO_API_TIMEOUT_SECS".to_string(),
                details: format!("{}", e),
            })?;

        Ok(config.with_timeout(Duration::from_secs(timeout_secs)))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TASKS_URL)
    }
}

fn trim_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn derive_auth_url(tasks_url: &str) -> String {
    match tasks_url.strip_suffix(TASKS_PATH) {
        Some(origin) => format!("{}{}", origin, AUTH_PATH),
        None => tasks_url.replacen(TASKS_PATH, AUTH_PATH, 1),
    }
}
