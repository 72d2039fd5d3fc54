//! Connection settings and the write-once fixture that holds them.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TODO_BASE_URL` | http://100.80.104.56 | Todo service scheme and host |
//! | `TODO_PORT` | 8088 | Todo service port |
//! | `TODO_RESOURCE_PATH` | /api/todo | Todo collection path |
//! | `TODO_ACCESS_HEADER` | canAccess | Access header name |
//! | `TODO_ACCESS_VALUE` | true | Access header value |
//! | `USERS_BASE_URL` | https://jsonplaceholder.typicode.com | User directory base URL |
//! | `TODO_TIMEOUT_SECS` | 30 | Per-request timeout (seconds) |
//! | `TODO_LOG_LEVEL` | info | Log level |
//!
//! # Example
//!
//! ```rust
//! use todo_check::{Config, Fixture};
//!
//! let fixture = Fixture::new();
//! fixture.init(Config { port: 5000, ..Default::default() }).unwrap();
//! assert_eq!(fixture.config().unwrap().todo_url(), "http://100.80.104.56:5000/api/todo");
//! ```

use std::sync::OnceLock;
use std::time::Duration;

use clap::Args;

use crate::error::ApiError;

/// Connection settings shared read-only by every check.
#[derive(Debug, Clone, Args, PartialEq, Eq)]
pub struct Config {
    /// Scheme and host of the todo service, without port.
    #[arg(long, env = "TODO_BASE_URL", default_value = "http://100.80.104.56")]
    pub base_url: String,

    /// Port of the todo service.
    #[arg(long, env = "TODO_PORT", default_value_t = 8088)]
    pub port: u16,

    /// Path of the todo collection.
    #[arg(long, env = "TODO_RESOURCE_PATH", default_value = "/api/todo")]
    pub resource_path: String,

    /// Header the todo service requires on every call.
    #[arg(long, env = "TODO_ACCESS_HEADER", default_value = "canAccess")]
    pub access_header: String,

    /// Value sent in the access header.
    #[arg(long, env = "TODO_ACCESS_VALUE", default_value = "true")]
    pub access_value: String,

    /// Base URL of the third-party user directory.
    #[arg(
        long,
        env = "USERS_BASE_URL",
        default_value = "https://jsonplaceholder.typicode.com"
    )]
    pub users_base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "TODO_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "TODO_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://100.80.104.56".to_string(),
            port: 8088,
            resource_path: "/api/todo".to_string(),
            access_header: "canAccess".to_string(),
            access_value: "true".to_string(),
            users_base_url: "https://jsonplaceholder.typicode.com".to_string(),
            timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Absolute URL of the todo collection: `base_url:port + resource_path`.
    pub fn todo_url(&self) -> String {
        format!(
            "{}:{}{}",
            self.base_url.trim_end_matches('/'),
            self.port,
            self.resource_path
        )
    }

    pub fn users_url(&self) -> String {
        format!("{}/users", self.users_base_url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the settings and normalize the resource path to start with `/`.
    pub fn validated(mut self) -> Result<Self, ApiError> {
        for (name, url) in [("base_url", &self.base_url), ("users_base_url", &self.users_base_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ApiError::InvalidConfig(format!(
                    "{name} must start with http:// or https://, got {url:?}"
                )));
            }
        }
        if !host_only(&self.base_url) {
            return Err(ApiError::InvalidConfig(format!(
                "base_url must be scheme and host only, got {:?}",
                self.base_url
            )));
        }
        if self.port == 0 {
            return Err(ApiError::InvalidConfig("port must be non-zero".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ApiError::InvalidConfig("timeout_secs must be non-zero".to_string()));
        }
        let path = self.resource_path.trim().trim_end_matches('/');
        if path.trim_start_matches('/').is_empty() {
            return Err(ApiError::InvalidConfig("resource_path must not be empty".to_string()));
        }
        self.resource_path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        if self.access_header.trim().is_empty() {
            return Err(ApiError::InvalidConfig("access_header must not be empty".to_string()));
        }
        Ok(self)
    }
}

/// True when `url` has nothing after the host: no path, port, query or fragment.
fn host_only(url: &str) -> bool {
    let host = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest)
        .trim_end_matches('/');
    // Bracketed IPv6 literals carry colons of their own.
    let after_brackets = host.rsplit_once(']').map_or(host, |(_, tail)| tail);
    !host.is_empty()
        && !host.contains(['/', '?', '#', '@'])
        && !after_brackets.contains(':')
}

/// Holds the configuration for one suite run. Initialized exactly once,
/// read-only afterwards.
#[derive(Debug, Default)]
pub struct Fixture {
    config: OnceLock<Config>,
}

impl Fixture {
    pub const fn new() -> Self {
        Self {
            config: OnceLock::new(),
        }
    }

    /// Build an already-initialized fixture.
    pub fn with_config(config: Config) -> Result<Self, ApiError> {
        let fixture = Self::new();
        fixture.init(config)?;
        Ok(fixture)
    }

    pub fn init(&self, config: Config) -> Result<&Config, ApiError> {
        let config = config.validated()?;
        self.config
            .set(config)
            .map_err(|_| ApiError::AlreadyInitialized)?;
        self.config()
    }

    pub fn config(&self) -> Result<&Config, ApiError> {
        self.config.get().ok_or(ApiError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.config.get().is_some()
    }
}
