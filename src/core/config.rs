use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const DATABASE_URL_ENV: &str = "WEBLOCK_DATABASE_URL";
pub const AUTH_TOKEN_ENV: &str = "WEBLOCK_AUTH_TOKEN";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub users: UsersConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

/// Connection to the hosted database. Without `database_url` the dashboard
/// runs against a local, non-persistent store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub database_url: Option<String>,
    pub auth_token: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockConfig {
    #[serde(default = "default_relock_delay_secs")]
    pub relock_delay_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Adding an already assigned RFID silently replaces the name
    #[default]
    LastWriteWins,
    /// Adding an already assigned RFID is refused
    Reject,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UsersConfig {
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: i64,
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            auth_token: None,
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            relock_delay_secs: default_relock_delay_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: default_idle_timeout(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_relock_delay_secs() -> u64 {
    5
}

fn default_idle_timeout() -> i64 {
    3600 // 1 hour
}

fn default_cleanup_interval() -> u64 {
    300 // 5 minutes
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::from_toml(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Database credentials are deployment-time values; the environment
    /// wins over the file
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.store.database_url = Some(url);
        }
        if let Some(token) = lookup(AUTH_TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.store.auth_token = Some(token);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate server config
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("Server port must be greater than 0");
            }
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        // Validate store config
        if let Some(url) = &self.store.database_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("database_url must start with http:// or https://, got '{}'", url);
            }
        }

        if self.store.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than 0");
        }

        if self.store.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }

        // Validate lock config
        if self.lock.relock_delay_secs == 0 {
            bail!("relock_delay_secs must be greater than 0");
        }

        // Validate session config
        if self.session.cleanup_interval == 0 {
            bail!("cleanup_interval must be greater than 0");
        }

        if self.session.idle_timeout <= self.session.cleanup_interval as i64 {
            bail!(
                "idle_timeout ({}) must be greater than cleanup_interval ({})",
                self.session.idle_timeout,
                self.session.cleanup_interval
            );
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}
