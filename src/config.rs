use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::{env, path::PathBuf, time::Duration};
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub realtime_url: String,
    /// Requests wait indefinitely when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_cookie_max_age_days")]
    pub cookie_max_age_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: default_storage_key(),
            cookie_name: default_cookie_name(),
            cookie_max_age_days: default_cookie_max_age_days(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".eventdesk")
}

fn default_storage_key() -> String {
    eventdesk_session::STORAGE_KEY.to_string()
}

fn default_cookie_name() -> String {
    "token".to_string()
}

pub const MAX_COOKIE_AGE_DAYS: i64 = 3650;

fn default_cookie_max_age_days() -> i64 {
    7
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. `EVENTDESK_API_URL`
    /// 2. Environment variables (EVENTDESK__API__BASE_URL, etc.)
    /// 3. Config file specified by path, `CONFIG_PATH` or `config/default.toml`
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("api.base_url", "http://localhost:3001/api")?
            .set_default("api.realtime_url", "ws://localhost:3001")?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("EVENTDESK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(api_url) = env::var("EVENTDESK_API_URL") {
            builder = builder.set_override("api.base_url", api_url)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let base_url = Url::parse(&self.api.base_url)
            .map_err(|e| format!("Invalid api.base_url '{}': {}", self.api.base_url, e))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err("api.base_url must be an http(s) URL".to_string());
        }

        let realtime_url = Url::parse(&self.api.realtime_url).map_err(|e| {
            format!(
                "Invalid api.realtime_url '{}': {}",
                self.api.realtime_url, e
            )
        })?;
        if !matches!(realtime_url.scheme(), "ws" | "wss") {
            return Err("api.realtime_url must be a ws(s) URL".to_string());
        }

        if self.api.timeout_secs == Some(0) {
            return Err("api.timeout_secs must be greater than 0".to_string());
        }
        if !(1..=MAX_COOKIE_AGE_DAYS).contains(&self.session.cookie_max_age_days) {
            return Err(format!(
                "session.cookie_max_age_days must be between 1 and {MAX_COOKIE_AGE_DAYS}"
            ));
        }
        if self.session.storage_key.trim().is_empty() {
            return Err("session.storage_key must not be empty".to_string());
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err("session.cookie_name must not be empty".to_string());
        }
        if !matches!(self.observability.log_format.as_str(), "pretty" | "json") {
            return Err("observability.log_format must be 'pretty' or 'json'".to_string());
        }

        Ok(())
    }
}
