//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `homelink.toml` in the working directory (or the path in
//! `HOMELINK_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use homelink_adapter_homegraph_reqwest::config::{
    DEFAULT_ENDPOINT, DEFAULT_RELAY_URL, DEFAULT_TOKEN_URL, HOMEGRAPH_SCOPE,
};
use homelink_adapter_homegraph_reqwest::{HomeGraphConfig, RelayConfig};
use homelink_app::services::fulfillment::FulfillmentOptions;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// State reporting and SYNC batching.
    pub assistant: AssistantConfig,
    /// Direct Home Graph route.
    pub homegraph: HomeGraphSection,
    /// Relay fallback route.
    pub relay: RelaySection,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Window over which state changes are coalesced into one report.
    pub report_debounce_ms: u64,
    /// Newly linked devices after which a SYNC stops and schedules another.
    pub sync_batch_limit: usize,
    pub resync_delay_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HomeGraphSection {
    pub endpoint: String,
    pub token_url: String,
    /// Service-account key file, used when the store holds no credential.
    pub credential_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RelaySection {
    pub base_url: String,
    /// Bearer token file, re-read on every relay call.
    pub token_path: Option<PathBuf>,
}

/// Per-integration toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Enable the virtual/demo devices.
    pub virtual_enabled: bool,
}

impl Config {
    /// Load configuration from `homelink.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HOMELINK_CONFIG").unwrap_or_else(|_| "homelink.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply `HOMELINK_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("HOMELINK_HOST") {
            self.server.host = val;
        }
        if let Some(port) = lookup("HOMELINK_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = lookup("HOMELINK_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = lookup("HOMELINK_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("HOMELINK_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(ms) = lookup("HOMELINK_REPORT_DEBOUNCE_MS").and_then(|val| val.parse().ok()) {
            self.assistant.report_debounce_ms = ms;
        }
        if let Some(val) = lookup("HOMELINK_HOMEGRAPH_ENDPOINT") {
            self.homegraph.endpoint = val;
        }
        if let Some(val) = lookup("HOMELINK_CREDENTIAL_PATH") {
            self.homegraph.credential_path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("HOMELINK_RELAY_URL") {
            self.relay.base_url = val;
        }
        if let Some(val) = lookup("HOMELINK_RELAY_TOKEN_PATH") {
            self.relay.token_path = Some(PathBuf::from(val));
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.assistant.sync_batch_limit == 0 {
            return Err(ConfigError::Validation(
                "assistant.sync_batch_limit must be at least 1".to_string(),
            ));
        }
        if self.homegraph.endpoint.is_empty() || self.homegraph.token_url.is_empty() {
            return Err(ConfigError::Validation(
                "homegraph.endpoint and homegraph.token_url must be set".to_string(),
            ));
        }
        if self.relay.token_path.is_some() && self.relay.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "relay.base_url must be set when relay.token_path is".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn report_debounce(&self) -> Duration {
        Duration::from_millis(self.assistant.report_debounce_ms)
    }

    #[must_use]
    pub fn fulfillment_options(&self) -> FulfillmentOptions {
        FulfillmentOptions {
            sync_batch_limit: self.assistant.sync_batch_limit,
            resync_delay: Duration::from_secs(self.assistant.resync_delay_secs),
        }
    }

    #[must_use]
    pub fn homegraph_config(&self) -> HomeGraphConfig {
        HomeGraphConfig {
            endpoint: self.homegraph.endpoint.clone(),
            token_url: self.homegraph.token_url.clone(),
            scope: HOMEGRAPH_SCOPE.to_string(),
        }
    }

    #[must_use]
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            base_url: self.relay.base_url.clone(),
            token_path: self.relay.token_path.clone(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:homelink.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homelinkd=info,homelink=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            report_debounce_ms: 2000,
            sync_batch_limit: 10,
            resync_delay_secs: 10,
        }
    }
}

impl Default for HomeGraphSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            credential_path: None,
        }
    }
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RELAY_URL.to_string(),
            token_path: None,
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:homelink.db?mode=rwc");
        assert_eq!(config.report_debounce(), Duration::from_secs(2));
        assert_eq!(config.fulfillment_options(), FulfillmentOptions::default());
        assert_eq!(config.homegraph_config(), HomeGraphConfig::default());
        assert_eq!(config.relay_config(), RelayConfig::default());
        assert!(config.integrations.virtual_enabled);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.assistant.sync_batch_limit, 10);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [assistant]
            report_debounce_ms = 500
            sync_batch_limit = 3
            resync_delay_secs = 30

            [homegraph]
            endpoint = 'https://graph.example'
            token_url = 'https://auth.example/token'
            credential_path = '/etc/homelink/key.json'

            [relay]
            base_url = 'https://relay.example'
            token_path = '/run/homelink/relay-token'

            [integrations]
            virtual_enabled = false
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.report_debounce(), Duration::from_millis(500));
        assert_eq!(
            config.fulfillment_options(),
            FulfillmentOptions {
                sync_batch_limit: 3,
                resync_delay: Duration::from_secs(30),
            }
        );
        assert_eq!(config.homegraph_config().endpoint, "https://graph.example");
        assert_eq!(
            config.homegraph.credential_path,
            Some(PathBuf::from("/etc/homelink/key.json"))
        );
        assert_eq!(
            config.relay_config().token_path,
            Some(PathBuf::from("/run/homelink/relay-token"))
        );
        assert!(!config.integrations.virtual_enabled);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_apply_environment_overrides() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[
            ("HOMELINK_BIND", "127.0.0.1:8443"),
            ("HOMELINK_DATABASE_URL", "sqlite::memory:"),
            ("HOMELINK_REPORT_DEBOUNCE_MS", "250"),
            ("HOMELINK_RELAY_TOKEN_PATH", "/tmp/token"),
        ]));
        assert_eq!(config.bind_addr(), "127.0.0.1:8443");
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(config.report_debounce(), Duration::from_millis(250));
        assert_eq!(config.relay.token_path, Some(PathBuf::from("/tmp/token")));
    }

    #[test]
    fn should_prefer_rust_log_over_homelink_log() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[("HOMELINK_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparsable_port_override() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[("HOMELINK_PORT", "eighty")]));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_sync_batch_limit() {
        let mut config = Config::default();
        config.assistant.sync_batch_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_relay_token_without_base_url() {
        let mut config = Config::default();
        config.relay.base_url = String::new();
        config.relay.token_path = Some(PathBuf::from("/tmp/token"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_format_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }
}
