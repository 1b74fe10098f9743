//! Application configuration management.

use serde::Deserialize;

use crate::types::Secret;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Access gate configuration.
    pub auth: AuthConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout applied by the HTTP layer.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: Secret,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Object storage settings as read from configuration.
///
/// `provider` selects which of the remaining fields are used:
/// - `s3`: `bucket`, `region`, optional `endpoint`, `access_key_id`, `secret_access_key`
/// - `azure_blob`: `account`, `bucket` (container name), `secret_access_key` (account key)
/// - `local`: `root`
/// - `memory`: nothing
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Provider name.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Bucket or container name.
    #[serde(default)]
    pub bucket: String,
    /// Store region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible stores.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key ID.
    #[serde(default)]
    pub access_key_id: Secret,
    /// Secret access key (or Azure account key).
    #[serde(default)]
    pub secret_access_key: Secret,
    /// Azure storage account name.
    #[serde(default)]
    pub account: Option<String>,
    /// Root directory for the local provider.
    #[serde(default = "default_root")]
    pub root: String,
    /// Overrides the derived public URL prefix (CDN, custom domain).
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Largest accepted upload in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Accepted upload content types; the built-in list when absent.
    #[serde(default)]
    pub allowed_mime_types: Option<Vec<String>>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            access_key_id: Secret::default(),
            secret_access_key: Secret::default(),
            account: None,
            root: default_root(),
            public_base_url: None,
            max_file_size: default_max_file_size(),
            allowed_mime_types: None,
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_root() -> String {
    "./storage".to_string()
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

/// Access gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret key used to verify bearer tokens.
    pub jwt_secret: Secret,
}

/// Log output configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// `json` for structured output, anything else for human-readable lines.
    #[serde(default)]
    pub format: Option<String>,
}

impl LogConfig {
    /// Returns `true` when JSON log lines were requested.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("CAMPUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
