//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// External report renderer configuration.
    #[serde(default)]
    pub reports: ReportConfig,
    /// List endpoint paging limits.
    #[serde(default)]
    pub pagination: PaginationConfig,
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
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
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

/// External report renderer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Path to the renderer executable.
    #[serde(default = "default_renderer_bin")]
    pub renderer_bin: String,
    /// Directory holding compiled report templates.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    /// Directory where generated documents are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Seconds before a render is abandoned.
    #[serde(default = "default_render_timeout")]
    pub timeout_secs: u64,
    /// Live database handed to store-backed templates. Reports render from
    /// an inline dataset when absent.
    #[serde(default)]
    pub store: Option<ReportStoreConfig>,
}

/// Database connection flags for store-backed templates.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportStoreConfig {
    /// Renderer database type flag.
    #[serde(default = "default_store_type")]
    pub db_type: String,
    /// JDBC driver class.
    #[serde(default = "default_store_driver")]
    pub driver: String,
    /// JDBC URL.
    pub url: String,
    /// Database user.
    pub username: String,
    /// Database password.
    #[serde(default)]
    pub password: String,
}

fn default_store_type() -> String {
    "generic".to_string()
}

fn default_store_driver() -> String {
    "org.postgresql.Driver".to_string()
}

fn default_render_timeout() -> u64 {
    60
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            renderer_bin: default_renderer_bin(),
            templates_dir: default_templates_dir(),
            output_dir: default_output_dir(),
            timeout_secs: default_render_timeout(),
            store: None,
        }
    }
}

fn default_renderer_bin() -> String {
    "lib/jasperstarter/bin/jasperstarter".to_string()
}

fn default_templates_dir() -> String {
    "reports".to_string()
}

fn default_output_dir() -> String {
    "tmp".to_string()
}

/// Paging limits applied to list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the caller omits or garbles `limit`.
    #[serde(default = "default_page_size")]
    pub default_limit: u64,
    /// Upper bound for `limit`.
    #[serde(default = "default_max_page_size")]
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_page_size(),
            max_limit: default_max_page_size(),
        }
    }
}

fn default_page_size() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    100
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
            .add_source(config::Environment::with_prefix("PARTIDA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
