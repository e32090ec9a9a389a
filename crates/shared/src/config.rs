//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Uploaded media configuration.
    #[serde(default)]
    pub media: MediaSettings,
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

/// Where uploads are written and how they are exposed.
///
/// Read once at startup and handed to the storage service; never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// Filesystem directory all uploads are stored under.
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    /// URL path segment uploads are served from.
    #[serde(default = "default_media_url_prefix")]
    pub url_prefix: String,
    /// Largest accepted request body on upload routes, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Size of each read/write while streaming an upload to disk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            url_prefix: default_media_url_prefix(),
            max_upload_bytes: default_max_upload_bytes(),
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_media_url_prefix() -> String {
    "/uploads".to_string()
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024 // 50 MiB
}

fn default_chunk_size() -> usize {
    1024 * 1024 // 1 MiB
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `QUILL__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("QUILL").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Address the HTTP server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
