//! Configuration management
//!
//! This module handles loading and parsing configuration for Inkpost.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4040
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration (SQLite)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL or file path
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/inkpost.db".to_string()
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to sign session tokens.
    ///
    /// The secret's secrecy is the entire trust boundary: anyone holding
    /// it can forge any identity. The built-in default exists only so the
    /// server starts in development; `main` warns loudly when it is used.
    #[serde(default = "default_auth_secret")]
    pub secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_auth_secret(),
        }
    }
}

fn default_auth_secret() -> String {
    "inkpost-dev-secret".to_string()
}

impl AuthConfig {
    /// Whether the signing secret is still the built-in development default.
    pub fn is_default_secret(&self) -> bool {
        self.secret == default_auth_secret()
    }
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Upload directory path
    #[serde(default = "default_upload_path")]
    pub path: PathBuf,
    /// Maximum file size in bytes (default: 10MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed image MIME types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: default_upload_path(),
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
    ]
}

impl UploadConfig {
    /// Check if a MIME type is allowed
    pub fn is_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - INKPOST_SERVER_HOST
    /// - INKPOST_SERVER_PORT
    /// - INKPOST_SERVER_CORS_ORIGIN
    /// - INKPOST_DATABASE_URL
    /// - INKPOST_AUTH_SECRET
    /// - INKPOST_UPLOAD_PATH
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("INKPOST_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("INKPOST_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("INKPOST_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }
        if let Ok(url) = std::env::var("INKPOST_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("INKPOST_AUTH_SECRET") {
            self.auth.secret = secret;
        }
        if let Ok(path) = std::env::var("INKPOST_UPLOAD_PATH") {
            self.upload.path = PathBuf::from(path);
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
