//! Configuration management
//!
//! This module handles loading and parsing configuration for the Newsdesk gateway.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Deployment environment, drives backend URL selection
    #[serde(default)]
    pub environment: Environment,
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Public site configuration (metadata, sitemap)
    #[serde(default)]
    pub site: SiteConfig,
    /// HTTP cache header configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
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
    /// CORS allowed origin
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
    3000
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Upstream backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL used outside production (and in production when no override is set)
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Base URL used in production
    #[serde(default)]
    pub production_url: Option<String>,
    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            production_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Public site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Canonical public URL of the site
    #[serde(default = "default_site_url")]
    pub url: String,
    /// Site name
    #[serde(default = "default_site_name")]
    pub name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_site_url(),
            name: default_site_name(),
        }
    }
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_site_name() -> String {
    "Newsdesk".to_string()
}

/// Cache-Control values for the cacheable endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Shared cache max age for the category list, in seconds
    #[serde(default = "default_categories_max_age")]
    pub categories_max_age: u32,
    /// stale-while-revalidate window, in seconds
    #[serde(default = "default_stale_while_revalidate")]
    pub stale_while_revalidate: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            categories_max_age: default_categories_max_age(),
            stale_while_revalidate: default_stale_while_revalidate(),
        }
    }
}

fn default_categories_max_age() -> u32 {
    3600
}

fn default_stale_while_revalidate() -> u32 {
    86400
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
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
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

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - NEWSDESK_ENV
    /// - NEWSDESK_SERVER_HOST
    /// - NEWSDESK_SERVER_PORT
    /// - NEWSDESK_SERVER_CORS_ORIGIN
    /// - NEWSDESK_BACKEND_URL
    /// - NEWSDESK_BACKEND_PRODUCTION_URL
    /// - NEWSDESK_BACKEND_TIMEOUT_SECS
    /// - NEWSDESK_SITE_URL
    /// - NEWSDESK_SITE_NAME
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(env) = std::env::var("NEWSDESK_ENV") {
            match env.to_lowercase().as_str() {
                "development" | "dev" => self.environment = Environment::Development,
                "production" | "prod" => self.environment = Environment::Production,
                _ => {} // Ignore invalid values
            }
        }

        if let Ok(host) = std::env::var("NEWSDESK_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("NEWSDESK_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("NEWSDESK_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("NEWSDESK_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Ok(url) = std::env::var("NEWSDESK_BACKEND_PRODUCTION_URL") {
            self.backend.production_url = Some(url);
        }
        if let Ok(timeout) = std::env::var("NEWSDESK_BACKEND_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.backend.timeout_secs = timeout;
            }
        }

        if let Ok(url) = std::env::var("NEWSDESK_SITE_URL") {
            self.site.url = url;
        }
        if let Ok(name) = std::env::var("NEWSDESK_SITE_NAME") {
            self.site.name = name;
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.backend_base_url();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "backend url must be absolute http(s): {}",
                base
            )));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "backend.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Backend base URL for the current environment, without a trailing slash
    pub fn backend_base_url(&self) -> &str {
        let url = match (self.environment, &self.backend.production_url) {
            (Environment::Production, Some(prod)) => prod.as_str(),
            _ => self.backend.url.as_str(),
        };
        url.trim_end_matches('/')
    }

    /// Public site URL without a trailing slash
    pub fn site_url(&self) -> &str {
        self.site.url.trim_end_matches('/')
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

#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
