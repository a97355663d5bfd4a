//! Configuration loading with layered overrides.
//!
//! Config is loaded in order (each layer overrides the previous):
//! 1. Default values
//! 2. Config file (TOML)
//! 3. Environment variables
//! 4. CLI arguments
//!
//! JWT secret is never read from config files for security - it must come from
//! environment variable or CLI argument.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Configuration shared between the server and every request context.
pub type SharedConfig = Arc<Config>;

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub site: Site,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Server {
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

/// Database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "kiosk.db".to_string()
}

/// Authentication and session settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct Auth {
    /// JWT secret for session token signing/verification.
    /// Must be provided via environment variable or CLI - never from config file.
    #[serde(default)]
    pub jwt_secret: String,

    /// Session lifetime in days.
    #[serde(default = "default_token_expiry_days")]
    pub token_expiry_days: u32,

    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Where anonymous visitors of protected pages are sent.
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// Login form submissions allowed per client IP per minute.
    #[serde(default = "default_login_attempts_per_minute")]
    pub login_attempts_per_minute: u32,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_days: default_token_expiry_days(),
            cookie_name: default_cookie_name(),
            login_url: default_login_url(),
            login_attempts_per_minute: default_login_attempts_per_minute(),
        }
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secret = if self.jwt_secret.is_empty() {
            ""
        } else {
            "[redacted]"
        };
        f.debug_struct("Auth")
            .field("jwt_secret", &secret)
            .field("token_expiry_days", &self.token_expiry_days)
            .field("cookie_name", &self.cookie_name)
            .field("login_url", &self.login_url)
            .field("login_attempts_per_minute", &self.login_attempts_per_minute)
            .finish()
    }
}

fn default_token_expiry_days() -> u32 {
    14
}

fn default_cookie_name() -> String {
    "sessionid".to_string()
}

fn default_login_url() -> String {
    "/auth/login/".to_string()
}

fn default_login_attempts_per_minute() -> u32 {
    10
}

/// Presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// Maximum number of articles on the news home page.
    #[serde(default = "default_news_count_on_home_page")]
    pub news_count_on_home_page: u32,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            news_count_on_home_page: default_news_count_on_home_page(),
        }
    }
}

fn default_news_count_on_home_page() -> u32 {
    10
}

/// Builder for loading configuration with customizable options.
#[derive(Debug, Clone)]
pub struct Loader {
    /// Environment variable prefix (e.g., "KIOSK" -> KIOSK_HOST, KIOSK_PORT)
    pub env_prefix: String,
    /// Name of the JWT secret environment variable (without prefix)
    pub jwt_secret_env: String,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            env_prefix: "KIOSK".to_string(),
            jwt_secret_env: "JWT_SECRET".to_string(),
        }
    }
}

impl Loader {
    /// Create a new config loader with the given environment prefix.
    pub fn new(env_prefix: impl Into<String>) -> Self {
        Self {
            env_prefix: env_prefix.into(),
            ..Default::default()
        }
    }

    /// Load configuration from file, environment, and CLI arguments.
    ///
    /// # Arguments
    /// * `config_path` - Optional path to TOML config file
    /// * `cli_host` - CLI override for host
    /// * `cli_port` - CLI override for port
    /// * `cli_database_url` - CLI override for database URL
    /// * `cli_jwt_secret` - CLI override for JWT secret
    pub fn load(
        &self,
        config_path: Option<&Path>,
        cli_host: Option<&str>,
        cli_port: Option<u16>,
        cli_database_url: Option<&str>,
        cli_jwt_secret: Option<&str>,
    ) -> crate::Result<Config> {
        let mut config: Config = if let Some(path) = config_path {
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?
        } else {
            Config::default()
        };

        // Clear any jwt_secret from config file - security requirement
        config.auth.jwt_secret = String::new();

        let prefix = &self.env_prefix;

        if let Ok(host) = std::env::var(format!("{prefix}_HOST")) {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var(format!("{prefix}_PORT"))
            && let Ok(p) = port.parse()
        {
            config.server.port = p;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(secret) = std::env::var(format!("{}_{}", prefix, self.jwt_secret_env)) {
            config.auth.jwt_secret = secret;
        }

        if let Some(host) = cli_host {
            config.server.host = host.to_string();
        }
        if let Some(port) = cli_port {
            config.server.port = port;
        }
        if let Some(url) = cli_database_url {
            config.database.url = url.to_string();
        }
        if let Some(secret) = cli_jwt_secret {
            config.auth.jwt_secret = secret.to_string();
        }

        if config.auth.jwt_secret.is_empty() {
            return Err(Error::Config(format!(
                "{}_{} must be set via environment variable or --jwt-secret flag",
                prefix, self.jwt_secret_env
            )));
        }
        if !crate::response::is_local_path(&config.auth.login_url)
            || config.auth.login_url.contains(['?', '#', '{', '}'])
        {
            return Err(Error::Config(format!(
                "auth.login_url must be a plain site path, got {:?}",
                config.auth.login_url
            )));
        }
        if config.database.url == crate::db::MEMORY_URL {
            return Err(Error::Config(
                "database.url \":memory:\" is not supported, use a file path".to_string(),
            ));
        }
        if config.site.news_count_on_home_page == 0 {
            return Err(Error::Config(
                "site.news_count_on_home_page must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }
}
