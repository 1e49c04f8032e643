//! Configuration schema definitions

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Access token settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify access tokens
    #[serde(default)]
    pub access_token_secret: String,

    /// Token lifetime in seconds (1 day)
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
}

fn default_token_ttl_secs() -> i64 {
    86_400
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

// Keep the secret out of logs and panics.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// Document store connection
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. Empty means the in-memory store.
    #[serde(default)]
    pub url: Option<String>,
}

impl DatabaseConfig {
    /// Connection string, if one is configured
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Booking notification mail settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Endpoint that accepts mail as JSON. Empty means log-only delivery.
    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default = "default_mail_from")]
    pub from: String,
}

fn default_mail_from() -> String {
    "no-reply@shelter.guru".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            from: default_mail_from(),
        }
    }
}

impl MailConfig {
    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

impl Config {
    /// Check settings the server cannot start without
    pub fn validate(&self) -> Result<()> {
        if self.auth.access_token_secret.trim().is_empty() {
            return Err(Error::Config(
                "auth.access_token_secret is empty (set ACCESS_TOKEN_SECRET)".to_string(),
            ));
        }
        if self.auth.token_ttl_secs <= 0 {
            return Err(Error::Config(format!(
                "auth.token_ttl_secs must be positive, got {}",
                self.auth.token_ttl_secs
            )));
        }
        Ok(())
    }
}
