//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use crate::api::{self, AppState};
use crate::auth::{Identity, TokenKeys};
use crate::cli::{error, info, success, warn};
use crate::config::{self, loader::CONFIG_FILENAME, Config};
use crate::mail::Notifier;
use crate::store::MemoryStore;

/// Initialize a new shelter.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set ACCESS_TOKEN_SECRET (and optionally DATABASE_URL) then run 'shelter serve'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>, in_memory: bool) -> Result<()> {
    let config = load_config()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let state = if in_memory {
        config.validate()?;
        AppState::new(
            Arc::new(MemoryStore::new()),
            TokenKeys::from_config(&config.auth),
            Notifier::from_config(&config.mail),
        )
    } else {
        AppState::from_config(&config).await?
    };

    info(&format!("Starting server on {}:{}", host, port));
    api::serve(state, &host, port).await?;
    Ok(())
}

/// Print a token for `email`, handy for exercising guarded routes
pub async fn token(email: &str, role: &str) -> Result<()> {
    let config = load_config()?;
    config.validate()?;

    let keys = TokenKeys::from_config(&config.auth);
    let token = keys.issue(&Identity::new(email, role))?;

    info(&format!(
        "Token for {} ({}), valid {}h",
        email,
        role,
        keys.ttl().num_hours()
    ));
    println!("{}", token);
    Ok(())
}

fn load_config() -> Result<Config> {
    config::load_config().map_err(|e| {
        error(&format!("Failed to load configuration: {}", e));
        e.into()
    })
}
