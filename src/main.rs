use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelter_guru::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up ACCESS_TOKEN_SECRET and friends from a local .env
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelter_guru=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => cli::commands::init().await,
        Commands::Serve {
            host,
            port,
            in_memory,
        } => cli::commands::serve(host, port, in_memory).await,
        Commands::Token { email, role } => cli::commands::token(&email, &role).await,
    }
}
