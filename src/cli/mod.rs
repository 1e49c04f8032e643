//! CLI interface for Shelter Guru

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shelter")]
#[command(version)]
#[command(about = "REST backend for home listings and bookings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default shelter.toml configuration file
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Keep documents in memory even if a database URL is configured
        #[arg(long)]
        in_memory: bool,
    },

    /// Issue an access token with the configured secret
    Token {
        /// Email the token is issued for
        #[arg(short, long)]
        email: String,

        /// Role claim
        #[arg(short, long, default_value = "guest")]
        role: String,
    },
}
