//! CLI command definitions and dispatch.

pub mod hash_password;
pub mod issue_token;
pub mod serve;

use clap::{Parser, Subcommand};

use pulse_core::config::AppConfig;
use pulse_core::error::AppError;

/// Pulse: real-time update server
#[derive(Debug, Parser)]
#[command(name = "pulse-server", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment; loads `config/<env>` over `config/default`
    #[arg(long, env = "PULSE_ENV", default_value = "development")]
    pub config_env: String,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP and WebSocket server
    Serve(serve::ServeArgs),
    /// Print an Argon2id hash for an account's `password_hash`
    HashPassword(hash_password::HashPasswordArgs),
    /// Sign an access token with the configured secret
    IssueToken(issue_token::IssueTokenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            None => serve::execute(&serve::ServeArgs::default(), &self.config_env).await,
            Some(Commands::Serve(args)) => serve::execute(args, &self.config_env).await,
            Some(Commands::HashPassword(args)) => hash_password::execute(args),
            Some(Commands::IssueToken(args)) => issue_token::execute(args, &self.config_env),
        }
    }
}

/// Helper: load layered configuration for `env`
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}
