//! Pulse server: real-time job updates over WebSocket, guarded by token
//! auth and per-address rate limiting.

use clap::Parser;

mod commands;
mod logging;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
