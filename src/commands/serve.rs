//! Start the Pulse server.

use clap::Args;
use tracing::info;

use pulse_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, env: &str) -> Result<(), AppError> {
    let mut config = super::load_config(env)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    crate::logging::init(&config.logging);
    info!(
        env = %env,
        version = env!("CARGO_PKG_VERSION"),
        broker = ?config.realtime.broker.provider,
        "Configuration loaded"
    );

    pulse_api::run_server(config).await
}
