//! Sign an access token offline, for testing clients against a running server.

use clap::Args;

use pulse_auth::TokenAuthenticator;
use pulse_core::error::AppError;
use pulse_core::types::UserId;

/// Arguments for the issue-token command
#[derive(Debug, Args)]
pub struct IssueTokenArgs {
    /// Token subject (UUID)
    #[arg(long)]
    pub user_id: String,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Subscription plan
    #[arg(long, default_value = "free")]
    pub plan: String,
}

/// Execute the issue-token command
pub fn execute(args: &IssueTokenArgs, env: &str) -> Result<(), AppError> {
    crate::logging::init_quiet();

    let config = super::load_config(env)?;
    let user_id: UserId = args
        .user_id
        .parse()
        .map_err(|e| AppError::validation(format!("Invalid user id '{}': {e}", args.user_id)))?;

    let issued = TokenAuthenticator::new(&config.auth).issue(user_id, &args.email, &args.plan)?;

    println!("{}", issued.token);
    eprintln!("expires at {}", issued.expires_at().to_rfc3339());
    Ok(())
}
