//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use adopti_core::ClientStorage;
use adopti_core::error::AuthError;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Also print the cached user record
    #[arg(long)]
    pub user: bool,
}

pub async fn run(args: WhoamiArgs, config: &Config) -> Result<()> {
    let storage = config.storage();
    let token = storage
        .access_token()
        .await
        .context("Failed to read storage")?
        .ok_or(AuthError::NotSignedIn)
        .context("Run 'adopti login' first")?;

    super::print_claims(token.as_str());

    if args.user {
        match storage.cached_user().await.context("Failed to read storage")? {
            Some(user) => output::json_pretty(&user)?,
            None => output::field("User", "not cached"),
        }
    }

    Ok(())
}
