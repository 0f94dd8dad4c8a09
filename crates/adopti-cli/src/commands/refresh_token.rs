//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, config: &Config) -> Result<()> {
    let fetch = config.fetch()?;

    eprintln!("{}", "Refreshing access token...".dimmed());

    let access = fetch
        .refresh()
        .await
        .context("Failed to refresh access token")?;

    output::success("Access token refreshed");
    super::print_claims(access.as_str());

    Ok(())
}
