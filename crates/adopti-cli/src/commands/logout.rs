//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use adopti_http::sign_out;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, config: &Config) -> Result<()> {
    let storage = config.storage();
    let navigator = config.navigator();

    sign_out(storage.as_ref(), navigator.as_ref())
        .await
        .context("Failed to clear stored credentials")?;

    output::success("Logged out");
    Ok(())
}
