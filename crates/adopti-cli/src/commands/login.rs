//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use adopti_core::Credentials;
use adopti_http::sign_in;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "ADOPTI_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, config: &Config) -> Result<()> {
    let backend = config.backend()?;
    let storage = config.storage();
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let login = sign_in(&backend, storage.as_ref(), &credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    super::print_claims(login.tokens.access.as_str());
    output::field("Storage", &config.storage_path.display().to_string());

    Ok(())
}
