//! Password reset commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use adopti_http::PasswordReset;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct PasswordResetCommand {
    #[command(subcommand)]
    pub command: PasswordResetSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PasswordResetSubcommand {
    /// Email a reset link
    Request {
        #[arg(long)]
        email: String,
    },

    /// Set a new password with the token from the email
    Confirm {
        #[arg(long)]
        token: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        confirm_password: String,
    },
}

pub async fn handle(cmd: PasswordResetCommand, config: &Config) -> Result<()> {
    let backend = config.backend()?;

    let message = match cmd.command {
        PasswordResetSubcommand::Request { email } => backend
            .request_password_reset(&email)
            .await
            .context("Failed to request a password reset")?,
        PasswordResetSubcommand::Confirm {
            token,
            email,
            password,
            confirm_password,
        } => {
            let reset = PasswordReset {
                token,
                email,
                password,
                confirm_password,
            };
            backend
                .confirm_password_reset(&reset)
                .await
                .context("Failed to reset the password")?
        }
    };

    output::success(message.as_deref().unwrap_or("Done"));
    Ok(())
}
