//! Subcommand implementations.

mod google;
mod guard;
mod login;
mod logout;
mod password_reset;
mod profile;
mod refresh_token;
mod register;
mod request;
mod storage;
mod whoami;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Subcommand;

use adopti_core::Claims;

use crate::config::Config;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login(login::LoginArgs),

    /// Sign in by exchanging a Google identity token
    Google(google::GoogleArgs),

    /// Sign out and forget the stored tokens
    Logout(logout::LogoutArgs),

    /// Display the signed-in user
    Whoami(whoami::WhoamiArgs),

    /// Refresh the access token
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Read or update the profile
    Profile(profile::ProfileCommand),

    /// Create an account
    Register(register::RegisterArgs),

    /// Request or confirm a password reset
    PasswordReset(password_reset::PasswordResetCommand),

    /// Send an authenticated request
    Request(request::RequestArgs),

    /// Run the route guard for a path
    Guard(guard::GuardArgs),

    /// Show the stored client state
    Storage(storage::StorageArgs),
}

pub async fn handle(cmd: Commands, config: &Config) -> Result<()> {
    match cmd {
        Commands::Login(args) => login::run(args, config).await,
        Commands::Google(args) => google::run(args, config).await,
        Commands::Logout(args) => logout::run(args, config).await,
        Commands::Whoami(args) => whoami::run(args, config).await,
        Commands::RefreshToken(args) => refresh_token::run(args, config).await,
        Commands::Profile(cmd) => profile::handle(cmd, config).await,
        Commands::Register(args) => register::run(args, config).await,
        Commands::PasswordReset(cmd) => password_reset::handle(cmd, config).await,
        Commands::Request(args) => request::run(args, config).await,
        Commands::Guard(args) => guard::run(args, config).await,
        Commands::Storage(args) => storage::run(args, config).await,
    }
}

/// Print what the access token says about its holder.
fn print_claims(token: &str) {
    let claims = match Claims::decode(token) {
        Ok(claims) => claims,
        Err(e) => {
            output::field("Token", &format!("unreadable ({})", e));
            return;
        }
    };

    if let Some(email) = &claims.email {
        output::field("Email", email);
    }
    if let Some(name) = claims.display_name() {
        output::field("Name", &name);
    }
    if let Some(role) = &claims.role {
        output::field("Role", role.as_str());
    }
    if let Some(id) = &claims.user_id {
        output::field("User ID", &id.to_string());
    }
    if let Some(expires) = claims.exp.and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0)) {
        let state = if expires <= Utc::now() { " (expired)" } else { "" };
        output::field("Expires", &format!("{}{}", expires.to_rfc3339(), state));
    }
}
