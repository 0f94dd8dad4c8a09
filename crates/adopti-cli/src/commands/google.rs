//! Google sign-in command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use adopti_http::{ProviderAccount, ProviderProfile, SessionBridge};

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct GoogleArgs {
    /// Google identity token (JWT)
    #[arg(long, env = "ADOPTI_GOOGLE_ID_TOKEN", hide_env_values = true)]
    pub id_token: Option<String>,

    /// Google OAuth access token
    #[arg(long)]
    pub access_token: Option<String>,

    /// Display name reported by Google
    #[arg(long)]
    pub name: Option<String>,

    /// Email reported by Google
    #[arg(long)]
    pub email: Option<String>,

    /// Avatar URL reported by Google
    #[arg(long)]
    pub image: Option<String>,

    /// Where to land after sign-in
    #[arg(long, default_value = "/")]
    pub callback_url: String,
}

pub async fn run(args: GoogleArgs, config: &Config) -> Result<()> {
    let bridge = SessionBridge::new(config.backend()?, config.storage(), config.site.clone());
    let account = ProviderAccount::google(args.id_token, args.access_token);
    let profile = ProviderProfile {
        name: args.name,
        email: args.email,
        image: args.image,
    };

    eprintln!("{}", "Exchanging Google identity...".dimmed());

    let session = bridge
        .sign_in(&account, profile)
        .await
        .context("Google sign-in failed")?;

    output::success("Signed in with Google");
    println!();
    for key in ["email", "name", "nom", "prenom", "role"] {
        if let Some(value) = session.user.get(key).and_then(|v| v.as_str()) {
            output::field(key, value);
        }
    }
    output::redirect(bridge.redirect(&args.callback_url).as_str());

    Ok(())
}
