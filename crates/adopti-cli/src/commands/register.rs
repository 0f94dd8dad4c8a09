//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;

use adopti_core::Role;
use adopti_http::Registration;

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub nom: String,

    #[arg(long)]
    pub prenom: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub telephone: String,

    /// Proprietaire, Responsable or Promeneur
    #[arg(long, default_value = "Proprietaire")]
    pub role: String,

    #[arg(long)]
    pub adresse: String,

    #[arg(long, env = "ADOPTI_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: RegisterArgs, config: &Config) -> Result<()> {
    let backend = config.backend()?;
    let registration = Registration {
        nom: args.nom,
        prenom: args.prenom,
        email: args.email,
        telephone: args.telephone,
        role: Role::from(args.role.as_str()),
        adresse: args.adresse,
        password: args.password,
    };

    let user = backend
        .register(&registration)
        .await
        .context("Failed to register")?;

    output::success("Account created");
    output::json_pretty(&user)
}
