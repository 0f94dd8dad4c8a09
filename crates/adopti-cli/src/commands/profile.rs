//! Profile commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use adopti_http::{FilePart, ProfileUpdate};

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfileSubcommand {
    /// Show the signed-in user's profile
    Show,

    /// Update profile fields
    Update(UpdateArgs),
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[arg(long)]
    pub nom: Option<String>,

    #[arg(long)]
    pub prenom: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub telephone: Option<String>,

    #[arg(long)]
    pub adresse: Option<String>,

    /// Image file to upload as the avatar
    #[arg(long)]
    pub avatar: Option<PathBuf>,
}

pub async fn handle(cmd: ProfileCommand, config: &Config) -> Result<()> {
    let fetch = config.fetch()?;

    match cmd.command {
        ProfileSubcommand::Show => {
            let profile = fetch.profile().await.context("Failed to load profile")?;
            output::json_pretty(&profile)
        }
        ProfileSubcommand::Update(args) => {
            let avatar = match &args.avatar {
                Some(path) => Some(read_avatar(path).await?),
                None => None,
            };
            let update = ProfileUpdate {
                nom: args.nom,
                prenom: args.prenom,
                email: args.email,
                telephone: args.telephone,
                adresse: args.adresse,
                avatar,
            };

            let updated = fetch
                .update_profile(&update)
                .await
                .context("Failed to update profile")?;

            output::success("Profile updated");
            output::json_pretty(&updated)
        }
    }
}

async fn read_avatar(path: &Path) -> Result<FilePart> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "avatar".to_string());

    Ok(FilePart {
        field: "avatar".to_string(),
        mime: image_mime(path).map(str::to_string),
        file_name,
        bytes,
    })
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
