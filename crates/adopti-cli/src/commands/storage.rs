//! Storage inspection command.

use anyhow::{Context, Result};
use clap::Args;

use adopti_core::{ClientStorage, StorageKey};

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct StorageArgs {
    /// Print secret values instead of hiding them
    #[arg(long)]
    pub reveal: bool,
}

pub async fn run(args: StorageArgs, config: &Config) -> Result<()> {
    let storage = config.storage();
    output::field("File", &storage.path().display().to_string());

    for key in StorageKey::ALL {
        let value = storage.get(key).await.context("Failed to read storage")?;
        output::field(key.as_str(), &describe(value.as_deref(), key.is_secret() && !args.reveal));
    }

    for key in [StorageKey::AccessToken, StorageKey::RefreshToken] {
        let cookie = storage
            .cookie(key.as_str())
            .await
            .context("Failed to read storage")?;
        let label = format!("cookie {}", key);
        output::field(&label, &describe(cookie.as_deref(), !args.reveal));
    }

    Ok(())
}

fn describe(value: Option<&str>, hide: bool) -> String {
    match value {
        None => "-".to_string(),
        Some(v) if hide => format!("set ({} chars)", v.len()),
        Some(v) => v.to_string(),
    }
}
