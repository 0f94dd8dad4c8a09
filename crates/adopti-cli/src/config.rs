//! Runtime configuration resolved from the global options.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;
use url::Url;

use adopti_core::ApiUrl;
use adopti_http::{AuthenticatedFetch, HttpBackend};
use adopti_store::FileStorage;

use crate::cli::Cli;
use crate::navigator::CliNavigator;

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiUrl,
    pub site: Url,
    pub storage_path: PathBuf,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let api = ApiUrl::new(&cli.api_url).context("Invalid API URL")?;
        let site = Url::parse(&cli.site_url).context("Invalid site URL")?;
        let storage_path = match &cli.storage {
            Some(path) => path.clone(),
            None => default_storage_path()?,
        };

        debug!(api = %api, site = %site, storage = %storage_path.display(), "Configuration");
        Ok(Self {
            api,
            site,
            storage_path,
        })
    }

    pub fn storage(&self) -> Arc<FileStorage> {
        Arc::new(FileStorage::new(&self.storage_path))
    }

    pub fn navigator(&self) -> Arc<CliNavigator> {
        Arc::new(CliNavigator::new(self.site.clone()))
    }

    pub fn backend(&self) -> Result<HttpBackend> {
        HttpBackend::new(self.api.clone()).context("Failed to create HTTP client")
    }

    /// Authenticated access over the configured storage.
    pub fn fetch(&self) -> Result<AuthenticatedFetch> {
        Ok(AuthenticatedFetch::from_backend(
            self.backend()?,
            self.storage(),
            self.navigator(),
        ))
    }
}

fn default_storage_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "adopti").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("storage.json"))
}
