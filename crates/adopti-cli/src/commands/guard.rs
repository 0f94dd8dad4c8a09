//! Route guard command implementation.

use anyhow::{Context, Result};
use clap::Args;

use adopti_core::{GuardDecision, RouteGuard};

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct GuardArgs {
    /// Site path to check, e.g. /admin/animaux
    pub path: String,

    /// Guarded path patterns [default: /admin/:path* and /home]
    #[arg(long = "matcher")]
    pub matchers: Vec<String>,
}

pub async fn run(args: GuardArgs, config: &Config) -> Result<()> {
    let guard = if args.matchers.is_empty() {
        RouteGuard::default()
    } else {
        RouteGuard::new(&args.matchers)
    };
    let storage = config.storage();
    let navigator = config.navigator();

    let decision = guard
        .enforce(storage.as_ref(), &args.path)
        .await
        .context("Failed to read storage")?;

    match decision {
        GuardDecision::Allow => {
            output::success(&format!("Allowed: {}", args.path));
        }
        GuardDecision::Redirect {
            location,
            clear_access_cookie,
        } => {
            if clear_access_cookie {
                output::field("Cookie", "access_token cleared");
            }
            output::redirect(&navigator.absolute(location));
        }
    }

    Ok(())
}
