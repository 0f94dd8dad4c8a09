//! Raw authenticated request.

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;

use adopti_http::{ApiClient, ApiRequest, Method};

use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method
    pub method: String,

    /// Path under the API base (e.g. /animals/animaux/) or an absolute URL
    pub target: String,

    /// JSON body
    #[arg(long)]
    pub body: Option<String>,
}

pub async fn run(args: RequestArgs, config: &Config) -> Result<()> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .context("Invalid HTTP method")?;

    let mut request = ApiRequest::new(method, &args.target);
    if let Some(body) = &args.body {
        let body: Value = serde_json::from_str(body).context("Body is not valid JSON")?;
        request = request.json(body);
    }

    let fetch = config.fetch()?;
    let response = fetch.send(request).await.context("Request failed")?;
    let status = response.status();

    if !status.is_success() {
        let err = ApiClient::api_error(response).await;
        output::api_error(&err);
        bail!("{} {} returned {}", args.method.to_ascii_uppercase(), args.target, status);
    }

    let bytes = response.bytes().await.context("Failed to read response body")?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(json) => output::json_pretty(&json)?,
        Err(_) if bytes.is_empty() => output::success(status.as_str()),
        Err(_) => println!("{}", String::from_utf8_lossy(&bytes)),
    }

    Ok(())
}
