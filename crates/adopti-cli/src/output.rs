//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use adopti_core::ApiError;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Announce a navigation.
pub fn redirect(target: &str) {
    println!("{} {}", "→".yellow(), target);
}

/// Print a normalized backend error with its field messages.
pub fn api_error(err: &ApiError) {
    error(&format!("HTTP {} ({:?}): {}", err.status, err.kind, err.message));
    if let Some(fields) = &err.fields {
        for (name, messages) in fields {
            eprintln!("  {}: {}", name.dimmed(), messages.join("; "));
        }
    }
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
