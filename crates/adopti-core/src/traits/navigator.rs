//! Navigation trait.

/// Where the client sends the user after a forced sign-out.
pub const LOGIN_PATH: &str = "/login";

/// Receives the client's navigation requests.
///
/// The token layer navigates only on irrecoverable authentication failure;
/// the front end decides what navigating means.
pub trait Navigator: Send + Sync {
    /// Send the user to a site-relative location.
    fn navigate(&self, location: &str);
}
