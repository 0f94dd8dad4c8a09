//! Authentication backend trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::{AccessToken, Credentials, RefreshToken, Result, TokenPair};

/// Output from a credentials login.
#[derive(Debug, Clone)]
pub struct LoginOutput {
    /// The issued token pair.
    pub tokens: TokenPair,
    /// The user record returned alongside the tokens.
    pub user: Value,
}

/// Output from an OAuth identity-token exchange.
#[derive(Debug, Clone)]
pub struct ExchangeOutput {
    /// The application token pair issued for the provider identity.
    pub tokens: TokenPair,
    /// The backend's profile for the identity.
    pub user: Value,
}

/// Output from a token refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutput {
    /// The new access token.
    pub access: AccessToken,
    /// The rotated refresh token, when the backend rotates.
    pub refresh: Option<RefreshToken>,
}

/// The token-issuing endpoints of the backend.
///
/// Every method answers a non-success status with
/// [`Error::Api`](crate::Error::Api).
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange email and password for a token pair.
    async fn login(&self, credentials: &Credentials) -> Result<LoginOutput>;

    /// Exchange a provider identity token for an application token pair.
    async fn exchange_google(
        &self,
        id_token: &str,
        access_token: Option<&str>,
    ) -> Result<ExchangeOutput>;

    /// Obtain a new access token from a refresh token.
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<RefreshOutput>;
}
