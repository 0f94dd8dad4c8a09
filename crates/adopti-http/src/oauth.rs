//! OAuth session bridge.
//!
//! Turns a provider sign-in (Google) into an application token pair by
//! exchanging the provider's identity token with the backend. The pair is
//! written to the client storage, which stays the only source of truth
//! for tokens: the session token keeps the pair it was issued with, but
//! projections read the stored pair first so a later refresh is visible.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};
use url::Url;

use adopti_core::error::{AuthError, Error};
use adopti_core::{AccessToken, AuthBackend, ClientStorage, RefreshToken, Result};

/// The provider account handed over at sign-in.
#[derive(Clone)]
pub struct ProviderAccount {
    pub provider: String,
    pub id_token: Option<String>,
    pub access_token: Option<String>,
}

impl ProviderAccount {
    /// A Google account with the given tokens.
    pub fn google(id_token: Option<String>, access_token: Option<String>) -> Self {
        Self {
            provider: "google".to_string(),
            id_token,
            access_token,
        }
    }
}

impl std::fmt::Debug for ProviderAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderAccount")
            .field("provider", &self.provider)
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// What the provider tells us about the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Session token: the provider profile plus what the exchange issued.
#[derive(Debug, Clone, Default)]
pub struct SessionToken {
    pub profile: ProviderProfile,
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
    pub user_profile: Option<Value>,
}

/// The session as pages see it.
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub user: Map<String, Value>,
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
}

/// Bridges provider sign-ins to application tokens.
pub struct SessionBridge<B> {
    backend: B,
    storage: Arc<dyn ClientStorage>,
    site_url: Url,
}

impl<B: AuthBackend> SessionBridge<B> {
    pub fn new(backend: B, storage: Arc<dyn ClientStorage>, site_url: Url) -> Self {
        Self {
            backend,
            storage,
            site_url,
        }
    }

    pub fn site_url(&self) -> &Url {
        &self.site_url
    }

    /// Session token callback.
    ///
    /// Without an account (every call after sign-in) the token is returned
    /// unchanged. With one, the identity token is exchanged and the result
    /// embedded in the token and written to storage.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingIdToken`] when the account has no identity
    /// token, [`AuthError::ExchangeFailed`] when the backend refuses the
    /// exchange, and transport errors as they are. Nothing is stored on
    /// failure.
    #[instrument(skip_all, fields(provider = account.map(|a| a.provider.as_str())))]
    pub async fn jwt(
        &self,
        mut token: SessionToken,
        account: Option<&ProviderAccount>,
    ) -> Result<SessionToken> {
        let Some(account) = account else {
            return Ok(token);
        };

        let Some(id_token) = account.id_token.as_deref() else {
            warn!("Provider account has no identity token");
            return Err(AuthError::MissingIdToken.into());
        };

        let output = self
            .backend
            .exchange_google(id_token, account.access_token.as_deref())
            .await
            .map_err(|err| match err {
                Error::Api(api) => {
                    warn!(status = api.status, "Backend refused the identity token");
                    Error::from(AuthError::ExchangeFailed {
                        message: api.message,
                    })
                }
                other => other,
            })?;

        self.storage
            .save_session(&output.tokens, &output.user)
            .await?;
        info!("Provider sign-in exchanged");

        token.access_token = Some(output.tokens.access);
        token.refresh_token = Some(output.tokens.refresh);
        token.user_profile = Some(output.user);
        Ok(token)
    }

    /// Project a session token for pages.
    ///
    /// The exchanged profile overlays the provider profile. Tokens come
    /// from storage, falling back to the ones embedded at sign-in.
    pub async fn session(&self, token: &SessionToken) -> Result<ClientSession> {
        let mut user = match serde_json::to_value(&token.profile) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        if let Some(Value::Object(profile)) = &token.user_profile {
            for (key, value) in profile {
                user.insert(key.clone(), value.clone());
            }
        }

        let access_token = match self.storage.access_token().await? {
            Some(stored) => Some(stored),
            None => token.access_token.clone(),
        };
        let refresh_token = match self.storage.refresh_token().await? {
            Some(stored) => Some(stored),
            None => token.refresh_token.clone(),
        };

        Ok(ClientSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Post-login destination. Only same-origin targets are honored.
    pub fn redirect(&self, target: &str) -> Url {
        let candidate = if target.starts_with('/') {
            self.site_url.join(target)
        } else {
            Url::parse(target)
        };

        match candidate {
            Ok(url) if url.origin() == self.site_url.origin() => url,
            _ => {
                debug!(target, "Redirect target is off-site, using site root");
                self.site_url.clone()
            }
        }
    }

    /// Complete a provider sign-in and return the resulting session.
    pub async fn sign_in(
        &self,
        account: &ProviderAccount,
        profile: ProviderProfile,
    ) -> Result<ClientSession> {
        let token = SessionToken {
            profile,
            ..Default::default()
        };
        let token = self.jwt(token, Some(account)).await?;
        self.session(&token).await
    }
}

impl<B> std::fmt::Debug for SessionBridge<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBridge")
            .field("site_url", &self.site_url.as_str())
            .finish_non_exhaustive()
    }
}
