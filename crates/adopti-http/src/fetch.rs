//! Authenticated fetch.
//!
//! Every call carries the stored access token. An unauthorized answer
//! triggers at most one refresh and at most one retry; the retry's answer
//! is final whatever its status. A refresh that cannot happen or is
//! refused signs the user out and sends them to the login page.
//!
//! Refreshes are single-flight: callers that hit 401 while another caller
//! is refreshing wait for it and reuse the token it stored.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use adopti_core::error::{AuthError, Error};
use adopti_core::{
    AccessToken, AuthBackend, ClientStorage, LOGIN_PATH, Navigator, Result, TokenPair,
};

use crate::backend::HttpBackend;
use crate::client::ApiClient;
use crate::request::ApiRequest;

/// Bearer-injecting HTTP access with one transparent token refresh.
///
/// Cheap to clone; clones share the refresh lock.
#[derive(Clone)]
pub struct AuthenticatedFetch {
    inner: Arc<FetchInner>,
}

struct FetchInner {
    client: ApiClient,
    backend: Arc<dyn AuthBackend>,
    storage: Arc<dyn ClientStorage>,
    navigator: Arc<dyn Navigator>,
    refresh_lock: Mutex<()>,
}

impl AuthenticatedFetch {
    pub fn new(
        client: ApiClient,
        backend: Arc<dyn AuthBackend>,
        storage: Arc<dyn ClientStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            inner: Arc::new(FetchInner {
                client,
                backend,
                storage,
                navigator,
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    /// Build on an [`HttpBackend`], sharing its client.
    pub fn from_backend(
        backend: HttpBackend,
        storage: Arc<dyn ClientStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let client = backend.client().clone();
        Self::new(client, Arc::new(backend), storage, navigator)
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    pub fn storage(&self) -> &Arc<dyn ClientStorage> {
        &self.inner.storage
    }

    /// Send a request, refreshing and retrying once on 401.
    ///
    /// Returns the final response whatever its status; callers check it.
    ///
    /// # Errors
    ///
    /// Transport failures, [`AuthError::NoRefreshToken`] and
    /// [`AuthError::RefreshRejected`]. Both auth errors are raised after
    /// the stored credentials were cleared and the user sent to login.
    #[instrument(skip(self, request), fields(method = %request.method, target = %request.target))]
    pub async fn send(&self, request: ApiRequest) -> Result<reqwest::Response> {
        let token = self.inner.storage.access_token().await?;
        let response = self.inner.client.execute(&request, token.as_ref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Unauthorized, attempting refresh");
        let fresh = self.refresh_after(token.as_ref()).await?;
        let retried = self.inner.client.execute(&request, Some(&fresh)).await?;

        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!("Retry still unauthorized");
        }
        Ok(retried)
    }

    /// Send a request and decode a success body, or return the
    /// normalized [`ApiError`](adopti_core::ApiError).
    pub async fn json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let response = self.send(request).await?;
        ApiClient::handle_response(response).await
    }

    pub async fn get(&self, target: &str) -> Result<reqwest::Response> {
        self.send(ApiRequest::get(target)).await
    }

    pub async fn post_json(&self, target: &str, body: Value) -> Result<reqwest::Response> {
        self.send(ApiRequest::post(target).json(body)).await
    }

    pub async fn put_json(&self, target: &str, body: Value) -> Result<reqwest::Response> {
        self.send(ApiRequest::put(target).json(body)).await
    }

    pub async fn delete(&self, target: &str) -> Result<reqwest::Response> {
        self.send(ApiRequest::delete(target)).await
    }

    /// Refresh now, regardless of the current token's state.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken> {
        let current = self.inner.storage.access_token().await?;
        self.refresh_after(current.as_ref()).await
    }

    /// Obtain a token newer than `stale`, refreshing if nobody else has.
    async fn refresh_after(&self, stale: Option<&AccessToken>) -> Result<AccessToken> {
        let _guard = self.inner.refresh_lock.lock().await;

        let current = self.inner.storage.access_token().await?;
        if let Some(current) = current
            && Some(&current) != stale
        {
            debug!("Token already refreshed by a concurrent request");
            return Ok(current);
        }

        let Some(refresh_token) = self.inner.storage.refresh_token().await? else {
            warn!("No refresh token available");
            self.force_logout().await?;
            return Err(AuthError::NoRefreshToken.into());
        };

        info!("Refreshing access token");
        match self.inner.backend.refresh(&refresh_token).await {
            Ok(output) => {
                let access = output.access;
                let refresh = output.refresh.unwrap_or(refresh_token);
                let pair = TokenPair {
                    access: access.clone(),
                    refresh,
                };
                self.inner.storage.save_tokens(&pair).await?;
                debug!("Access token refreshed");
                Ok(access)
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed");
                self.force_logout().await?;
                Err(match err {
                    Error::Api(api) => AuthError::RefreshRejected {
                        status: api.status,
                        message: api.message,
                    }
                    .into(),
                    other => other,
                })
            }
        }
    }

    async fn force_logout(&self) -> Result<()> {
        self.inner.storage.clear_credentials().await?;
        self.inner.navigator.navigate(LOGIN_PATH);
        Ok(())
    }
}

impl std::fmt::Debug for AuthenticatedFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedFetch")
            .field("api", self.inner.client.api())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
