//! HTTP implementation of the authentication backend.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument};

use adopti_core::traits::{ExchangeOutput, LoginOutput, RefreshOutput};
use adopti_core::{
    AccessToken, ApiUrl, AuthBackend, Credentials, RefreshToken, Result, TokenPair,
};

use crate::account::{PasswordReset, Registration};
use crate::client::ApiClient;
use crate::endpoints::*;

/// The backend's unauthenticated endpoints over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: ApiClient,
}

impl HttpBackend {
    /// Create a backend for the given API base.
    pub fn new(api: ApiUrl) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(api)?,
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Create an account. Returns the created user record.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<Value> {
        registration.validate()?;
        info!("Registering account");
        self.client.post_json(REGISTER, registration).await
    }

    /// Ask for a password reset link by email.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>> {
        let response: MessageResponse = self
            .client
            .post_json(PASSWORD_RESET, &PasswordResetRequest { email })
            .await?;
        Ok(response.message)
    }

    /// Set a new password with a reset token.
    #[instrument(skip(self, reset), fields(email = %reset.email))]
    pub async fn confirm_password_reset(&self, reset: &PasswordReset) -> Result<Option<String>> {
        reset.validate()?;
        let response: MessageResponse = self
            .client
            .post_json(PASSWORD_RESET_CONFIRM, reset)
            .await?;
        Ok(response.message)
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn login(&self, credentials: &Credentials) -> Result<LoginOutput> {
        credentials.validate()?;

        let request = LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        };

        let response: LoginResponse = self.client.post_json(LOGIN, &request).await?;
        debug!("Login accepted");

        Ok(LoginOutput {
            tokens: TokenPair::new(response.access, response.refresh),
            user: response.user,
        })
    }

    #[instrument(skip_all)]
    async fn exchange_google(
        &self,
        id_token: &str,
        access_token: Option<&str>,
    ) -> Result<ExchangeOutput> {
        let request = GoogleExchangeRequest {
            id_token,
            access_token,
        };

        let response: GoogleExchangeResponse =
            self.client.post_json(GOOGLE_EXCHANGE, &request).await?;
        debug!("Identity token exchanged");

        Ok(ExchangeOutput {
            tokens: TokenPair::new(response.access_token, response.refresh_token),
            user: response.user,
        })
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<RefreshOutput> {
        let request = RefreshRequest {
            refresh: refresh_token.as_str(),
        };

        let response: RefreshResponse = self.client.post_json(REFRESH, &request).await?;

        Ok(RefreshOutput {
            access: AccessToken::new(response.access),
            refresh: response.refresh.map(RefreshToken::new),
        })
    }
}
