//! Endpoint paths and request/response types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Endpoint Paths (relative to the API base)
// ============================================================================

pub const LOGIN: &str = "/auth/login/";

pub const GOOGLE_EXCHANGE: &str = "/auth/google/";

pub const REFRESH: &str = "/auth/refresh/";

pub const REGISTER: &str = "/auth/register/";

pub const PASSWORD_RESET: &str = "/auth/password-reset/";

pub const PASSWORD_RESET_CONFIRM: &str = "/auth/password-reset/confirm/";

pub const PROFILE: &str = "/auth/profile/";

pub const PROFILE_UPDATE: &str = "/auth/profile/update/";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login.
#[derive(Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Value,
}

/// Request body for the Google exchange.
#[derive(Serialize)]
pub struct GoogleExchangeRequest<'a> {
    pub id_token: &'a str,
    pub access_token: Option<&'a str>,
}

/// Response from the Google exchange.
#[derive(Deserialize)]
pub struct GoogleExchangeResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user: Value,
}

/// Request body for refresh.
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response from refresh.
/// `refresh` is only present when the backend rotates refresh tokens.
#[derive(Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Request body for a password reset link.
#[derive(Debug, Serialize)]
pub struct PasswordResetRequest<'a> {
    pub email: &'a str,
}

/// `{"message": ...}` acknowledgements.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// Token and password fields never reach logs.

const REDACTED: &str = "[REDACTED]";

impl fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access", &REDACTED)
            .field("refresh", &REDACTED)
            .field("user", &self.user)
            .finish()
    }
}

impl fmt::Debug for GoogleExchangeRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleExchangeRequest")
            .field("id_token", &REDACTED)
            .field("access_token", &self.access_token.map(|_| REDACTED))
            .finish()
    }
}

impl fmt::Debug for GoogleExchangeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleExchangeResponse")
            .field("access_token", &REDACTED)
            .field("refresh_token", &REDACTED)
            .field("user", &self.user)
            .finish()
    }
}

impl fmt::Debug for RefreshRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for RefreshResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshResponse")
            .field("access", &REDACTED)
            .field("refresh", &self.refresh.as_ref().map(|_| REDACTED))
            .finish()
    }
}
