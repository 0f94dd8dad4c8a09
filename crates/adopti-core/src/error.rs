//! Error types for the Adopti client.
//!
//! One error type covers every failure the client can report: transport
//! failures, authentication failures handled by the token layer, backend
//! rejections normalized into [`ApiError`], client-side validation and
//! local storage problems.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The unified error type for Adopti client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (missing refresh token, rejected refresh, OAuth exchange).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The backend rejected the request.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Client-side validation errors, detected before any request is sent.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Token store read/write failures.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns the normalized backend error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// The response body could not be decoded.
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A request came back unauthorized and no refresh token is stored.
    #[error("no refresh token")]
    NoRefreshToken,

    /// The refresh endpoint refused the refresh token.
    #[error("refresh token rejected (HTTP {status}): {message}")]
    RefreshRejected { status: u16, message: String },

    /// The OAuth provider account carries no identity token.
    #[error("no ID token available")]
    MissingIdToken,

    /// The backend refused the OAuth token exchange.
    #[error("token exchange failed: {message}")]
    ExchangeFailed { message: String },

    /// An operation needs a signed-in user and no access token is stored.
    #[error("not signed in")]
    NotSignedIn,
}

/// Broad classification of a backend rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 400 or 422: the payload failed backend validation.
    Validation,
    /// 401.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// Any 5xx.
    Server,
    /// Anything else that is not a success.
    Other,
}

impl ApiErrorKind {
    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => ApiErrorKind::Validation,
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            500..=599 => ApiErrorKind::Server,
            _ => ApiErrorKind::Other,
        }
    }
}

/// A backend rejection in one normalized shape.
///
/// The backend answers errors as `{"detail": ...}`, `{"error": ...}`,
/// `{"message": ...}` or a serializer map of `field -> [messages]`.
/// [`ApiError::from_body`] folds all of these into `kind`, `message`
/// and optional per-field messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Classification derived from the status.
    pub kind: ApiErrorKind,
    /// HTTP status code.
    pub status: u16,
    /// Human readable message.
    pub message: String,
    /// Per-field validation messages, if the backend sent any.
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

const MESSAGE_KEYS: [&str; 3] = ["detail", "error", "message"];

impl ApiError {
    /// Create an error with an explicit message and no field details.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::from_status(status),
            status,
            message: message.into(),
            fields: None,
        }
    }

    /// Normalize a raw error body.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
            let text = String::from_utf8_lossy(body).trim().to_string();
            let message = if text.is_empty() || text.starts_with('<') {
                default_reason(status)
            } else {
                text
            };
            return Self::new(status, message);
        };

        let mut fields = BTreeMap::new();
        for (key, value) in &map {
            if MESSAGE_KEYS.contains(&key.as_str()) {
                continue;
            }
            let messages = messages_of(value);
            if !messages.is_empty() {
                fields.insert(key.clone(), messages);
            }
        }

        let message = MESSAGE_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .flat_map(messages_of)
            .next()
            .or_else(|| {
                fields
                    .iter()
                    .find_map(|(field, messages)| {
                        messages.first().map(|m| {
                            if field == "non_field_errors" {
                                m.clone()
                            } else {
                                format!("{}: {}", field, m)
                            }
                        })
                    })
            })
            .unwrap_or_else(|| default_reason(status));

        Self {
            kind: ApiErrorKind::from_status(status),
            status,
            message,
            fields: (!fields.is_empty()).then_some(fields),
        }
    }

    /// Messages for one field, if the backend reported any.
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields
            .as_ref()
            .and_then(|f| f.get(name))
            .map(Vec::as_slice)
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn default_reason(status: u16) -> String {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Request failed")
        .to_string()
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A token could not be decoded.
    #[error("invalid token: {reason}")]
    Token { reason: String },

    /// A required form field is empty.
    #[error("Please fill in all fields")]
    MissingFields,

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Token store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be parsed.
    #[error("corrupt storage: {reason}")]
    Corrupt { reason: String },

    /// A stored value is not what the caller expected.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
