//! adopti-core - Core types and traits for the Adopti client.

pub mod claims;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod tokens;
pub mod traits;
pub mod types;

pub use claims::{Claims, Role};
pub use credentials::Credentials;
pub use error::{ApiError, ApiErrorKind, Error};
pub use guard::{GuardDecision, RouteGuard};
pub use tokens::{AccessToken, RefreshToken, TokenPair};
pub use traits::{AuthBackend, ClientStorage, LOGIN_PATH, Navigator, StorageKey};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
