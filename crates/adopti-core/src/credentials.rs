//! Login credentials type.

use std::fmt;

use crate::error::InvalidInputError;

/// Email/password credentials for the Adopti login endpoint.
///
/// # Security
///
/// The password is never exposed in Debug output.
///
/// # Example
///
/// ```
/// use adopti_core::Credentials;
///
/// let creds = Credentials::new("alice@example.com", "s3cret");
/// assert_eq!(creds.email(), "alice@example.com");
/// assert!(creds.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the account email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Reject empty fields before anything is sent.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(InvalidInputError::MissingFields);
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
