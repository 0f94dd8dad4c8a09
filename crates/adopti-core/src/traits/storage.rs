//! Client storage trait.
//!
//! All reads and writes of persisted client state go through one
//! [`ClientStorage`] object: the key/value store that holds the tokens,
//! the cached user and the shopping state, plus the cookie copies of the
//! tokens that the route guard inspects.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::{AccessToken, RefreshToken, Result, TokenPair};

/// Max-age given to the token cookies on login.
pub const LOGIN_COOKIE_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Keys of the persisted key/value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    AccessToken,
    RefreshToken,
    User,
    Cart,
    Wishlist,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::AccessToken,
        StorageKey::RefreshToken,
        StorageKey::User,
        StorageKey::Cart,
        StorageKey::Wishlist,
    ];

    /// The persisted key name. Token keys double as cookie names.
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::AccessToken => "access_token",
            StorageKey::RefreshToken => "refresh_token",
            StorageKey::User => "user",
            StorageKey::Cart => "cart",
            StorageKey::Wishlist => "wishlist",
        }
    }

    /// True for keys holding credentials.
    pub fn is_secret(self) -> bool {
        matches!(self, StorageKey::AccessToken | StorageKey::RefreshToken)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistent client state: a key/value store plus a cookie jar.
///
/// Implementations provide the raw operations; token and user helpers
/// are built on top of them. There is no locking across calls, the
/// last writer wins.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Read a key.
    async fn get(&self, key: StorageKey) -> Result<Option<String>>;

    /// Write a key.
    async fn set(&self, key: StorageKey, value: &str) -> Result<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn remove(&self, key: StorageKey) -> Result<()>;

    /// Read a cookie. Expired cookies read as `None`.
    async fn cookie(&self, name: &str) -> Result<Option<String>>;

    /// Write a cookie with an optional max-age.
    async fn set_cookie(&self, name: &str, value: &str, max_age: Option<Duration>) -> Result<()>;

    /// Expire a cookie immediately.
    async fn expire_cookie(&self, name: &str) -> Result<()>;

    /// The stored access token, if any.
    async fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self.get(StorageKey::AccessToken).await?.map(AccessToken::new))
    }

    /// The stored refresh token, if any.
    async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(self
            .get(StorageKey::RefreshToken)
            .await?
            .map(RefreshToken::new))
    }

    /// Replace the stored token pair and mirror it into the cookies.
    async fn save_tokens(&self, pair: &TokenPair) -> Result<()> {
        self.set(StorageKey::AccessToken, pair.access.as_str())
            .await?;
        self.set(StorageKey::RefreshToken, pair.refresh.as_str())
            .await?;
        self.set_cookie(
            StorageKey::AccessToken.as_str(),
            pair.access.as_str(),
            Some(LOGIN_COOKIE_MAX_AGE),
        )
        .await?;
        self.set_cookie(
            StorageKey::RefreshToken.as_str(),
            pair.refresh.as_str(),
            Some(LOGIN_COOKIE_MAX_AGE),
        )
        .await?;
        debug!("Stored token pair");
        Ok(())
    }

    /// The cached user record.
    async fn cached_user(&self) -> Result<Option<Value>> {
        let Some(raw) = self.get(StorageKey::User).await? else {
            return Ok(None);
        };
        let user = serde_json::from_str(&raw).map_err(|e| StorageError::InvalidValue {
            key: StorageKey::User.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(user))
    }

    /// Cache the user record.
    async fn save_user(&self, user: &Value) -> Result<()> {
        self.set(StorageKey::User, &user.to_string()).await
    }

    /// Store a freshly issued token pair together with its user record.
    ///
    /// Either both land or neither does: if any write fails the
    /// credentials are cleared before the error is returned.
    async fn save_session(&self, pair: &TokenPair, user: &Value) -> Result<()> {
        let saved: Result<()> = async {
            self.save_tokens(pair).await?;
            if !user.is_null() {
                self.save_user(user).await?;
            }
            Ok(())
        }
        .await;

        if let Err(err) = saved {
            if let Err(cleanup) = self.clear_credentials().await {
                warn!(error = %cleanup, "Could not clear partially stored session");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Forget the signed-in user: tokens, cached user and token cookies.
    ///
    /// Cart and wishlist are kept.
    async fn clear_credentials(&self) -> Result<()> {
        self.remove(StorageKey::AccessToken).await?;
        self.remove(StorageKey::RefreshToken).await?;
        self.remove(StorageKey::User).await?;
        self.expire_cookie(StorageKey::AccessToken.as_str()).await?;
        self.expire_cookie(StorageKey::RefreshToken.as_str())
            .await?;
        debug!("Cleared stored credentials");
        Ok(())
    }
}
