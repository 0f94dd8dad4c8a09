//! The stored client state.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use adopti_core::StorageKey;

/// A cookie value with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredCookie {
    pub value: String,
    /// `None` means a session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredCookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Key/value entries plus the cookie jar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Document {
    #[serde(default)]
    pub local: BTreeMap<String, String>,
    #[serde(default)]
    pub cookies: BTreeMap<String, StoredCookie>,
}

impl Document {
    pub fn get(&self, key: StorageKey) -> Option<String> {
        self.local.get(key.as_str()).cloned()
    }

    pub fn set(&mut self, key: StorageKey, value: &str) {
        self.local.insert(key.as_str().to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: StorageKey) {
        self.local.remove(key.as_str());
    }

    pub fn cookie(&self, name: &str, now: DateTime<Utc>) -> Option<String> {
        self.cookies
            .get(name)
            .filter(|c| c.is_live(now))
            .map(|c| c.value.clone())
    }

    pub fn set_cookie(
        &mut self,
        name: &str,
        value: &str,
        max_age: Option<Duration>,
        now: DateTime<Utc>,
    ) {
        let expires_at = max_age
            .and_then(|age| chrono::Duration::from_std(age).ok())
            .map(|age| now + age);
        self.cookies.insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    pub fn expire_cookie(&mut self, name: &str) {
        self.cookies.remove(name);
    }

    /// Drop cookies whose expiry has passed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.cookies.retain(|_, c| c.is_live(now));
    }
}
