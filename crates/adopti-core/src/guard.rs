//! Route guard.
//!
//! Runs before a protected page is served and decides, from the cookie
//! copy of the access token alone, whether the navigation goes through.
//! It never refreshes: it has no access to the refresh token.

use tracing::{debug, info, instrument, warn};

use crate::claims::{Claims, Role};
use crate::traits::{ClientStorage, LOGIN_PATH, StorageKey};
use crate::Result;

/// Prefix of the admin area.
pub const ADMIN_PREFIX: &str = "/admin";

/// Where role mismatches are sent.
pub const HOME_PATH: &str = "/";

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Serve the page.
    Allow,
    /// Send the user elsewhere.
    Redirect {
        location: &'static str,
        /// The access-token cookie must be wiped.
        clear_access_cookie: bool,
    },
}

impl GuardDecision {
    fn to_login(clear_access_cookie: bool) -> Self {
        GuardDecision::Redirect {
            location: LOGIN_PATH,
            clear_access_cookie,
        }
    }
}

/// A path pattern: literal segments with an optional trailing
/// zero-or-more wildcard (`/admin/:path*`).
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathPattern {
    segments: Vec<String>,
    open_ended: bool,
}

impl PathPattern {
    fn parse(pattern: &str) -> Self {
        let mut segments: Vec<String> = split_segments(pattern).map(str::to_string).collect();
        let open_ended = segments
            .last()
            .is_some_and(|s| s.starts_with(':') && s.ends_with('*'));
        if open_ended {
            segments.pop();
        }
        Self {
            segments,
            open_ended,
        }
    }

    fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split_segments(path).collect();
        let len_ok = if self.open_ended {
            parts.len() >= self.segments.len()
        } else {
            parts.len() == self.segments.len()
        };
        if !len_ok {
            return false;
        }
        self.segments
            .iter()
            .zip(&parts)
            .all(|(want, got)| want.starts_with(':') || want == got)
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('?')
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
}

fn is_admin_path(path: &str) -> bool {
    split_segments(path).next() == split_segments(ADMIN_PREFIX).next()
}

/// Role-based gate for admin paths.
///
/// | cookie                     | path                | decision                       |
/// |----------------------------|---------------------|--------------------------------|
/// | absent                     | any guarded         | redirect to `/login`           |
/// | undecodable                | any guarded         | wipe cookie, redirect `/login` |
/// | role `Proprietaire`        | under `/admin`      | redirect to `/`                |
/// | anything else              | any guarded         | allow                          |
#[derive(Debug, Clone)]
pub struct RouteGuard {
    patterns: Vec<PathPattern>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(["/admin/:path*", "/home"])
    }
}

impl RouteGuard {
    /// Guard the paths matching any of `patterns`.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| PathPattern::parse(p.as_ref()))
                .collect(),
        }
    }

    /// Whether the guard runs for `path` at all.
    pub fn covers(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    /// Decide a navigation from the raw access-token cookie value.
    pub fn check(&self, path: &str, access_cookie: Option<&str>) -> GuardDecision {
        if !self.covers(path) {
            return GuardDecision::Allow;
        }

        let Some(token) = access_cookie.filter(|t| !t.is_empty()) else {
            debug!(path, "No token found, redirecting to login");
            return GuardDecision::to_login(false);
        };

        let claims = match Claims::decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(path, error = %e, "Access token did not decode");
                return GuardDecision::to_login(true);
            }
        };

        if claims.role == Some(Role::Proprietaire) && is_admin_path(path) {
            info!(path, "Proprietaire denied the admin area");
            return GuardDecision::Redirect {
                location: HOME_PATH,
                clear_access_cookie: false,
            };
        }

        debug!(path, "Access granted");
        GuardDecision::Allow
    }

    /// Check a navigation against the stored cookie, wiping the cookie
    /// when the decision says so.
    #[instrument(skip(self, storage))]
    pub async fn enforce(&self, storage: &dyn ClientStorage, path: &str) -> Result<GuardDecision> {
        let cookie = storage.cookie(StorageKey::AccessToken.as_str()).await?;
        let decision = self.check(path, cookie.as_deref());
        if let GuardDecision::Redirect {
            clear_access_cookie: true,
            ..
        } = decision
        {
            storage
                .expire_cookie(StorageKey::AccessToken.as_str())
                .await?;
        }
        Ok(decision)
    }
}
