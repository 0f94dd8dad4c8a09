//! Terminal navigation.

use tracing::warn;
use url::Url;

use adopti_core::Navigator;

use crate::output;

/// Reports navigations instead of performing them.
#[derive(Debug, Clone)]
pub struct CliNavigator {
    site: Url,
}

impl CliNavigator {
    pub fn new(site: Url) -> Self {
        Self { site }
    }

    /// Absolute URL for a site-relative location.
    pub fn absolute(&self, location: &str) -> String {
        self.site
            .join(location)
            .map(String::from)
            .unwrap_or_else(|_| location.to_string())
    }
}

impl Navigator for CliNavigator {
    fn navigate(&self, location: &str) {
        warn!(location, "Navigating away");
        output::redirect(&self.absolute(location));
    }
}
