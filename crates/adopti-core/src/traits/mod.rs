//! Seams between the core and its implementations.

mod backend;
mod navigator;
mod storage;

pub use backend::{AuthBackend, ExchangeOutput, LoginOutput, RefreshOutput};
pub use navigator::{LOGIN_PATH, Navigator};
pub use storage::{ClientStorage, LOGIN_COOKIE_MAX_AGE, StorageKey};
