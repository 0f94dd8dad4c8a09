//! adopti-http - HTTP access layer for the Adopti backend.
//!
//! [`HttpBackend`] talks to the token-issuing endpoints,
//! [`AuthenticatedFetch`] wraps every other call with bearer injection and
//! a single refresh-and-retry, and [`SessionBridge`] turns an OAuth
//! sign-in into an application token pair.

mod account;
mod backend;
mod client;
mod endpoints;
mod fetch;
mod oauth;
mod request;

pub use account::{PasswordReset, ProfileUpdate, Registration, sign_in, sign_out};
pub use backend::HttpBackend;
pub use client::ApiClient;
pub use fetch::AuthenticatedFetch;
pub use oauth::{ClientSession, ProviderAccount, ProviderProfile, SessionBridge, SessionToken};
pub use request::{ApiRequest, FilePart, MultipartForm, RequestBody};
pub use reqwest::{Method, StatusCode};
