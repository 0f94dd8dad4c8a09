//! Account operations: sign-in/out, registration, password reset, profile.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use adopti_core::error::InvalidInputError;
use adopti_core::traits::LoginOutput;
use adopti_core::{
    AuthBackend, ClientStorage, Credentials, LOGIN_PATH, Navigator, Result, Role,
};

use crate::endpoints::{PROFILE, PROFILE_UPDATE};
use crate::fetch::AuthenticatedFetch;
use crate::request::{ApiRequest, FilePart, MultipartForm};

/// Sign in with email and password and persist the result.
///
/// Empty fields are rejected before any request. On success the token
/// pair lands in storage (mirrored into the cookies) and the returned
/// user record is cached.
#[instrument(skip_all, fields(email = %credentials.email()))]
pub async fn sign_in(
    backend: &dyn AuthBackend,
    storage: &dyn ClientStorage,
    credentials: &Credentials,
) -> Result<LoginOutput> {
    credentials.validate()?;

    let output = backend.login(credentials).await?;
    storage.save_session(&output.tokens, &output.user).await?;

    info!("Signed in");
    Ok(output)
}

/// Forget the signed-in user and go to the login page.
#[instrument(skip_all)]
pub async fn sign_out(storage: &dyn ClientStorage, navigator: &dyn Navigator) -> Result<()> {
    storage.clear_credentials().await?;
    navigator.navigate(LOGIN_PATH);
    info!("Signed out");
    Ok(())
}

/// Registration form.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: String,
    pub role: Role,
    pub adresse: String,
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> std::result::Result<(), InvalidInputError> {
        let required = [
            &self.nom,
            &self.prenom,
            &self.email,
            &self.telephone,
            &self.adresse,
            &self.password,
        ];
        if required.iter().any(|v| v.trim().is_empty()) || self.role.as_str().is_empty() {
            return Err(InvalidInputError::MissingFields);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("nom", &self.nom)
            .field("prenom", &self.prenom)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Password reset confirmation form.
#[derive(Clone, Serialize)]
pub struct PasswordReset {
    pub token: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl PasswordReset {
    pub fn validate(&self) -> std::result::Result<(), InvalidInputError> {
        if self.token.is_empty() || self.email.trim().is_empty() || self.password.is_empty() {
            return Err(InvalidInputError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(InvalidInputError::PasswordMismatch);
        }
        Ok(())
    }
}

impl std::fmt::Debug for PasswordReset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordReset")
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Profile changes. Unset fields are left untouched by the backend.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub avatar: Option<FilePart>,
}

impl ProfileUpdate {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("nom", &self.nom),
            ("prenom", &self.prenom),
            ("email", &self.email),
            ("telephone", &self.telephone),
            ("adresse", &self.adresse),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }

    /// JSON when there is no avatar, multipart otherwise.
    fn to_request(&self) -> ApiRequest {
        let request = ApiRequest::put(PROFILE_UPDATE);
        match &self.avatar {
            Some(avatar) => {
                let form = self
                    .text_fields()
                    .into_iter()
                    .fold(MultipartForm::new(), |form, (name, value)| form.text(name, value))
                    .file(avatar.clone());
                request.multipart(form)
            }
            None => {
                let body: Map<String, Value> = self
                    .text_fields()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
                    .collect();
                request.json(Value::Object(body))
            }
        }
    }
}

impl AuthenticatedFetch {
    /// The signed-in user's profile.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Value> {
        self.json(ApiRequest::get(PROFILE)).await
    }

    /// Update the profile and refresh the cached user with the answer.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Value> {
        let updated: Value = self.json(update.to_request()).await?;

        let merged = match (self.storage().cached_user().await?, &updated) {
            (Some(Value::Object(mut cached)), Value::Object(fresh)) => {
                for (key, value) in fresh {
                    if key != "message" {
                        cached.insert(key.clone(), value.clone());
                    }
                }
                Value::Object(cached)
            }
            _ => updated.clone(),
        };
        self.storage().save_user(&merged).await?;

        Ok(updated)
    }
}
