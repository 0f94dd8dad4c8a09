//! Mock API tests for adopti-http.
//!
//! These tests use wiremock to stand in for the backend and check the
//! token handling end to end: bearer injection, refresh-and-retry, forced
//! sign-out, credential sign-in and the OAuth exchange.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use adopti_core::error::{AuthError, Error, InvalidInputError, TransportError};
use adopti_core::{ApiErrorKind, ApiUrl, ClientStorage, Credentials, Navigator, StorageKey, TokenPair};
use adopti_http::{
    ApiRequest, AuthenticatedFetch, FilePart, HttpBackend, ProfileUpdate, ProviderAccount,
    ProviderProfile, SessionBridge, sign_in, sign_out,
};
use adopti_store::MemoryStorage;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every navigation.
#[derive(Debug, Default)]
struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, location: &str) {
        self.visits.lock().unwrap().push(location.to_string());
    }
}

fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}/api", server.address().port())).unwrap()
}

struct Harness {
    fetch: AuthenticatedFetch,
    storage: Arc<MemoryStorage>,
    navigator: Arc<RecordingNavigator>,
}

async fn harness(server: &MockServer, tokens: Option<TokenPair>) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    if let Some(pair) = tokens {
        storage.save_tokens(&pair).await.unwrap();
    }
    let navigator = Arc::new(RecordingNavigator::default());
    let backend = HttpBackend::new(mock_api_url(server)).unwrap();
    let fetch = AuthenticatedFetch::from_backend(backend, storage.clone(), navigator.clone());
    Harness {
        fetch,
        storage,
        navigator,
    }
}

async fn assert_signed_out(h: &Harness) {
    assert!(h.storage.access_token().await.unwrap().is_none());
    assert!(h.storage.refresh_token().await.unwrap().is_none());
    assert!(h.storage.cached_user().await.unwrap().is_none());
    assert!(h.storage.cookie("access_token").await.unwrap().is_none());
    assert_eq!(h.navigator.visits(), vec!["/login".to_string()]);
}

// ============================================================================
// Authenticated fetch
// ============================================================================

#[tokio::test]
async fn test_valid_token_passes_through_without_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/animals/animaux/"))
        .and(header("authorization", "Bearer a1"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, Some(TokenPair::new("a1", "r1"))).await;
    let response = h.fetch.get("/animals/animaux/").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body[0]["id"], 1);
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_other_errors_are_returned_untouched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/animals/animaux/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some(TokenPair::new("a1", "r1"))).await;
    let response = h.fetch.get("/animals/animaux/99/").await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(h.storage.access_token().await.unwrap().unwrap().as_str(), "a1");
}

#[tokio::test]
async fn test_expired_token_refreshes_and_retries_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/boutique/panier/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Given token not valid for any token type"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/boutique/panier/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "fresh", "refresh": "r2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some(TokenPair::new("stale", "r1"))).await;
    let response = h.fetch.get("/boutique/panier/").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.storage.access_token().await.unwrap().unwrap().as_str(), "fresh");
    assert_eq!(h.storage.refresh_token().await.unwrap().unwrap().as_str(), "r2");
    assert_eq!(h.storage.cookie("access_token").await.unwrap().as_deref(), Some("fresh"));
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_refresh_without_rotation_keeps_refresh_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "a@b.c"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some(TokenPair::new("stale", "r1"))).await;
    let profile = h.fetch.profile().await.unwrap();

    assert_eq!(profile["email"], "a@b.c");
    assert_eq!(h.storage.refresh_token().await.unwrap().unwrap().as_str(), "r1");
}

#[tokio::test]
async fn test_retry_that_is_still_unauthorized_is_final() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/animals/demandes-adoption/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some(TokenPair::new("stale", "r1"))).await;
    let response = h.fetch.get("/animals/demandes-adoption/").await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_rejected_refresh_signs_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token is invalid or expired",
            "code": "token_not_valid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some(TokenPair::new("stale", "r1"))).await;
    h.storage.save_user(&json!({"email": "a@b.c"})).await.unwrap();
    h.storage.set(StorageKey::Cart, "[1,2]").await.unwrap();

    let err = h.fetch.get("/auth/profile/").await.unwrap_err();

    match err {
        Error::Auth(AuthError::RefreshRejected { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Token is invalid or expired");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_signed_out(&h).await;
    assert_eq!(h.storage.get(StorageKey::Cart).await.unwrap().as_deref(), Some("[1,2]"));
}

#[tokio::test]
async fn test_missing_refresh_token_fails_fast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, None).await;
    h.storage.set(StorageKey::AccessToken, "stale").await.unwrap();

    let err = h.fetch.get("/auth/profile/").await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::NoRefreshToken)));
    assert_eq!(err.to_string(), "authentication error: no refresh token");
    assert_signed_out(&h).await;
}

#[tokio::test]
async fn test_unreadable_refresh_response_signs_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some(TokenPair::new("stale", "r1"))).await;

    let err = h.fetch.get("/auth/profile/").await.unwrap_err();

    assert!(
        matches!(err, Error::Transport(TransportError::Decode { .. })),
        "unexpected error: {err:?}"
    );
    assert_signed_out(&h).await;
}

#[tokio::test]
async fn test_signed_out_request_is_sent_without_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/animals/animaux/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, None).await;

    let err = h.fetch.get("/animals/animaux/").await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::NoRefreshToken)));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_signed_out(&h).await;
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "fresh", "refresh": "r2"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some(TokenPair::new("stale", "r1"))).await;
    let (a, b, c) = tokio::join!(
        h.fetch.get("/animals/animaux/"),
        h.fetch.get("/boutique/produits/"),
        h.fetch.get("/blog-posts/"),
    );

    assert_eq!(a.unwrap().status(), StatusCode::OK);
    assert_eq!(b.unwrap().status(), StatusCode::OK);
    assert_eq!(c.unwrap().status(), StatusCode::OK);
    assert_eq!(h.storage.refresh_token().await.unwrap().unwrap().as_str(), "r2");
}

#[tokio::test]
async fn test_caller_authorization_header_is_replaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/animals/demandes-garde/"))
        .and(header("authorization", "Bearer a1"))
        .and(body_json(json!({"animal": 4})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 10})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some(TokenPair::new("a1", "r1"))).await;
    let request = ApiRequest::post("/animals/demandes-garde/")
        .json(json!({"animal": 4}))
        .header(AUTHORIZATION, HeaderValue::from_static("Bearer forged"));

    let created: Value = h.fetch.json(request).await.unwrap();
    assert_eq!(created["id"], 10);
}

#[tokio::test]
async fn test_json_helper_normalizes_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/animals/demandes-adoption/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "date_fin": ["La date de fin doit suivre la date de début."]
        })))
        .mount(&server)
        .await;

    let h = harness(&server, Some(TokenPair::new("a1", "r1"))).await;
    let err = h
        .fetch
        .json::<Value>(ApiRequest::post("/animals/demandes-adoption/").json(json!({})))
        .await
        .unwrap_err();

    let api = err.as_api().unwrap();
    assert_eq!(api.kind, ApiErrorKind::Validation);
    assert!(api.message.contains("La date de fin"));
    assert!(api.field("date_fin").is_some());
}

#[tokio::test]
async fn test_profile_update_with_avatar_is_multipart() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/auth/profile/update/"))
        .and(header("authorization", "Bearer a1"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Profil mis à jour",
            "nom": "Curie",
            "avatar": "/media/avatars/me.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, Some(TokenPair::new("a1", "r1"))).await;
    h.storage
        .save_user(&json!({"email": "marie@example.com", "nom": "Sklodowska"}))
        .await
        .unwrap();

    let update = ProfileUpdate {
        nom: Some("Curie".to_string()),
        avatar: Some(FilePart {
            field: "avatar".to_string(),
            file_name: "me.png".to_string(),
            mime: Some("image/png".to_string()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }),
        ..Default::default()
    };
    h.fetch.update_profile(&update).await.unwrap();

    let cached = h.storage.cached_user().await.unwrap().unwrap();
    assert_eq!(cached["nom"], "Curie");
    assert_eq!(cached["email"], "marie@example.com");
    assert!(cached.get("message").is_none());
}

// ============================================================================
// Credentials sign-in
// ============================================================================

#[tokio::test]
async fn test_sign_in_persists_tokens_cookies_and_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({"email": "marie@example.com", "password": "radium"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
            "refresh": "r1",
            "user": {"email": "marie@example.com", "role": "Responsable"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let backend = HttpBackend::new(mock_api_url(&server)).unwrap();
    let credentials = Credentials::new("marie@example.com", "radium");

    let output = sign_in(&backend, &storage, &credentials).await.unwrap();

    assert_eq!(output.tokens.access.as_str(), "a1");
    assert_eq!(storage.get(StorageKey::RefreshToken).await.unwrap().as_deref(), Some("r1"));
    assert_eq!(storage.cookie("access_token").await.unwrap().as_deref(), Some("a1"));
    assert_eq!(storage.cookie("refresh_token").await.unwrap().as_deref(), Some("r1"));
    assert_eq!(storage.cached_user().await.unwrap().unwrap()["role"], "Responsable");
}

#[tokio::test]
async fn test_sign_in_rejects_empty_fields_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let backend = HttpBackend::new(mock_api_url(&server)).unwrap();
    let credentials = Credentials::new("  ", "radium");

    let err = sign_in(&backend, &storage, &credentials).await.unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidInput(InvalidInputError::MissingFields)
    ));
}

#[tokio::test]
async fn test_sign_in_failure_carries_backend_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let backend = HttpBackend::new(mock_api_url(&server)).unwrap();
    let credentials = Credentials::new("marie@example.com", "wrong");

    let err = sign_in(&backend, &storage, &credentials).await.unwrap_err();

    let api = err.as_api().unwrap();
    assert_eq!(api.status, 401);
    assert_eq!(api.message, "No active account found with the given credentials");
    assert!(storage.access_token().await.unwrap().is_none());
}

#[tokio::test]
async fn test_sign_out_clears_and_navigates() {
    let storage = MemoryStorage::new();
    storage.save_tokens(&TokenPair::new("a1", "r1")).await.unwrap();
    storage.set(StorageKey::Wishlist, "[3]").await.unwrap();
    let navigator = RecordingNavigator::default();

    sign_out(&storage, &navigator).await.unwrap();

    assert!(storage.access_token().await.unwrap().is_none());
    assert!(storage.cookie("refresh_token").await.unwrap().is_none());
    assert_eq!(storage.get(StorageKey::Wishlist).await.unwrap().as_deref(), Some("[3]"));
    assert_eq!(navigator.visits(), vec!["/login".to_string()]);
}

// ============================================================================
// Account endpoints
// ============================================================================

#[tokio::test]
async fn test_password_reset_request_returns_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/password-reset/"))
        .and(body_json(json!({"email": "marie@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Un email de réinitialisation a été envoyé."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(mock_api_url(&server)).unwrap();
    let message = backend
        .request_password_reset("marie@example.com")
        .await
        .unwrap();

    assert_eq!(
        message.as_deref(),
        Some("Un email de réinitialisation a été envoyé.")
    );
}

// ============================================================================
// OAuth exchange
// ============================================================================

fn bridge(server: &MockServer, storage: Arc<MemoryStorage>) -> SessionBridge<HttpBackend> {
    let backend = HttpBackend::new(mock_api_url(server)).unwrap();
    let site = Url::parse("http://localhost:3000").unwrap();
    SessionBridge::new(backend, storage, site)
}

#[tokio::test]
async fn test_google_exchange_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/google/"))
        .and(body_json(json!({"id_token": "gid", "access_token": "gat"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a1",
            "refresh_token": "r1",
            "user": {"email": "marie@example.com", "nom": "Curie"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let bridge = bridge(&server, storage.clone());
    let account = ProviderAccount::google(Some("gid".to_string()), Some("gat".to_string()));
    let profile = ProviderProfile {
        name: Some("Marie".to_string()),
        email: Some("marie@gmail.com".to_string()),
        image: None,
    };

    let session = bridge.sign_in(&account, profile).await.unwrap();

    assert_eq!(session.user["email"], "marie@example.com");
    assert_eq!(session.user["name"], "Marie");
    assert_eq!(session.access_token.unwrap().as_str(), "a1");
    assert_eq!(storage.cookie("access_token").await.unwrap().as_deref(), Some("a1"));
}

#[tokio::test]
async fn test_google_exchange_failure_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/google/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid Google token"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let bridge = bridge(&server, storage.clone());
    let account = ProviderAccount::google(Some("gid".to_string()), None);

    let err = bridge
        .sign_in(&account, ProviderProfile::default())
        .await
        .unwrap_err();

    match err {
        Error::Auth(AuthError::ExchangeFailed { message }) => {
            assert_eq!(message, "Invalid Google token");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(storage.access_token().await.unwrap().is_none());
}
