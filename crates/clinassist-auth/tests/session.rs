mod common;

use std::sync::Arc;

use clinassist_auth::{AuthError, DataScope, SessionStore};
use clinassist_client::Method;
use clinassist_core::models::user::{LoginRequest, Role};
use clinassist_storage::{KeyValueStore, MemoryStore, keys};
use common::{CannedBackend, api, auth_json, therapeute_json, user_json};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;

fn credentials(user: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username_or_email: user.to_string(),
        password: password.to_string(),
    }
}

fn jwt_expiring_at(exp: i64) -> String {
    encode(
        &Header::default(),
        &json!({"sub": "user7", "exp": exp}),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

#[tokio::test]
async fn admin_login_persists_identity() {
    let backend = CannedBackend::new();
    backend.route(
        Method::Post,
        "/auth/login",
        200,
        auth_json("acc-1", "ref-1", user_json(1, "ADMIN")),
    );
    let storage = Arc::new(MemoryStore::new());
    let store = SessionStore::new(api(&backend), storage.clone());

    let session = store.login(&credentials("admin", "pw")).await.unwrap();

    assert_eq!(session.user.role, Role::Admin);
    assert!(store.is_authenticated());
    assert!(store.is_admin());
    assert_eq!(store.scope(), DataScope::All);
    assert_eq!(store.api().token().as_deref(), Some("acc-1"));
    assert_eq!(storage.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("acc-1"));
    assert_eq!(storage.get(keys::REFRESH_TOKEN).unwrap().as_deref(), Some("ref-1"));
    assert!(storage.get(keys::USER).unwrap().is_some());
    assert!(storage.get(keys::THERAPEUTE_ID).unwrap().is_none());

    let sent = backend.requests_to("/auth/login");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].body,
        Some(json!({"usernameOrEmail": "admin", "password": "pw"}))
    );
}

#[tokio::test]
async fn therapeute_login_resolves_scope() {
    let backend = CannedBackend::new();
    backend.route(
        Method::Post,
        "/auth/login",
        200,
        auth_json("acc-7", "ref-7", user_json(7, "THERAPEUTE")),
    );
    backend.route(Method::Get, "/therapeutes/user/7", 200, therapeute_json(42, 7));
    let storage = Arc::new(MemoryStore::new());
    let store = SessionStore::new(api(&backend), storage.clone());

    let session = store.login(&credentials("claire", "pw")).await.unwrap();

    assert_eq!(session.therapeute_id, Some(42));
    assert!(store.is_therapeute());
    assert_eq!(store.therapeute_id(), Some(42));
    assert_eq!(store.scope(), DataScope::Therapeute(42));
    assert_eq!(store.current_therapeute().unwrap().specialization, "TCC");
    assert_eq!(storage.get(keys::THERAPEUTE_ID).unwrap().as_deref(), Some("42"));
    assert!(storage.get(keys::CURRENT_THERAPEUTE).unwrap().is_some());

    // The lookup carries the freshly installed token.
    let lookup = backend.requests_to("/therapeutes/user/7");
    assert_eq!(lookup[0].bearer.as_deref(), Some("acc-7"));
}

#[tokio::test]
async fn failed_therapeute_lookup_leaves_scope_unresolved() {
    let backend = CannedBackend::new();
    backend.route(
        Method::Post,
        "/auth/login",
        200,
        auth_json("acc-7", "ref-7", user_json(7, "THERAPEUTE")),
    );
    backend.route(Method::Get, "/therapeutes/user/7", 500, json!({"message": "down"}));
    let storage = Arc::new(MemoryStore::new());
    let store = SessionStore::new(api(&backend), storage.clone());

    let session = store.login(&credentials("claire", "pw")).await.unwrap();

    assert!(store.is_authenticated());
    assert_eq!(session.therapeute_id, None);
    assert_eq!(store.scope(), DataScope::Unresolved);
    assert!(storage.get(keys::THERAPEUTE_ID).unwrap().is_none());
}

#[tokio::test]
async fn rejected_credentials_are_an_authentication_error() {
    let backend = CannedBackend::new();
    backend.route(Method::Post, "/auth/login", 401, json!({"message": "Bad credentials"}));
    let storage = Arc::new(MemoryStore::new());
    let store = SessionStore::new(api(&backend), storage.clone());

    let err = store.login(&credentials("admin", "wrong")).await.unwrap_err();

    assert!(matches!(err, AuthError::Authentication(_)));
    assert!(!store.is_authenticated());
    assert!(store.api().token().is_none());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn backend_failure_on_login_is_an_authentication_error() {
    let backend = CannedBackend::new();
    backend.route(Method::Post, "/auth/login", 503, json!({"message": "maintenance"}));
    let store = SessionStore::new(api(&backend), Arc::new(MemoryStore::new()));

    let err = store.login(&credentials("admin", "pw")).await.unwrap_err();
    assert!(matches!(err, AuthError::Authentication(_)));
}

#[tokio::test]
async fn blank_credentials_never_reach_the_backend() {
    let backend = CannedBackend::new();
    let store = SessionStore::new(api(&backend), Arc::new(MemoryStore::new()));

    let err = store.login(&credentials("  ", "pw")).await.unwrap_err();

    assert!(matches!(err, AuthError::Authentication(_)));
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn logout_clears_everything_and_notifies() {
    let backend = CannedBackend::new();
    backend.route(
        Method::Post,
        "/auth/login",
        200,
        auth_json("acc-7", "ref-7", user_json(7, "THERAPEUTE")),
    );
    backend.route(Method::Get, "/therapeutes/user/7", 200, therapeute_json(42, 7));
    let storage = Arc::new(MemoryStore::new());
    let store = SessionStore::new(api(&backend), storage.clone());
    store.login(&credentials("claire", "pw")).await.unwrap();

    let mut rx = store.subscribe();
    assert!(rx.borrow_and_update().is_some());

    store.logout().unwrap();

    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_none());
    assert!(!store.is_authenticated());
    assert!(store.current_user().is_none());
    assert!(store.api().token().is_none());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn session_survives_restart() {
    let backend = CannedBackend::new();
    backend.route(
        Method::Post,
        "/auth/login",
        200,
        auth_json("acc-7", "ref-7", user_json(7, "THERAPEUTE")),
    );
    backend.route(Method::Get, "/therapeutes/user/7", 200, therapeute_json(42, 7));
    let storage = Arc::new(MemoryStore::new());
    SessionStore::new(api(&backend), storage.clone())
        .login(&credentials("claire", "pw"))
        .await
        .unwrap();

    let fresh_api = api(&backend);
    let restored = SessionStore::new(fresh_api.clone(), storage);

    assert!(restored.is_authenticated());
    assert_eq!(restored.current_user().unwrap().id, 7);
    assert_eq!(restored.scope(), DataScope::Therapeute(42));
    assert_eq!(fresh_api.token().as_deref(), Some("acc-7"));
}

#[test]
fn corrupt_stored_user_degrades_to_signed_out() {
    let storage = Arc::new(MemoryStore::new());
    storage.set(keys::ACCESS_TOKEN, "acc").unwrap();
    storage.set(keys::USER, "{not json").unwrap();

    let store = SessionStore::new(api(&CannedBackend::new()), storage.clone());

    assert!(!store.is_authenticated());
    assert!(storage.get(keys::USER).unwrap().is_none());
}

#[test]
fn expired_jwt_is_not_authenticated() {
    let storage = Arc::new(MemoryStore::new());
    storage.set(keys::ACCESS_TOKEN, &jwt_expiring_at(1_000)).unwrap();
    storage
        .set(keys::USER, &user_json(1, "ADMIN").to_string())
        .unwrap();

    let store = SessionStore::new(api(&CannedBackend::new()), storage);

    assert!(store.session().is_some());
    assert!(!store.is_authenticated());
}

#[test]
fn live_jwt_and_opaque_tokens_are_authenticated() {
    let far_future = jiff::Timestamp::now().as_second() + 3_600;
    for token in [jwt_expiring_at(far_future), "opaque-session-token".to_string()] {
        let storage = Arc::new(MemoryStore::new());
        storage.set(keys::ACCESS_TOKEN, &token).unwrap();
        storage
            .set(keys::USER, &user_json(1, "RECEPTIONIST").to_string())
            .unwrap();

        let store = SessionStore::new(api(&CannedBackend::new()), storage);

        assert!(store.is_authenticated(), "token {token} should count");
        assert!(store.is_receptionist());
    }
}

#[tokio::test]
async fn refresh_rotates_tokens_and_keeps_scope() {
    let backend = CannedBackend::new();
    backend.route(
        Method::Post,
        "/auth/login",
        200,
        auth_json("acc-7", "ref-7", user_json(7, "THERAPEUTE")),
    );
    backend.route(Method::Get, "/therapeutes/user/7", 200, therapeute_json(42, 7));
    backend.route(
        Method::Post,
        "/auth/refresh",
        200,
        auth_json("acc-8", "ref-8", user_json(7, "THERAPEUTE")),
    );
    let storage = Arc::new(MemoryStore::new());
    let store = SessionStore::new(api(&backend), storage.clone());
    store.login(&credentials("claire", "pw")).await.unwrap();

    let session = store.refresh().await.unwrap();

    assert_eq!(session.access_token, "acc-8");
    assert_eq!(store.scope(), DataScope::Therapeute(42));
    assert_eq!(store.api().token().as_deref(), Some("acc-8"));
    assert_eq!(storage.get(keys::REFRESH_TOKEN).unwrap().as_deref(), Some("ref-8"));

    let sent = backend.requests_to("/auth/refresh");
    assert_eq!(sent[0].header_value("x-refresh-token"), Some("ref-7"));
}

#[tokio::test]
async fn refresh_without_session_fails() {
    let store = SessionStore::new(api(&CannedBackend::new()), Arc::new(MemoryStore::new()));
    assert!(matches!(
        store.refresh().await.unwrap_err(),
        AuthError::NotAuthenticated
    ));
}

#[tokio::test]
async fn current_therapeute_can_be_replaced() {
    let backend = CannedBackend::new();
    backend.route(
        Method::Post,
        "/auth/login",
        200,
        auth_json("acc-7", "ref-7", user_json(7, "THERAPEUTE")),
    );
    let storage = Arc::new(MemoryStore::new());
    let store = SessionStore::new(api(&backend), storage.clone());
    store.login(&credentials("claire", "pw")).await.unwrap();
    assert_eq!(store.scope(), DataScope::Unresolved);

    let therapeute = serde_json::from_value(therapeute_json(55, 7)).unwrap();
    store.set_current_therapeute(therapeute).unwrap();

    assert_eq!(store.scope(), DataScope::Therapeute(55));
    assert_eq!(storage.get(keys::THERAPEUTE_ID).unwrap().as_deref(), Some("55"));
}

#[test]
fn current_therapeute_requires_a_session() {
    let store = SessionStore::new(api(&CannedBackend::new()), Arc::new(MemoryStore::new()));
    let therapeute = serde_json::from_value(therapeute_json(55, 7)).unwrap();

    assert!(matches!(
        store.set_current_therapeute(therapeute).unwrap_err(),
        AuthError::NotAuthenticated
    ));
}
