#![allow(dead_code)]

use std::sync::Arc;

use clinassist_auth::SessionStore;
use clinassist_core::RiskThresholds;
use clinassist_core::models::user::LoginRequest;
use clinassist_services::Services;
use clinassist_storage::MemoryStore;
use clinassist_testkit::FakeBackend;

pub use clinassist_testkit::fixtures;

pub fn credentials((user, password): (&str, &str)) -> LoginRequest {
    LoginRequest {
        username_or_email: user.to_string(),
        password: password.to_string(),
    }
}

pub fn services(backend: &Arc<FakeBackend>) -> Services {
    services_with(backend, RiskThresholds::default())
}

pub fn services_with(backend: &Arc<FakeBackend>, thresholds: RiskThresholds) -> Services {
    let session = Arc::new(SessionStore::new(
        backend.api(),
        Arc::new(MemoryStore::new()),
    ));
    Services::new(session, thresholds)
}

/// Services signed in as `who`, with the request log cleared.
pub async fn signed_in(backend: &Arc<FakeBackend>, who: (&str, &str)) -> Services {
    let services = services(backend);
    services.session.login(&credentials(who)).await.unwrap();
    backend.clear_requests();
    services
}
