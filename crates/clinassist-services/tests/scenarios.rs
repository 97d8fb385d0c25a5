mod common;

use std::sync::Arc;

use clinassist_auth::{DataScope, SessionStore};
use clinassist_core::RiskThresholds;
use clinassist_core::models::seance::SeanceStatus;
use clinassist_services::Services;
use clinassist_storage::{KeyValueStore, MemoryStore, keys};
use clinassist_testkit::FakeBackend;
use common::credentials;
use common::fixtures::{BERNARD, BERNARD_ID, MARTIN, MARTIN_ID};

fn services_on(backend: &Arc<FakeBackend>, store: Arc<MemoryStore>) -> Services {
    let session = Arc::new(SessionStore::new(backend.api(), store));
    Services::new(session, RiskThresholds::default())
}

#[tokio::test]
async fn therapist_workday() {
    let backend = FakeBackend::seeded();
    let services = services_on(&backend, Arc::new(MemoryStore::new()));

    services.session.login(&credentials(MARTIN)).await.unwrap();
    assert_eq!(services.session.scope(), DataScope::Therapeute(MARTIN_ID));

    let patients = services.patients.list(0, 10, None).await;
    assert_eq!(patients.total_elements, 7);

    let pending = services.seances.pending_approvals().await;
    assert_eq!(pending.len(), 2);

    services.seances.list(0, 10).await;
    let approved = services.seances.approve(pending[0].id).await.unwrap();
    assert_eq!(approved.status, SeanceStatus::Confirmed);
    assert_eq!(services.seances.pending_approvals().await.len(), 1);

    let stats = services.dashboard.stats().await.unwrap();
    assert_eq!(stats.total_patients, 7);

    services.logout().unwrap();

    assert!(!services.session.is_authenticated());
    assert!(services.patients.patients().is_empty());
    assert!(services.seances.seances().is_empty());
    assert!(services.dashboard.current().is_none());

    // Signed out: the backend refuses, and listings degrade to empty.
    backend.clear_requests();
    let page = services.patients.list(0, 10, None).await;
    assert!(page.content.is_empty());
    assert!(backend.requests().iter().all(|r| r.bearer.is_none()));
}

#[tokio::test]
async fn restart_restores_the_scoped_session() {
    let backend = FakeBackend::seeded();
    let store = Arc::new(MemoryStore::new());

    let first = services_on(&backend, store.clone());
    first.session.login(&credentials(MARTIN)).await.unwrap();
    drop(first);
    backend.clear_requests();

    let second = services_on(&backend, store.clone());

    assert!(second.session.is_authenticated());
    assert_eq!(second.session.scope(), DataScope::Therapeute(MARTIN_ID));
    let page = second.patients.try_list(0, 20, None).await.unwrap();
    assert_eq!(page.total_elements, 7);
    // No lookup was needed to resolve the therapist.
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn switching_therapists_does_not_leak_data() {
    let backend = FakeBackend::seeded();
    let store = Arc::new(MemoryStore::new());
    let services = services_on(&backend, store.clone());

    services.session.login(&credentials(MARTIN)).await.unwrap();
    services.patients.list(0, 20, None).await;
    services.logout().unwrap();
    assert!(store.is_empty());

    services.session.login(&credentials(BERNARD)).await.unwrap();
    assert_eq!(services.session.scope(), DataScope::Therapeute(BERNARD_ID));

    let page = services.patients.list(0, 20, None).await;
    assert_eq!(page.total_elements, 5);
    assert!(page.content.iter().all(|p| p.is_assigned_to(BERNARD_ID)));
    assert!(
        services
            .patients
            .patients()
            .iter()
            .all(|p| p.is_assigned_to(BERNARD_ID))
    );
    let today = services.seances.today().await;
    assert!(today.iter().all(|s| s.therapeute_id == BERNARD_ID));
    assert!(store.get(keys::THERAPEUTE_ID).unwrap().is_some());
}
