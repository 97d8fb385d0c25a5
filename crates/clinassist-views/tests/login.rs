mod common;

use clinassist_testkit::FakeBackend;
use clinassist_views::{LoginError, LoginForm};
use common::fixtures::{ADMIN, MARTIN};
use common::services;

fn form(user: &str, password: &str) -> LoginForm {
    LoginForm {
        username_or_email: user.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn blank_fields_are_rejected_locally() {
    let backend = FakeBackend::seeded();
    let services = services(&backend);

    let err = form("  ", "secret").submit(&services).await.unwrap_err();

    assert!(matches!(err, LoginError::MissingFields));
    assert_eq!(err.to_string(), "Veuillez remplir tous les champs");
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn wrong_password_reads_invalid_credentials() {
    let backend = FakeBackend::seeded();
    let services = services(&backend);

    let err = form(MARTIN.0, "nope").submit(&services).await.unwrap_err();

    assert_eq!(err.to_string(), "Identifiants invalides");
    assert!(!services.session.is_authenticated());
}

#[tokio::test]
async fn successful_login_signs_in() {
    let backend = FakeBackend::seeded();
    let services = services(&backend);

    let session = form(" dr.martin ", MARTIN.1)
        .submit(&services)
        .await
        .unwrap();

    assert_eq!(session.user.username, "dr.martin");
    assert!(services.session.is_therapeute());
}

#[tokio::test]
async fn signing_in_as_someone_else_drops_their_caches() {
    let backend = FakeBackend::seeded();
    let services = services(&backend);
    form(ADMIN.0, ADMIN.1).submit(&services).await.unwrap();
    services.patients.list(0, 20, None).await;
    services.dashboard.stats().await.unwrap();
    assert!(!services.patients.patients().is_empty());

    form(MARTIN.0, MARTIN.1).submit(&services).await.unwrap();

    assert!(services.patients.patients().is_empty());
    assert_eq!(services.dashboard.current(), None);
    assert!(services.session.is_therapeute());
}

#[tokio::test]
async fn failed_sign_in_keeps_the_current_caches() {
    let backend = FakeBackend::seeded();
    let services = services(&backend);
    form(ADMIN.0, ADMIN.1).submit(&services).await.unwrap();
    services.patients.list(0, 20, None).await;
    let cached = services.patients.patients();

    assert!(form(MARTIN.0, "nope").submit(&services).await.is_err());

    assert_eq!(services.patients.patients(), cached);
}
