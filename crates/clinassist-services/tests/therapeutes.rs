mod common;

use clinassist_testkit::FakeBackend;
use common::fixtures::{ADMIN, BERNARD_ID, MARTIN, MARTIN_ID, RECEPTION};
use common::signed_in;

#[tokio::test]
async fn listing_uses_backend_paging_for_everyone() {
    let backend = FakeBackend::seeded();
    let services = signed_in(&backend, MARTIN).await;

    let page = services.therapeutes.try_list(1, 1, None).await.unwrap();

    assert_eq!(page.total_elements, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.content[0].id, BERNARD_ID);
    assert!(page.last);
    assert_eq!(services.therapeutes.therapeutes(), page.content);
    assert_eq!(backend.requests_to("/therapeutes").len(), 1);
}

#[tokio::test]
async fn search_matches_name_and_specialization() {
    let backend = FakeBackend::seeded();
    let services = signed_in(&backend, RECEPTION).await;

    let by_name = services.therapeutes.search(" bernard ", 0, 10).await.unwrap();
    assert_eq!(by_name.content.len(), 1);
    assert_eq!(
        backend.requests_to("/therapeutes/search")[0].query_value("q"),
        Some("bernard")
    );

    let by_field = services
        .therapeutes
        .try_list(0, 10, Some("psychologie"))
        .await
        .unwrap();
    assert_eq!(by_field.total_elements, 2);
}

#[tokio::test]
async fn available_lists_only_open_therapists() {
    let backend = FakeBackend::seeded();
    let services = signed_in(&backend, RECEPTION).await;

    let available = services.therapeutes.available().await;

    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, MARTIN_ID);

    backend.fail("/therapeutes");
    assert!(services.therapeutes.available().await.is_empty());
}

#[tokio::test]
async fn current_records_the_therapist_on_the_session() {
    let backend = FakeBackend::seeded();
    let services = signed_in(&backend, MARTIN).await;

    let me = services.therapeutes.current().await.unwrap();

    assert_eq!(me.id, MARTIN_ID);
    assert_eq!(services.session.current_therapeute(), Some(me));
    assert_eq!(services.session.therapeute_id(), Some(MARTIN_ID));
}

#[tokio::test]
async fn current_for_non_therapist_is_not_found() {
    let backend = FakeBackend::seeded();
    let services = signed_in(&backend, ADMIN).await;

    let err = services.therapeutes.current().await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(services.session.therapeute_id(), None);
}

#[tokio::test]
async fn by_user_and_get() {
    let backend = FakeBackend::seeded();
    let services = signed_in(&backend, ADMIN).await;

    assert_eq!(services.therapeutes.by_user(3).await.unwrap().id, BERNARD_ID);

    let martin = services.therapeutes.get(MARTIN_ID).await.unwrap();
    assert_eq!(services.therapeutes.selected(), Some(martin));
    assert!(services.therapeutes.get(99).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn availability_update_merges_into_cache() {
    let backend = FakeBackend::seeded();
    let services = signed_in(&backend, ADMIN).await;
    services.therapeutes.try_list(0, 10, None).await.unwrap();

    let updated = services
        .therapeutes
        .update_availability(BERNARD_ID, true)
        .await
        .unwrap();

    assert!(updated.available);
    assert!(services.therapeutes.cache().get(BERNARD_ID).unwrap().available);
    assert_eq!(services.therapeutes.therapeutes().len(), 2);
    assert_eq!(services.therapeutes.available().await.len(), 2);
    assert_eq!(
        backend.requests_to("/therapeutes/11/availability")[0].query_value("available"),
        Some("true")
    );
}
