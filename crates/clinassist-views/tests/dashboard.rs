mod common;

use clinassist_core::models::seance::SeanceType;
use clinassist_testkit::FakeBackend;
use clinassist_views::DashboardView;
use common::fixtures::{ADMIN, MARTIN};
use common::signed_in;

#[tokio::test]
async fn derived_numbers_after_load() {
    let backend = FakeBackend::seeded();
    let services = signed_in(&backend, ADMIN).await;
    let mut view = DashboardView::new(services.dashboard.clone());

    view.load().await;

    assert_eq!(view.stats().unwrap().total_patients, 12);
    assert_eq!(view.completion_rate(), 12.5);

    let bars = view.weekly_bars();
    assert_eq!(bars.len(), 5);
    let busiest = bars.iter().find(|b| b.label == "Jeu").unwrap();
    assert_eq!(busiest.percent, 100.0);
    assert_eq!(busiest.count, 7.0);
    assert!(bars[4].is_today);
    assert!(!bars[0].is_today);

    let shares = view.type_shares();
    assert_eq!(shares[0].kind, SeanceType::InPerson);
    assert_eq!(shares[0].label, "En personne");
    assert_eq!(shares[0].percent, 100);
    assert!(shares[1..].iter().all(|s| s.percent == 0));
}

#[tokio::test]
async fn therapist_dashboard_is_scoped() {
    let backend = FakeBackend::seeded();
    let services = signed_in(&backend, MARTIN).await;
    let mut view = DashboardView::new(services.dashboard.clone());

    view.load().await;

    let stats = view.stats().unwrap();
    assert_eq!(stats.total_patients, 7);
    assert_eq!(view.completion_rate(), 20.0);
}

#[tokio::test]
async fn backend_down_degrades_to_empty() {
    let backend = FakeBackend::seeded();
    let services = signed_in(&backend, ADMIN).await;
    backend.fail("/dashboard");
    let mut view = DashboardView::new(services.dashboard.clone());

    view.load().await;

    assert!(view.stats().is_none());
    assert_eq!(view.completion_rate(), 0.0);
    assert!(view.weekly_bars().is_empty());
    assert!(view.type_shares().iter().all(|s| s.percent == 0));
    assert!(!view.is_loading());
}
