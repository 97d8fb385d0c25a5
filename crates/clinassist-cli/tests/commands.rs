use std::sync::Arc;

use clap::Parser;
use clinassist_cli::commands::{FilterArg, parse_seance_status};
use clinassist_cli::{AppContext, Cli, ClinassistConfig, Command, run};
use clinassist_core::RiskCategory;
use clinassist_core::models::patient::PatientStatus;
use clinassist_core::models::seance::SeanceStatus;
use clinassist_storage::{KeyValueStore, MemoryStore};
use clinassist_testkit::FakeBackend;
use clinassist_testkit::fixtures::{self, ADMIN, MARTIN, MARTIN_ID};

fn context(backend: &Arc<FakeBackend>, storage: Arc<dyn KeyValueStore>) -> AppContext {
    AppContext::from_parts(ClinassistConfig::default(), backend.api(), storage)
}

async fn exec(ctx: &AppContext, command: Command) -> eyre::Result<String> {
    let mut out = Vec::new();
    run(command, ctx, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

async fn signed_in(backend: &Arc<FakeBackend>, (user, password): (&str, &str)) -> AppContext {
    let ctx = context(backend, Arc::new(MemoryStore::new()));
    exec(
        &ctx,
        Command::Login {
            username: user.to_string(),
            password: password.to_string(),
        },
    )
    .await
    .unwrap();
    backend.clear_requests();
    ctx
}

#[test]
fn parses_subcommands() {
    let cli = Cli::try_parse_from([
        "clinassist",
        "patients",
        "--page",
        "1",
        "--filter",
        "high-risk",
        "--api-url",
        "http://x/api",
    ])
    .unwrap();

    assert_eq!(cli.api_url.as_deref(), Some("http://x/api"));
    match cli.command {
        Command::Patients { page, filter, .. } => {
            assert_eq!(page, 1);
            assert_eq!(filter, FilterArg::HighRisk);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn today_conflicts_with_status() {
    let parsed = Cli::try_parse_from(["clinassist", "seances", "--today", "--status", "confirmed"]);
    assert!(parsed.is_err());
}

#[test]
fn seance_status_spellings() {
    assert_eq!(
        parse_seance_status("pending-approval").unwrap(),
        SeanceStatus::PendingApproval
    );
    assert_eq!(parse_seance_status("NO_SHOW").unwrap(), SeanceStatus::NoShow);
    assert!(parse_seance_status("later").is_err());
}

#[tokio::test]
async fn commands_need_a_session() {
    let backend = FakeBackend::seeded();
    let ctx = context(&backend, Arc::new(MemoryStore::new()));

    let err = exec(&ctx, Command::Pending).await.unwrap_err();

    assert!(err.to_string().contains("not signed in"));
    assert_eq!(backend.request_count(), 0);
    assert_eq!(exec(&ctx, Command::Whoami).await.unwrap(), "Non connecté\n");
}

#[tokio::test]
async fn login_persists_across_contexts() {
    let backend = FakeBackend::seeded();
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let first = context(&backend, storage.clone());

    let out = exec(
        &first,
        Command::Login {
            username: MARTIN.0.to_string(),
            password: MARTIN.1.to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(out, "Connecté en tant que Claire Martin (THERAPEUTE)\n");

    let second = context(&backend, storage);
    let whoami = exec(&second, Command::Whoami).await.unwrap();
    assert!(whoami.starts_with("dr.martin ("));
    assert!(whoami.contains("Thérapeute #10: Claire Martin"));
}

#[tokio::test]
async fn bad_password_is_reported() {
    let backend = FakeBackend::seeded();
    let ctx = context(&backend, Arc::new(MemoryStore::new()));

    let err = exec(
        &ctx,
        Command::Login {
            username: MARTIN.0.to_string(),
            password: "wrong".to_string(),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "Identifiants invalides");
}

#[tokio::test]
async fn therapist_patient_listing_is_scoped() {
    let backend = FakeBackend::seeded();
    let ctx = signed_in(&backend, MARTIN).await;

    let out = exec(
        &ctx,
        Command::Patients {
            page: 0,
            size: Some(20),
            search: None,
            filter: FilterArg::All,
        },
    )
    .await
    .unwrap();

    let rows: Vec<&str> = out.lines().filter(|l| l.contains("PAT-")).collect();
    assert_eq!(rows.len(), 7);
    assert!(out.contains("Louis Bonnet"));
    assert!(!out.contains("Nathan Rousseau"));
    assert!(out.ends_with("page 1/1 (7 patients, filtre: Tous)\n"));
}

#[tokio::test]
async fn out_of_range_page_is_an_error() {
    let backend = FakeBackend::seeded();
    let ctx = signed_in(&backend, ADMIN).await;

    let err = exec(
        &ctx,
        Command::Patients {
            page: 5,
            size: Some(10),
            search: None,
            filter: FilterArg::All,
        },
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("out of range (2 pages)"));
}

#[tokio::test]
async fn approve_from_the_terminal() {
    let backend = FakeBackend::seeded();
    let ctx = signed_in(&backend, MARTIN).await;

    let pending = exec(&ctx, Command::Pending).await.unwrap();
    assert_eq!(pending.lines().count(), 2);

    let out = exec(&ctx, Command::Approve { id: 200 }).await.unwrap();
    assert_eq!(out, "Séance 200 Confirmé\n");
    assert_eq!(backend.seance(200).unwrap().status, SeanceStatus::Confirmed);

    let pending = exec(&ctx, Command::Pending).await.unwrap();
    assert_eq!(pending.lines().count(), 1);
}

#[tokio::test]
async fn logout_clears_the_session() {
    let backend = FakeBackend::seeded();
    let ctx = signed_in(&backend, ADMIN).await;

    assert_eq!(exec(&ctx, Command::Logout).await.unwrap(), "Déconnecté\n");

    assert!(!ctx.session().is_authenticated());
    assert!(exec(&ctx, Command::Stats).await.is_err());
}

#[tokio::test]
async fn stats_output() {
    let backend = FakeBackend::seeded();
    let ctx = signed_in(&backend, ADMIN).await;

    let out = exec(&ctx, Command::Stats).await.unwrap();

    assert!(out.starts_with("Patients: 12 (8 actifs)\n"));
    assert!(out.contains("Taux de complétion: 12.5%"));
    assert!(out.lines().last().unwrap().ends_with(" <"));
}

#[tokio::test]
async fn prediction_board_output() {
    let backend = FakeBackend::seeded();
    let ctx = signed_in(&backend, ADMIN).await;

    let out = exec(
        &ctx,
        Command::Predictions {
            min_risk: 30.0,
            level: None,
        },
    )
    .await
    .unwrap();

    assert!(out.starts_with("Critique 2  Élevé 2  Moyen 0  Faible 0\n"));
    assert!(out.contains("Contacter Louis"));
    assert!(out.contains("Précision 0.0% (0/5)"));
}

#[tokio::test]
async fn backend_risk_category_wins_over_the_score() {
    let backend = FakeBackend::seeded();
    let mut patient = fixtures::patient(
        9999,
        "Rose",
        "Marchand",
        Some(MARTIN_ID),
        PatientStatus::Active,
        Some(78.0),
    );
    patient.risk_category = Some(RiskCategory::High);
    backend.insert_patient(patient);
    let ctx = signed_in(&backend, ADMIN).await;

    let out = exec(&ctx, Command::Patient { id: 9999 }).await.unwrap();

    assert!(out.contains("Risque: 78 (Élevé)\n"), "{out}");
}

#[tokio::test]
async fn score_is_bucketed_when_no_category_is_sent() {
    let backend = FakeBackend::seeded();
    let ctx = signed_in(&backend, ADMIN).await;

    // Patient 103 scores 88 with no category.
    let out = exec(&ctx, Command::Patient { id: 103 }).await.unwrap();

    assert!(out.contains("Risque: 88 (Critique)\n"), "{out}");
}

#[tokio::test]
async fn search_debounce_comes_from_config() {
    let backend = FakeBackend::seeded();
    let config = ClinassistConfig {
        search_debounce_ms: 120,
        ..ClinassistConfig::default()
    };
    let ctx = AppContext::from_parts(config, backend.api(), Arc::new(MemoryStore::new()));

    assert_eq!(ctx.search_debounce(), std::time::Duration::from_millis(120));
}
