use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clinassist_core::risk;
use clinassist_core::{RiskCategory, RiskThresholds};
use clinassist_core::models::seance::{Seance, SeanceStatus};
use clinassist_services::predictions::DEFAULT_HIGH_RISK_MIN;
use clinassist_views::predictions::suggested_action;
use clinassist_views::{
    Badge, DashboardView, LoginForm, PatientFilter, PatientListView, PendingApprovalsView,
    PredictionsView, SeanceListView,
};

use crate::state::AppContext;

#[derive(Debug, Parser)]
#[command(name = "clinassist", version, about = "ClinAssist clinic dashboard in the terminal")]
pub struct Cli {
    /// Backend base URL, overriding the config file.
    #[arg(long, env = "CLINASSIST_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Config directory (defaults to the platform config dir).
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in and persist the session.
    Login {
        username: String,
        #[arg(long, env = "CLINASSIST_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the stored session.
    Logout,
    /// Show the signed-in user and data scope.
    Whoami,
    /// List patients, one page at a time.
    Patients {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// Show one patient with their seances and predictions.
    Patient { id: i64 },
    /// List seances.
    Seances {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long, value_parser = parse_seance_status)]
        status: Option<SeanceStatus>,
        /// Only today's seances.
        #[arg(long, conflicts_with_all = ["page", "status"])]
        today: bool,
    },
    /// Seances waiting for approval.
    Pending,
    /// Approve a pending seance.
    Approve { id: i64 },
    /// Reject a pending seance.
    Reject { id: i64 },
    /// High-risk predictions with suggested follow-ups.
    Predictions {
        #[arg(long, default_value_t = DEFAULT_HIGH_RISK_MIN)]
        min_risk: f64,
        #[arg(long, value_enum)]
        level: Option<LevelArg>,
    },
    /// Dashboard figures.
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    All,
    Active,
    OnHold,
    HighRisk,
}

impl From<FilterArg> for PatientFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => PatientFilter::All,
            FilterArg::Active => PatientFilter::Active,
            FilterArg::OnHold => PatientFilter::OnHold,
            FilterArg::HighRisk => PatientFilter::HighRisk,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Low,
    Medium,
    High,
    Critical,
}

impl From<LevelArg> for RiskCategory {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Low => RiskCategory::Low,
            LevelArg::Medium => RiskCategory::Medium,
            LevelArg::High => RiskCategory::High,
            LevelArg::Critical => RiskCategory::Critical,
        }
    }
}

/// Accepts the wire spelling in any case, with `-` or `_`.
pub fn parse_seance_status(raw: &str) -> Result<SeanceStatus, String> {
    let wire = raw.trim().replace('-', "_").to_uppercase();
    serde_json::from_value(serde_json::Value::String(wire))
        .map_err(|_| format!("unknown seance status '{raw}'"))
}

/// Run one command against the context, writing plain text to `out`.
pub async fn run(command: Command, ctx: &AppContext, out: &mut impl Write) -> eyre::Result<()> {
    match command {
        Command::Login { username, password } => login(ctx, username, password, out).await,
        Command::Logout => {
            ctx.services.logout()?;
            writeln!(out, "Déconnecté")?;
            Ok(())
        }
        Command::Whoami => whoami(ctx, out),
        other => {
            if !ctx.session().is_authenticated() {
                eyre::bail!("not signed in; run `clinassist login <username>` first");
            }
            run_signed_in(other, ctx, out).await
        }
    }
}

async fn run_signed_in(command: Command, ctx: &AppContext, out: &mut impl Write) -> eyre::Result<()> {
    let default_size = ctx.config.default_page_size;
    match command {
        Command::Patients {
            page,
            size,
            search,
            filter,
        } => {
            let mut view =
                PatientListView::new(ctx.services.patients.clone(), size.unwrap_or(default_size))
                    .with_search_debounce(ctx.search_debounce());
            match search.as_deref() {
                Some(term) => view.search(term).await,
                None => view.load().await,
            };
            if page > 0 && view.go_to(page).await.is_none() {
                eyre::bail!("page {page} is out of range ({} pages)", view.total_pages());
            }
            view.set_filter(filter.into());

            for p in view.visible() {
                writeln!(
                    out,
                    "{:>6}  {:<10}  {:<28}  {:<9}  {}",
                    p.id,
                    p.patient_code,
                    p.display_name(),
                    p.status.label(),
                    format_risk(p.risk_category, p.risk_score, &ctx.config.risk_thresholds),
                )?;
            }
            writeln!(
                out,
                "page {}/{} ({} patients, filtre: {})",
                view.page() + 1,
                view.total_pages().max(1),
                view.total_elements(),
                view.filter().label(),
            )?;
        }
        Command::Patient { id } => {
            let patients = &ctx.services.patients;
            let (patient, seances, predictions) = tokio::join!(
                patients.get(id),
                ctx.services.seances.by_patient(id),
                ctx.services.predictions.for_patient(id),
            );
            let patient = patient?;
            writeln!(out, "{} ({})", patient.display_name(), patient.patient_code)?;
            writeln!(out, "Statut: {}", patient.status.label())?;
            if let Some(email) = &patient.email {
                writeln!(out, "Email: {email}")?;
            }
            let risk = format_risk(
                patient.risk_category,
                patient.risk_score,
                &ctx.config.risk_thresholds,
            );
            writeln!(out, "Risque: {risk}")?;
            if let Some(name) = &patient.assigned_therapeute_name {
                writeln!(out, "Thérapeute: {name}")?;
            }
            writeln!(out, "Séances: {}", seances.len())?;
            for s in &seances {
                write_seance(out, s)?;
            }
            writeln!(out, "Prédictions: {}", predictions.len())?;
            for p in &predictions {
                writeln!(
                    out,
                    "  {:<8}  {:>5.1}  {}",
                    p.risk_level.label(),
                    p.score,
                    p.prediction_type.label()
                )?;
            }
        }
        Command::Seances {
            page,
            size,
            status,
            today,
        } => {
            if today {
                let seances = ctx.services.seances.today().await;
                for s in &seances {
                    write_seance(out, s)?;
                }
                writeln!(out, "{} séance(s) aujourd'hui", seances.len())?;
                return Ok(());
            }

            let mut view =
                SeanceListView::new(ctx.services.seances.clone(), size.unwrap_or(default_size));
            view.load().await;
            for _ in 0..page {
                if view.next_page().await.is_none() {
                    eyre::bail!("page {page} is out of range ({} pages)", view.total_pages());
                }
            }
            view.set_status_filter(status);
            for (day, seances) in view.by_day() {
                writeln!(out, "{}", day.strftime("%d/%m/%Y"))?;
                for s in &seances {
                    write_seance(out, s)?;
                }
            }
            writeln!(out, "page {}/{}", view.page() + 1, view.total_pages().max(1))?;
        }
        Command::Pending => {
            let mut view = PendingApprovalsView::new(ctx.services.seances.clone());
            let pending = view.load().await;
            if pending.is_empty() {
                writeln!(out, "Aucune séance en attente")?;
            }
            for s in &pending {
                write_seance(out, s)?;
            }
        }
        Command::Approve { id } => {
            let seance = ctx.services.seances.approve(id).await?;
            writeln!(out, "Séance {} {}", seance.id, seance.status.label())?;
        }
        Command::Reject { id } => {
            let seance = ctx.services.seances.reject(id).await?;
            writeln!(out, "Séance {} {}", seance.id, seance.status.label())?;
        }
        Command::Predictions { min_risk, level } => {
            let mut view = PredictionsView::new(ctx.services.predictions.clone(), min_risk);
            view.load().await;
            view.set_filter(level.map(Into::into));

            let counts = view.counts();
            writeln!(
                out,
                "Critique {}  Élevé {}  Moyen {}  Faible {}",
                counts.critical, counts.high, counts.medium, counts.low
            )?;
            for p in view.visible() {
                writeln!(
                    out,
                    "{:>6}  {:<24}  {:<8}  {:>5.1}  {}",
                    p.id,
                    p.patient_name,
                    p.risk_level.label(),
                    p.score,
                    suggested_action(&p),
                )?;
            }
            if let Some(stats) = view.stats() {
                writeln!(
                    out,
                    "Précision {:.1}% ({}/{})",
                    stats.accuracy, stats.successful, stats.total
                )?;
            }
        }
        Command::Stats => {
            let mut view = DashboardView::new(ctx.services.dashboard.clone());
            view.load().await;
            let Some(stats) = view.stats() else {
                writeln!(out, "Statistiques indisponibles")?;
                return Ok(());
            };
            writeln!(out, "Patients: {} ({} actifs)", stats.total_patients, stats.active_patients)?;
            writeln!(out, "Séances: {} ({} aujourd'hui)", stats.total_seances, stats.today_seances)?;
            writeln!(out, "Patients à risque: {}", stats.high_risk_patients)?;
            writeln!(out, "Taux de complétion: {:.1}%", view.completion_rate())?;
            for bar in view.weekly_bars() {
                let marker = if bar.is_today { " <" } else { "" };
                writeln!(
                    out,
                    "{:<4} {:<20} {}{marker}",
                    bar.label,
                    "#".repeat((bar.percent / 5.0).round() as usize),
                    bar.count,
                )?;
            }
        }
        Command::Login { .. } | Command::Logout | Command::Whoami => {}
    }
    Ok(())
}

async fn login(
    ctx: &AppContext,
    username: String,
    password: String,
    out: &mut impl Write,
) -> eyre::Result<()> {
    let form = LoginForm {
        username_or_email: username,
        password,
    };
    let session = form.submit(&ctx.services).await?;
    writeln!(
        out,
        "Connecté en tant que {} {} ({})",
        session.user.first_name, session.user.last_name, session.user.role
    )?;
    Ok(())
}

fn whoami(ctx: &AppContext, out: &mut impl Write) -> eyre::Result<()> {
    let Some(session) = ctx.session().session() else {
        writeln!(out, "Non connecté")?;
        return Ok(());
    };
    writeln!(
        out,
        "{} ({}, {})",
        session.user.username, session.user.email, session.user.role
    )?;
    match (session.therapeute_id, ctx.session().current_therapeute()) {
        (Some(id), Some(t)) => writeln!(out, "Thérapeute #{id}: {}", t.display_name())?,
        (Some(id), None) => writeln!(out, "Thérapeute #{id}")?,
        (None, _) => {}
    }
    if !ctx.session().is_authenticated() {
        writeln!(out, "Session expirée")?;
    }
    Ok(())
}

/// Score with its category; the backend's category wins over bucketing.
fn format_risk(
    category: Option<RiskCategory>,
    score: Option<f64>,
    thresholds: &RiskThresholds,
) -> String {
    match (score, risk::resolve(category, score, thresholds)) {
        (Some(score), Some(level)) => format!("{score:.0} ({})", level.label()),
        (None, Some(level)) => level.label().to_string(),
        (_, None) => "-".to_string(),
    }
}

fn write_seance(out: &mut impl Write, s: &Seance) -> std::io::Result<()> {
    writeln!(
        out,
        "  {:>5}  {}  {:<24}  {:<10}  {}",
        s.id,
        s.scheduled_at.strftime("%d/%m %H:%M"),
        s.patient_name.as_deref().unwrap_or("-"),
        s.status.label(),
        s.seance_type.label(),
    )
}
