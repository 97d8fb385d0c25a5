use std::sync::Arc;

use clinassist_auth::{AuthError, Session, SessionStore};
use clinassist_core::RiskThresholds;
use clinassist_core::models::user::LoginRequest;
use tracing::info;

use crate::context::ServiceContext;
use crate::dashboard::DashboardService;
use crate::error::ServiceError;
use crate::patients::PatientService;
use crate::predictions::PredictionService;
use crate::seances::SeanceService;
use crate::therapeutes::TherapeuteService;

/// Every service, built once around one session and one client. Views
/// hold `Arc`s to the services they bind to.
pub struct Services {
    pub session: Arc<SessionStore>,
    pub patients: Arc<PatientService>,
    pub therapeutes: Arc<TherapeuteService>,
    pub seances: Arc<SeanceService>,
    pub predictions: Arc<PredictionService>,
    pub dashboard: Arc<DashboardService>,
}

impl Services {
    pub fn new(session: Arc<SessionStore>, thresholds: RiskThresholds) -> Self {
        let ctx = ServiceContext::new(session.clone(), thresholds);
        Self {
            session,
            patients: Arc::new(PatientService::new(ctx.clone())),
            therapeutes: Arc::new(TherapeuteService::new(ctx.clone())),
            seances: Arc::new(SeanceService::new(ctx.clone())),
            predictions: Arc::new(PredictionService::new(ctx.clone())),
            dashboard: Arc::new(DashboardService::new(ctx)),
        }
    }

    /// Clear every cached collection, selection and snapshot.
    pub fn reset(&self) {
        self.patients.cache().reset();
        self.therapeutes.cache().reset();
        self.seances.reset();
        self.predictions.cache().reset();
        self.dashboard.reset();
    }

    /// Sign in and drop everything cached under the previous identity. A
    /// failed attempt leaves the caches as they were.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Session, AuthError> {
        let session = self.session.login(credentials).await?;
        self.reset();
        info!(user_id = session.user.id, "caches cleared for new session");
        Ok(session)
    }

    /// End the session and drop everything cached under it.
    pub fn logout(&self) -> Result<(), ServiceError> {
        self.session.logout()?;
        self.reset();
        info!("caches cleared");
        Ok(())
    }
}
