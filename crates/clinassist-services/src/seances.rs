use std::collections::HashMap;

use clinassist_auth::DataScope;
use clinassist_client::ClientError;
use clinassist_core::api_paths;
use clinassist_core::models::seance::{
    CompleteSeanceRequest, Seance, SeanceAction, SeanceCreateRequest, SeanceStatus,
};
use clinassist_core::{CoreError, Page};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cache::{Collection, MergeMode};
use crate::context::{ServiceContext, check_page_size, page_query};
use crate::error::ServiceError;

/// Page size used when an unscoped session collects pending approvals.
pub const PENDING_FETCH_SIZE: u32 = 500;

pub struct SeanceService {
    ctx: ServiceContext,
    cache: Collection<Seance>,
    /// Status of every seance written through this service, whether or not
    /// the listing cache holds it.
    written: watch::Sender<HashMap<i64, SeanceStatus>>,
}

impl SeanceService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            cache: Collection::new(),
            written: watch::Sender::new(HashMap::new()),
        }
    }

    /// Drop the cached listing and every recorded write.
    pub fn reset(&self) {
        self.cache.reset();
        self.written.send_replace(HashMap::new());
    }

    /// Latest status this service has seen for `id`: the cached listing,
    /// then the selection, then writes made through it.
    pub fn known_status(&self, id: i64) -> Option<SeanceStatus> {
        self.cache
            .get(id)
            .or_else(|| self.cache.selected().filter(|s| s.id == id))
            .map(|s| s.status)
            .or_else(|| self.written.borrow().get(&id).copied())
    }

    pub fn cache(&self) -> &Collection<Seance> {
        &self.cache
    }

    pub fn seances(&self) -> Vec<Seance> {
        self.cache.items()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Seance>> {
        self.cache.subscribe()
    }

    pub fn selected(&self) -> Option<Seance> {
        self.cache.selected()
    }

    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    pub async fn list(&self, page: u32, size: u32) -> Page<Seance> {
        match self.try_list(page, size).await {
            Ok(result) => result,
            Err(e) => {
                warn!(page, size, error = %e, "failed to list seances");
                Page::empty(page, size)
            }
        }
    }

    pub async fn try_list(&self, page: u32, size: u32) -> Result<Page<Seance>, ServiceError> {
        check_page_size(size)?;
        let ticket = self.cache.begin();

        let result = match self.ctx.scope() {
            DataScope::Therapeute(therapeute_id) => {
                let all: Vec<Seance> = self
                    .ctx
                    .api
                    .get(api_paths::seances_by_therapeute(therapeute_id), &[])
                    .await?;
                let own: Vec<Seance> = all
                    .into_iter()
                    .filter(|s| s.therapeute_id == therapeute_id)
                    .collect();
                Page::paginate(own, page, size)?
            }
            DataScope::Unresolved => {
                warn!("therapist not resolved; seance listing is empty");
                Page::empty(page, size)
            }
            DataScope::All => {
                self.ctx
                    .api
                    .get(api_paths::SEANCES, &page_query(page, size))
                    .await?
            }
        };

        ticket.publish(result.content.clone());
        Ok(result)
    }

    pub async fn get(&self, id: i64) -> Result<Seance, ServiceError> {
        let seance: Seance = self.ctx.api.get(api_paths::seance(id), &[]).await?;
        self.cache.select(Some(seance.clone()));
        Ok(seance)
    }

    pub async fn upcoming(&self) -> Vec<Seance> {
        self.scoped("upcoming", api_paths::SEANCES_UPCOMING.to_string(), &[])
            .await
    }

    pub async fn range(
        &self,
        start: jiff::civil::DateTime,
        end: jiff::civil::DateTime,
    ) -> Vec<Seance> {
        self.scoped(
            "range",
            api_paths::SEANCES_RANGE.to_string(),
            &[("start", start.to_string()), ("end", end.to_string())],
        )
        .await
    }

    pub async fn by_patient(&self, patient_id: i64) -> Vec<Seance> {
        self.scoped("by_patient", api_paths::seances_by_patient(patient_id), &[])
            .await
    }

    pub async fn by_therapeute(&self, therapeute_id: i64) -> Vec<Seance> {
        match self
            .ctx
            .api
            .get(api_paths::seances_by_therapeute(therapeute_id), &[])
            .await
        {
            Ok(seances) => seances,
            Err(e) => {
                warn!(therapeute_id, error = %e, "failed to load therapist seances");
                Vec::new()
            }
        }
    }

    /// Today's seances: the therapist's own when scoped, all otherwise.
    pub async fn today(&self) -> Vec<Seance> {
        let path = match self.ctx.scope() {
            DataScope::Therapeute(id) => api_paths::seances_today_by_therapeute(id),
            DataScope::Unresolved => return Vec::new(),
            DataScope::All => api_paths::SEANCES_TODAY.to_string(),
        };
        self.scoped("today", path, &[]).await
    }

    /// Seances awaiting approval in the session's scope. Failures yield an
    /// empty list.
    pub async fn pending_approvals(&self) -> Vec<Seance> {
        match self.try_pending_approvals().await {
            Ok(seances) => seances,
            Err(e) => {
                warn!(error = %e, "failed to load pending approvals");
                Vec::new()
            }
        }
    }

    pub async fn try_pending_approvals(&self) -> Result<Vec<Seance>, ServiceError> {
        let seances: Vec<Seance> = match self.ctx.scope() {
            DataScope::Therapeute(id) => {
                let all: Vec<Seance> = self
                    .ctx
                    .api
                    .get(api_paths::seances_by_therapeute(id), &[])
                    .await?;
                all.into_iter().filter(|s| s.therapeute_id == id).collect()
            }
            DataScope::Unresolved => Vec::new(),
            DataScope::All => {
                let page: Page<Seance> = self
                    .ctx
                    .api
                    .get(api_paths::SEANCES, &page_query(0, PENDING_FETCH_SIZE))
                    .await?;
                page.content
            }
        };
        Ok(seances
            .into_iter()
            .filter(Seance::is_pending_approval)
            .collect())
    }

    pub async fn create(&self, request: &SeanceCreateRequest) -> Result<Seance, ServiceError> {
        let seance: Seance = self.ctx.api.post(api_paths::SEANCES, request).await?;
        info!(seance_id = seance.id, patient_id = seance.patient_id, "seance created");
        self.store(&seance, MergeMode::Prepend);
        Ok(seance)
    }

    pub async fn update(
        &self,
        id: i64,
        request: &SeanceCreateRequest,
    ) -> Result<Seance, ServiceError> {
        let seance: Seance = self.ctx.api.put(api_paths::seance(id), request).await?;
        info!(seance_id = id, "seance updated");
        self.store(&seance, MergeMode::Replace);
        Ok(seance)
    }

    /// Move a seance to `status`, rejecting transitions the lifecycle does
    /// not allow before anything is sent.
    pub async fn update_status(
        &self,
        id: i64,
        status: SeanceStatus,
    ) -> Result<Seance, ServiceError> {
        let from = self.current_status(id).await?;
        from.transition(status)
            .map_err(|e| invalid_transition(id, e))?;
        self.send_status(id, status).await
    }

    pub async fn approve(&self, id: i64) -> Result<Seance, ServiceError> {
        self.run_status_action(id, SeanceAction::Approve).await
    }

    pub async fn reject(&self, id: i64) -> Result<Seance, ServiceError> {
        self.run_status_action(id, SeanceAction::Reject).await
    }

    pub async fn confirm(&self, id: i64) -> Result<Seance, ServiceError> {
        self.run_status_action(id, SeanceAction::Confirm).await
    }

    pub async fn start(&self, id: i64) -> Result<Seance, ServiceError> {
        self.run_status_action(id, SeanceAction::Start).await
    }

    pub async fn mark_no_show(&self, id: i64) -> Result<Seance, ServiceError> {
        self.run_status_action(id, SeanceAction::MarkNoShow).await
    }

    pub async fn complete(
        &self,
        id: i64,
        notes: Option<String>,
        outcomes: Option<String>,
    ) -> Result<Seance, ServiceError> {
        self.check_action(id, SeanceAction::Complete).await?;
        let body = CompleteSeanceRequest { notes, outcomes };
        let seance: Seance = self
            .ctx
            .api
            .patch_json(api_paths::seance_complete(id), &body)
            .await?;
        info!(seance_id = id, "seance completed");
        self.store(&seance, MergeMode::Replace);
        Ok(seance)
    }

    pub async fn cancel(&self, id: i64, reason: Option<&str>) -> Result<Seance, ServiceError> {
        self.check_action(id, SeanceAction::Cancel).await?;
        let query: Vec<(&str, String)> = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| vec![("reason", r.to_string())])
            .unwrap_or_default();
        let seance: Seance = self
            .ctx
            .api
            .patch(api_paths::seance_cancel(id), &query)
            .await?;
        info!(seance_id = id, "seance cancelled");
        self.store(&seance, MergeMode::Replace);
        Ok(seance)
    }

    pub async fn reschedule(
        &self,
        id: i64,
        new_time: jiff::civil::DateTime,
    ) -> Result<Seance, ServiceError> {
        self.check_action(id, SeanceAction::Reschedule).await?;
        let seance: Seance = self
            .ctx
            .api
            .patch(
                api_paths::seance_reschedule(id),
                &[("newDateTime", new_time.to_string())],
            )
            .await?;
        info!(seance_id = id, scheduled_at = %seance.scheduled_at, "seance rescheduled");
        self.store(&seance, MergeMode::Replace);
        Ok(seance)
    }

    async fn run_status_action(
        &self,
        id: i64,
        action: SeanceAction,
    ) -> Result<Seance, ServiceError> {
        let target = self.check_action(id, action).await?;
        self.send_status(id, target).await
    }

    async fn check_action(
        &self,
        id: i64,
        action: SeanceAction,
    ) -> Result<SeanceStatus, ServiceError> {
        let from = self.current_status(id).await?;
        from.apply(action).map_err(|e| invalid_transition(id, e))
    }

    async fn send_status(&self, id: i64, status: SeanceStatus) -> Result<Seance, ServiceError> {
        let seance: Seance = self
            .ctx
            .api
            .patch(
                api_paths::seance_status(id),
                &[("status", status.as_str().to_string())],
            )
            .await?;
        info!(seance_id = id, status = %status, "seance status updated");
        self.store(&seance, MergeMode::Replace);
        Ok(seance)
    }

    fn store(&self, seance: &Seance, mode: MergeMode) {
        self.written.send_modify(|written| {
            written.insert(seance.id, seance.status);
        });
        self.cache.merge(seance.clone(), mode);
    }

    /// Last known status, falling back to the backend.
    async fn current_status(&self, id: i64) -> Result<SeanceStatus, ServiceError> {
        if let Some(status) = self.known_status(id) {
            return Ok(status);
        }
        let seance: Seance = self.ctx.api.get(api_paths::seance(id), &[]).await?;
        Ok(seance.status)
    }

    /// Fetch a seance listing restricted to the session's scope. Failures
    /// are logged and yield an empty list.
    async fn scoped(&self, what: &str, path: String, query: &[(&str, String)]) -> Vec<Seance> {
        if self.ctx.scope() == DataScope::Unresolved {
            return Vec::new();
        }
        let fetched: Result<Vec<Seance>, ClientError> = self.ctx.api.get(path, query).await;
        match fetched {
            Ok(seances) => self.restrict(seances),
            Err(e) => {
                warn!(listing = what, error = %e, "failed to load seances");
                Vec::new()
            }
        }
    }

    /// Drop seances outside the session's scope.
    fn restrict(&self, seances: Vec<Seance>) -> Vec<Seance> {
        match self.ctx.scope() {
            DataScope::All => seances,
            DataScope::Therapeute(id) => seances
                .into_iter()
                .filter(|s| s.therapeute_id == id)
                .collect(),
            DataScope::Unresolved => Vec::new(),
        }
    }
}

fn invalid_transition(seance_id: i64, error: CoreError) -> ServiceError {
    match error {
        CoreError::InvalidTransition { from, to } => {
            warn!(seance_id, %from, %to, "rejected seance transition");
            ServiceError::InvalidTransition { seance_id, from, to }
        }
        other => ServiceError::Core(other),
    }
}
