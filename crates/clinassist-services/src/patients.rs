use clinassist_auth::DataScope;
use clinassist_core::Page;
use clinassist_core::api_paths;
use clinassist_core::models::patient::{Patient, PatientCreateRequest, PatientStatus};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cache::{Collection, MergeMode};
use crate::context::{ServiceContext, check_page_size, page_query};
use crate::error::ServiceError;

/// Default `minRisk` for the high-risk patient listing.
pub const DEFAULT_HIGH_RISK_MIN: f64 = 70.0;

pub struct PatientService {
    ctx: ServiceContext,
    cache: Collection<Patient>,
}

impl PatientService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            cache: Collection::new(),
        }
    }

    pub fn cache(&self) -> &Collection<Patient> {
        &self.cache
    }

    pub fn patients(&self) -> Vec<Patient> {
        self.cache.items()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Patient>> {
        self.cache.subscribe()
    }

    pub fn selected(&self) -> Option<Patient> {
        self.cache.selected()
    }

    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    /// List one page of patients. Failures are logged and yield an empty
    /// page.
    pub async fn list(&self, page: u32, size: u32, search: Option<&str>) -> Page<Patient> {
        match self.try_list(page, size, search).await {
            Ok(result) => result,
            Err(e) => {
                warn!(page, size, error = %e, "failed to list patients");
                Page::empty(page, size)
            }
        }
    }

    /// List one page of patients, surfacing failures.
    ///
    /// A therapist session fetches its full patient list and pages it
    /// locally; other sessions use the backend's paging and search.
    pub async fn try_list(
        &self,
        page: u32,
        size: u32,
        search: Option<&str>,
    ) -> Result<Page<Patient>, ServiceError> {
        check_page_size(size)?;
        let search = search.map(str::trim).filter(|term| !term.is_empty());
        let ticket = self.cache.begin();

        let result = match self.ctx.scope() {
            DataScope::Therapeute(therapeute_id) => {
                let all: Vec<Patient> = self
                    .ctx
                    .api
                    .get(api_paths::patients_by_therapeute(therapeute_id), &[])
                    .await?;
                let filtered: Vec<Patient> = all
                    .into_iter()
                    .filter(|p| p.is_assigned_to(therapeute_id))
                    .filter(|p| search.is_none_or(|term| p.matches_search(term)))
                    .collect();
                Page::paginate(filtered, page, size)?
            }
            DataScope::Unresolved => {
                warn!("therapist not resolved; patient listing is empty");
                Page::empty(page, size)
            }
            DataScope::All => {
                let mut query = page_query(page, size);
                let path = match search {
                    Some(term) => {
                        query.push(("q", term.to_string()));
                        api_paths::PATIENTS_SEARCH
                    }
                    None => api_paths::PATIENTS,
                };
                self.ctx.api.get(path, &query).await?
            }
        };

        ticket.publish(result.content.clone());
        Ok(result)
    }

    pub async fn get(&self, id: i64) -> Result<Patient, ServiceError> {
        let patient: Patient = self.ctx.api.get(api_paths::patient(id), &[]).await?;
        self.cache.select(Some(patient.clone()));
        Ok(patient)
    }

    pub async fn get_by_code(&self, code: &str) -> Result<Patient, ServiceError> {
        let patient: Patient = self
            .ctx
            .api
            .get(api_paths::patient_by_code(code), &[])
            .await?;
        self.cache.select(Some(patient.clone()));
        Ok(patient)
    }

    /// All patients assigned to `therapeute_id`; the result becomes the
    /// cached collection.
    pub async fn list_by_therapeute(&self, therapeute_id: i64) -> Result<Vec<Patient>, ServiceError> {
        let ticket = self.cache.begin();
        let patients: Vec<Patient> = self
            .ctx
            .api
            .get(api_paths::patients_by_therapeute(therapeute_id), &[])
            .await?;
        ticket.publish(patients.clone());
        Ok(patients)
    }

    /// Patients at or above `min_risk`, restricted to the session's scope.
    /// Failures yield an empty list.
    pub async fn high_risk(&self, min_risk: f64) -> Vec<Patient> {
        let scope = self.ctx.scope();
        if scope == DataScope::Unresolved {
            return Vec::new();
        }

        let result: Result<Vec<Patient>, _> = self
            .ctx
            .api
            .get(
                api_paths::PATIENTS_HIGH_RISK,
                &[("minRisk", min_risk.to_string())],
            )
            .await;

        match result {
            Ok(patients) => match scope {
                DataScope::Therapeute(id) => patients
                    .into_iter()
                    .filter(|p| p.is_assigned_to(id))
                    .collect(),
                _ => patients,
            },
            Err(e) => {
                warn!(min_risk, error = %e, "failed to load high-risk patients");
                Vec::new()
            }
        }
    }

    pub async fn create(&self, request: &PatientCreateRequest) -> Result<Patient, ServiceError> {
        let patient: Patient = self.ctx.api.post(api_paths::PATIENTS, request).await?;
        info!(patient_id = patient.id, code = %patient.patient_code, "patient created");
        self.cache.merge(patient.clone(), MergeMode::Prepend);
        Ok(patient)
    }

    pub async fn update(
        &self,
        id: i64,
        request: &PatientCreateRequest,
    ) -> Result<Patient, ServiceError> {
        let patient: Patient = self.ctx.api.put(api_paths::patient(id), request).await?;
        info!(patient_id = id, "patient updated");
        self.cache.merge(patient.clone(), MergeMode::Replace);
        Ok(patient)
    }

    pub async fn update_status(
        &self,
        id: i64,
        status: PatientStatus,
    ) -> Result<Patient, ServiceError> {
        let patient: Patient = self
            .ctx
            .api
            .patch(
                api_paths::patient_status(id),
                &[("status", status.as_str().to_string())],
            )
            .await?;
        info!(patient_id = id, status = %status, "patient status updated");
        self.cache.merge(patient.clone(), MergeMode::Replace);
        Ok(patient)
    }

    pub async fn assign_therapeute(
        &self,
        id: i64,
        therapeute_id: i64,
    ) -> Result<Patient, ServiceError> {
        let patient: Patient = self
            .ctx
            .api
            .patch(api_paths::patient_assign(id, therapeute_id), &[])
            .await?;
        info!(patient_id = id, therapeute_id, "patient assigned");
        self.cache.merge(patient.clone(), MergeMode::Replace);
        Ok(patient)
    }

    pub fn clear_selection(&self) {
        self.cache.select(None);
    }
}
