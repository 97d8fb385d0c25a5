use std::sync::Arc;
use std::time::Duration;

use clinassist_core::Page;
use clinassist_core::models::patient::{Gender, Patient, PatientCreateRequest, PatientStatus};
use clinassist_services::{PatientService, ServiceError};
use thiserror::Error;
use tracing::{debug, info};

use crate::debounce::{Debounced, SEARCH_DEBOUNCE, SearchInput};

/// Risk score at or above which a patient counts as high risk on screen.
pub const HIGH_RISK_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatientFilter {
    #[default]
    All,
    Active,
    OnHold,
    HighRisk,
}

impl PatientFilter {
    pub fn matches(&self, patient: &Patient) -> bool {
        match self {
            PatientFilter::All => true,
            PatientFilter::Active => patient.status == PatientStatus::Active,
            PatientFilter::OnHold => patient.status == PatientStatus::OnHold,
            PatientFilter::HighRisk => is_high_risk(patient),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PatientFilter::All => "Tous",
            PatientFilter::Active => "Actifs",
            PatientFilter::OnHold => "En pause",
            PatientFilter::HighRisk => "À risque",
        }
    }
}

fn is_high_risk(patient: &Patient) -> bool {
    patient.risk_score.unwrap_or(0.0) >= HIGH_RISK_SCORE
}

/// Counters shown above the patient table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatientStats {
    pub total: usize,
    pub active: usize,
    pub on_hold: usize,
    pub high_risk: usize,
}

impl PatientStats {
    pub fn of(patients: &[Patient]) -> Self {
        let count = |f: PatientFilter| patients.iter().filter(|p| f.matches(p)).count();
        Self {
            total: patients.len(),
            active: count(PatientFilter::Active),
            on_hold: count(PatientFilter::OnHold),
            high_risk: count(PatientFilter::HighRisk),
        }
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Le champ « {0} » est obligatoire")]
    Required(&'static str),

    #[error("Adresse email invalide")]
    InvalidEmail,

    #[error("Date de naissance invalide")]
    InvalidDate,

    #[error("Erreur lors de l'enregistrement du patient")]
    Save(#[source] ServiceError),
}

/// Create/edit form bindings. Text fields are kept as typed; blank
/// optional fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: String,
    pub gender: Option<Gender>,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub medical_history: String,
    pub notes: String,
    pub assigned_therapeute_id: Option<i64>,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && domain.contains('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

impl PatientForm {
    /// Prefill from an existing patient for editing.
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            email: patient.email.clone().unwrap_or_default(),
            phone_number: patient.phone_number.clone().unwrap_or_default(),
            date_of_birth: patient
                .date_of_birth
                .map(|d| d.to_string())
                .unwrap_or_default(),
            gender: patient.gender,
            address: patient.address.clone().unwrap_or_default(),
            city: patient.city.clone().unwrap_or_default(),
            postal_code: patient.postal_code.clone().unwrap_or_default(),
            medical_history: patient.medical_history.clone().unwrap_or_default(),
            notes: patient.notes.clone().unwrap_or_default(),
            assigned_therapeute_id: patient.assigned_therapeute_id,
        }
    }

    /// Check required fields and formats, producing the request payload.
    pub fn validate(&self) -> Result<PatientCreateRequest, FormError> {
        let first_name = optional(&self.first_name).ok_or(FormError::Required("prénom"))?;
        let last_name = optional(&self.last_name).ok_or(FormError::Required("nom"))?;
        let email = optional(&self.email).ok_or(FormError::Required("email"))?;
        if !plausible_email(&email) {
            return Err(FormError::InvalidEmail);
        }
        let date_of_birth = match optional(&self.date_of_birth) {
            Some(raw) => Some(
                raw.parse::<jiff::civil::Date>()
                    .map_err(|_| FormError::InvalidDate)?,
            ),
            None => None,
        };

        Ok(PatientCreateRequest {
            first_name,
            last_name,
            email,
            phone_number: optional(&self.phone_number),
            date_of_birth,
            gender: self.gender,
            address: optional(&self.address),
            city: optional(&self.city),
            postal_code: optional(&self.postal_code),
            medical_history: optional(&self.medical_history),
            notes: optional(&self.notes),
            assigned_therapeute_id: self.assigned_therapeute_id,
        })
    }
}

/// Patient table: page, search and filter state over the shared patient
/// collection.
///
/// Keystrokes go to [`PatientListView::type_search`]; the list re-queries
/// only once typing has been quiet for the debounce window.
pub struct PatientListView {
    service: Arc<PatientService>,
    page: u32,
    size: u32,
    search: String,
    input: SearchInput,
    terms: Debounced,
    filter: PatientFilter,
    total_pages: u32,
    total_elements: u64,
}

impl PatientListView {
    pub fn new(service: Arc<PatientService>, size: u32) -> Self {
        let input = SearchInput::new();
        let terms = input.debounced(SEARCH_DEBOUNCE);
        Self {
            service,
            page: 0,
            size,
            search: String::new(),
            input,
            terms,
            filter: PatientFilter::All,
            total_pages: 0,
            total_elements: 0,
        }
    }

    /// Use `quiet` instead of [`SEARCH_DEBOUNCE`] before a typed term
    /// settles.
    pub fn with_search_debounce(mut self, quiet: Duration) -> Self {
        self.terms = self.input.debounced(quiet);
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn filter(&self) -> PatientFilter {
        self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.service.is_loading()
    }

    /// Fetch the current page. Failures show as an empty table.
    pub async fn load(&mut self) -> Page<Patient> {
        let search = (!self.search.is_empty()).then_some(self.search.as_str());
        let page = self.service.list(self.page, self.size, search).await;
        self.total_pages = page.total_pages;
        self.total_elements = page.total_elements;
        debug!(
            page = self.page,
            size = self.size,
            total = page.total_elements,
            "patient page loaded"
        );
        page
    }

    /// Apply a settled search term and go back to the first page.
    pub async fn search(&mut self, term: &str) -> Page<Patient> {
        self.search = term.trim().to_string();
        self.page = 0;
        self.load().await
    }

    pub async fn clear_search(&mut self) -> Page<Patient> {
        self.search("").await
    }

    /// Record a raw keystroke. Nothing is fetched until the term settles.
    pub fn type_search(&self, term: &str) {
        self.input.set(term);
    }

    /// Wait for the typed term to settle, then search for it.
    pub async fn settle_search(&mut self) -> Page<Patient> {
        let term = self.terms.next().await.unwrap_or_default();
        self.search(&term).await
    }

    pub async fn go_to(&mut self, page: u32) -> Option<Page<Patient>> {
        if page >= self.total_pages || page == self.page {
            return None;
        }
        self.page = page;
        Some(self.load().await)
    }

    pub async fn next_page(&mut self) -> Option<Page<Patient>> {
        self.go_to(self.page.saturating_add(1)).await
    }

    pub async fn prev_page(&mut self) -> Option<Page<Patient>> {
        match self.page.checked_sub(1) {
            Some(page) => self.go_to(page).await,
            None => None,
        }
    }

    /// Page numbers around the current one, at most two on each side.
    pub fn page_numbers(&self) -> Vec<u32> {
        if self.total_pages == 0 {
            return Vec::new();
        }
        let start = self.page.saturating_sub(2);
        let end = (self.page + 2).min(self.total_pages - 1);
        (start..=end).collect()
    }

    pub fn set_filter(&mut self, filter: PatientFilter) {
        self.filter = filter;
    }

    /// Cached patients with the search term and filter applied.
    pub fn visible(&self) -> Vec<Patient> {
        self.service
            .patients()
            .into_iter()
            .filter(|p| p.matches_search(&self.search))
            .filter(|p| self.filter.matches(p))
            .collect()
    }

    pub fn stats(&self) -> PatientStats {
        PatientStats::of(&self.service.patients())
    }

    pub async fn submit_create(&mut self, form: &PatientForm) -> Result<Patient, FormError> {
        let request = form.validate()?;
        let patient = self
            .service
            .create(&request)
            .await
            .map_err(FormError::Save)?;
        info!(patient_id = patient.id, "patient form saved");
        Ok(patient)
    }

    pub async fn submit_update(
        &mut self,
        id: i64,
        form: &PatientForm,
    ) -> Result<Patient, FormError> {
        let request = form.validate()?;
        self.service
            .update(id, &request)
            .await
            .map_err(FormError::Save)
    }

    pub async fn assign(&mut self, id: i64, therapeute_id: i64) -> Result<Patient, ServiceError> {
        self.service.assign_therapeute(id, therapeute_id).await
    }
}
