use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::Entity;
use crate::risk::RiskCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PatientStatus {
    Active,
    Inactive,
    OnHold,
    Discharged,
}

impl PatientStatus {
    pub const ALL: [PatientStatus; 4] = [
        PatientStatus::Active,
        PatientStatus::Inactive,
        PatientStatus::OnHold,
        PatientStatus::Discharged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "ACTIVE",
            PatientStatus::Inactive => "INACTIVE",
            PatientStatus::OnHold => "ON_HOLD",
            PatientStatus::Discharged => "DISCHARGED",
        }
    }
}

impl std::fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Patient {
    pub id: i64,
    pub patient_code: String,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub profile_image_url: Option<String>,
    pub date_of_birth: Option<jiff::civil::Date>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relation: Option<String>,
    pub medical_history: Option<String>,
    pub current_medications: Option<String>,
    pub allergies: Option<String>,
    pub notes: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_number: Option<String>,
    pub status: PatientStatus,
    pub assigned_therapeute_id: Option<i64>,
    pub assigned_therapeute_name: Option<String>,
    pub risk_score: Option<f64>,
    pub risk_category: Option<RiskCategory>,
    pub total_seances: Option<u32>,
    pub completed_seances: Option<u32>,
    pub next_seance_at: Option<jiff::civil::DateTime>,
    pub created_at: Option<jiff::civil::DateTime>,
    pub updated_at: Option<jiff::civil::DateTime>,
}

impl Entity for Patient {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Patient {
    pub fn display_name(&self) -> String {
        match &self.full_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// Case-insensitive match of `term` against first name, last name,
    /// email and patient code. An empty term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        let hit = |value: &str| value.to_lowercase().contains(&term);
        hit(&self.first_name)
            || hit(&self.last_name)
            || self.email.as_deref().is_some_and(hit)
            || hit(&self.patient_code)
    }

    pub fn is_assigned_to(&self, therapeute_id: i64) -> bool {
        self.assigned_therapeute_id == Some(therapeute_id)
    }
}

/// Payload for `POST /patients` and `PUT /patients/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PatientCreateRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<jiff::civil::Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_therapeute_id: Option<i64>,
}

impl PatientCreateRequest {
    /// True when `patient` carries this payload's client-supplied fields.
    /// Server-assigned fields (id, code, timestamps) are ignored.
    pub fn is_reflected_by(&self, patient: &Patient) -> bool {
        patient.first_name == self.first_name
            && patient.last_name == self.last_name
            && patient.email.as_deref() == Some(self.email.as_str())
            && (self.assigned_therapeute_id.is_none()
                || patient.assigned_therapeute_id == self.assigned_therapeute_id)
    }
}
