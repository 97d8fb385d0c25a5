use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Therapeute {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub profile_image_url: Option<String>,
    pub specialization: String,
    pub license_number: Option<String>,
    pub years_of_experience: Option<u32>,
    pub bio: Option<String>,
    pub available: bool,
    pub total_patients: Option<u32>,
    pub active_patients: Option<u32>,
    pub today_seances: Option<u32>,
    pub week_seances: Option<u32>,
    pub rating: Option<f64>,
    pub created_at: Option<jiff::civil::DateTime>,
}

impl Entity for Therapeute {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Therapeute {
    pub fn display_name(&self) -> String {
        match &self.full_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}
