use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::patient::Patient;
use crate::models::prediction::PredictionDto;
use crate::models::seance::Seance;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChartDataPoint {
    pub label: String,
    pub value: f64,
    pub color: Option<String>,
}

/// Aggregates returned by `GET /dashboard/stats`. Every field is optional on
/// the wire; missing values default to zero or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct DashboardStats {
    pub total_patients: u64,
    pub active_patients: u64,
    pub new_patients_this_month: u64,
    pub patient_growth_percentage: f64,
    pub total_therapeutes: u64,
    pub available_therapeutes: u64,
    pub total_seances: u64,
    pub today_seances: u64,
    pub upcoming_seances: u64,
    pub completed_seances_this_month: u64,
    pub seance_completion_rate: f64,
    pub high_risk_patients: u64,
    pub average_risk_score: f64,
    pub prediction_accuracy: f64,
    pub total_predictions: u64,
    pub upcoming_seances_list: Vec<Seance>,
    pub recent_patients: Vec<Patient>,
    pub recent_predictions: Vec<PredictionDto>,
    pub seances_by_type: BTreeMap<String, u64>,
    pub patients_by_status: BTreeMap<String, u64>,
    pub seances_trend: Vec<ChartDataPoint>,
    pub patients_trend: Vec<ChartDataPoint>,
}
