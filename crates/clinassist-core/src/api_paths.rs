//! REST path conventions.
//!
//! Pure string functions with no HTTP dependency. These define the canonical
//! layout of the backend endpoints, relative to the configured API base URL.

pub const AUTH_LOGIN: &str = "/auth/login";

pub const AUTH_REFRESH: &str = "/auth/refresh";

// Patients

pub const PATIENTS: &str = "/patients";

pub const PATIENTS_SEARCH: &str = "/patients/search";

pub const PATIENTS_HIGH_RISK: &str = "/patients/high-risk";

pub fn patient(id: i64) -> String {
    format!("/patients/{id}")
}

pub fn patient_by_code(code: &str) -> String {
    format!("/patients/code/{code}")
}

pub fn patients_by_therapeute(therapeute_id: i64) -> String {
    format!("/patients/therapeute/{therapeute_id}")
}

pub fn patient_status(id: i64) -> String {
    format!("/patients/{id}/status")
}

pub fn patient_assign(id: i64, therapeute_id: i64) -> String {
    format!("/patients/{id}/assign/{therapeute_id}")
}

// Therapeutes

pub const THERAPEUTES: &str = "/therapeutes";

pub const THERAPEUTES_AVAILABLE: &str = "/therapeutes/available";

pub const THERAPEUTES_SEARCH: &str = "/therapeutes/search";

pub const THERAPEUTE_ME: &str = "/therapeutes/me";

pub fn therapeute(id: i64) -> String {
    format!("/therapeutes/{id}")
}

pub fn therapeute_by_user(user_id: i64) -> String {
    format!("/therapeutes/user/{user_id}")
}

pub fn therapeute_availability(id: i64) -> String {
    format!("/therapeutes/{id}/availability")
}

// Seances

pub const SEANCES: &str = "/seances";

pub const SEANCES_UPCOMING: &str = "/seances/upcoming";

pub const SEANCES_TODAY: &str = "/seances/today";

pub const SEANCES_RANGE: &str = "/seances/range";

pub fn seance(id: i64) -> String {
    format!("/seances/{id}")
}

pub fn seances_by_patient(patient_id: i64) -> String {
    format!("/seances/patient/{patient_id}")
}

pub fn seances_by_therapeute(therapeute_id: i64) -> String {
    format!("/seances/therapeute/{therapeute_id}")
}

pub fn seances_today_by_therapeute(therapeute_id: i64) -> String {
    format!("/seances/therapeute/{therapeute_id}/today")
}

pub fn seance_status(id: i64) -> String {
    format!("/seances/{id}/status")
}

pub fn seance_complete(id: i64) -> String {
    format!("/seances/{id}/complete")
}

pub fn seance_cancel(id: i64) -> String {
    format!("/seances/{id}/cancel")
}

pub fn seance_reschedule(id: i64) -> String {
    format!("/seances/{id}/reschedule")
}

// Predictions

pub const PREDICTIONS_HIGH_RISK: &str = "/predictions/high-risk";

pub const PREDICTIONS_ACTIVE: &str = "/predictions/active";

pub const PREDICTIONS_STATS: &str = "/predictions/stats";

pub fn prediction(id: i64) -> String {
    format!("/predictions/{id}")
}

pub fn predictions_by_patient(patient_id: i64) -> String {
    format!("/predictions/patient/{patient_id}")
}

pub fn prediction_next_session(patient_id: i64) -> String {
    format!("/predictions/patient/{patient_id}/next-session")
}

pub fn prediction_dropout_risk(patient_id: i64) -> String {
    format!("/predictions/patient/{patient_id}/dropout-risk")
}

pub fn prediction_reviewed(id: i64) -> String {
    format!("/predictions/{id}/reviewed")
}

// Dashboard

pub const DASHBOARD_STATS: &str = "/dashboard/stats";

pub const DASHBOARD_WEEKLY_ACTIVITY: &str = "/dashboard/weekly-activity";

pub const DASHBOARD_MONTHLY_ACTIVITY: &str = "/dashboard/monthly-activity";

pub const DASHBOARD_SEANCES_BY_TYPE: &str = "/dashboard/seances-by-type";
