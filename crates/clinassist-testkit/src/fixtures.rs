//! Entity builders and the seeded clinic.
//!
//! The seeded clinic has two therapists with their own patients and
//! seances, a receptionist, an admin and a therapist account whose
//! therapist record is missing.

use clinassist_core::RiskCategory;
use clinassist_core::models::patient::{Patient, PatientStatus};
use clinassist_core::models::prediction::{PredictionDto, PredictionType};
use clinassist_core::models::seance::{Seance, SeanceStatus, SeanceType};
use clinassist_core::models::therapeute::Therapeute;
use clinassist_core::models::user::{Role, User};
use jiff::civil::{Date, DateTime, date};

/// The fake backend's "today".
pub const TODAY: Date = date(2025, 3, 12);

pub const ADMIN: (&str, &str) = ("admin", "admin123");
pub const MARTIN: (&str, &str) = ("dr.martin", "secret");
pub const BERNARD: (&str, &str) = ("dr.bernard", "secret");
pub const RECEPTION: (&str, &str) = ("accueil", "secret");
pub const ORPHAN: (&str, &str) = ("dr.orphan", "secret");

/// Therapist record of `dr.martin`.
pub const MARTIN_ID: i64 = 10;
/// Therapist record of `dr.bernard`.
pub const BERNARD_ID: i64 = 11;

pub fn at(day: Date, hour: i8, minute: i8) -> DateTime {
    day.at(hour, minute, 0, 0)
}

pub fn user(id: i64, username: &str, first: &str, last: &str, role: Role) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{username}@clinassist.test"),
        first_name: first.to_string(),
        last_name: last.to_string(),
        role,
        profile_image_url: None,
    }
}

pub fn therapeute(id: i64, user_id: i64, first: &str, last: &str, available: bool) -> Therapeute {
    Therapeute {
        id,
        user_id: Some(user_id),
        username: None,
        email: None,
        first_name: first.to_string(),
        last_name: last.to_string(),
        full_name: Some(format!("{first} {last}")),
        phone_number: None,
        profile_image_url: None,
        specialization: "Psychologie clinique".to_string(),
        license_number: Some(format!("LIC-{id:04}")),
        years_of_experience: Some(8),
        bio: None,
        available,
        total_patients: None,
        active_patients: None,
        today_seances: None,
        week_seances: None,
        rating: Some(4.6),
        created_at: None,
    }
}

pub fn patient(
    id: i64,
    first: &str,
    last: &str,
    therapeute_id: Option<i64>,
    status: PatientStatus,
    risk_score: Option<f64>,
) -> Patient {
    Patient {
        id,
        patient_code: format!("PAT-{id:05}"),
        user_id: None,
        username: None,
        email: Some(format!(
            "{}.{}@mail.test",
            first.to_lowercase(),
            last.to_lowercase()
        )),
        first_name: first.to_string(),
        last_name: last.to_string(),
        full_name: Some(format!("{first} {last}")),
        phone_number: None,
        profile_image_url: None,
        date_of_birth: Some(date(1988, 6, 14)),
        age: Some(36),
        gender: None,
        address: None,
        city: Some("Lyon".to_string()),
        postal_code: None,
        country: Some("France".to_string()),
        emergency_contact_name: None,
        emergency_contact_phone: None,
        emergency_contact_relation: None,
        medical_history: None,
        current_medications: None,
        allergies: None,
        notes: None,
        insurance_provider: None,
        insurance_number: None,
        status,
        assigned_therapeute_id: therapeute_id,
        assigned_therapeute_name: None,
        risk_score,
        risk_category: None,
        total_seances: Some(0),
        completed_seances: Some(0),
        next_seance_at: None,
        created_at: Some(at(date(2025, 1, 6), 9, 0)),
        updated_at: None,
    }
}

pub fn seance(
    id: i64,
    patient: &Patient,
    therapeute_id: i64,
    status: SeanceStatus,
    scheduled_at: DateTime,
) -> Seance {
    Seance {
        id,
        seance_code: Some(format!("SEA-{id:05}")),
        patient_id: patient.id,
        patient_name: Some(patient.display_name()),
        patient_code: Some(patient.patient_code.clone()),
        patient_image_url: None,
        therapeute_id,
        therapeute_name: None,
        therapeute_image_url: None,
        seance_type: SeanceType::InPerson,
        status,
        scheduled_at,
        started_at: None,
        ended_at: None,
        duration_minutes: 50,
        notes: None,
        objectives: None,
        outcomes: None,
        patient_mood: None,
        progress: None,
        next_steps: None,
        is_video_session: false,
        video_session_url: None,
        created_at: None,
    }
}

pub fn prediction(
    id: i64,
    patient: &Patient,
    kind: Option<PredictionType>,
    risk_level: f64,
    category: Option<RiskCategory>,
    factors: serde_json::Value,
) -> PredictionDto {
    PredictionDto {
        id,
        patient_id: patient.id,
        patient_name: Some(patient.display_name()),
        patient_code: Some(patient.patient_code.clone()),
        prediction_type: kind,
        prediction: Some(format!("Analyse du suivi de {}", patient.first_name)),
        confidence_score: Some(0.82),
        factors,
        recommendations: None,
        risk_level: Some(risk_level),
        risk_category: category,
        predicted_for_date: None,
        was_accurate: None,
        created_at: Some(at(TODAY, 7, 30)),
    }
}

/// Users with their passwords.
pub fn users() -> Vec<(User, String)> {
    [
        (user(1, ADMIN.0, "Alice", "Durand", Role::Admin), ADMIN.1),
        (user(2, MARTIN.0, "Claire", "Martin", Role::Therapeute), MARTIN.1),
        (user(3, BERNARD.0, "Paul", "Bernard", Role::Therapeute), BERNARD.1),
        (user(4, RECEPTION.0, "Sophie", "Leroy", Role::Receptionist), RECEPTION.1),
        (user(5, ORPHAN.0, "Marc", "Petit", Role::Therapeute), ORPHAN.1),
    ]
    .into_iter()
    .map(|(u, password)| (u, password.to_string()))
    .collect()
}

pub fn therapeutes() -> Vec<Therapeute> {
    vec![
        therapeute(MARTIN_ID, 2, "Claire", "Martin", true),
        therapeute(BERNARD_ID, 3, "Paul", "Bernard", false),
    ]
}

/// Seven patients for `dr.martin` (ids 100..=106), five for `dr.bernard`
/// (ids 107..=111).
pub fn patients() -> Vec<Patient> {
    use PatientStatus::*;

    let rows: [(&str, &str, PatientStatus, f64); 12] = [
        ("Lucie", "Moreau", Active, 12.0),
        ("Hugo", "Fournier", Active, 35.0),
        ("Emma", "Girard", OnHold, 72.0),
        ("Louis", "Bonnet", Active, 88.0),
        ("Chloe", "Dupont", Active, 55.0),
        ("Jules", "Lambert", Inactive, 20.0),
        ("Manon", "Fontaine", Active, 91.0),
        ("Nathan", "Rousseau", Active, 40.0),
        ("Ines", "Vincent", OnHold, 76.0),
        ("Adam", "Muller", Discharged, 15.0),
        ("Lea", "Faure", Active, 60.0),
        ("Tom", "Andre", Active, 30.0),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (first, last, status, risk))| {
            let id = 100 + i as i64;
            let owner = if id <= 106 { MARTIN_ID } else { BERNARD_ID };
            patient(id, first, last, Some(owner), status, Some(risk))
        })
        .collect()
}

pub fn seances(patients: &[Patient]) -> Vec<Seance> {
    use SeanceStatus::*;

    let by_id = |id: i64| patients.iter().find(|p| p.id == id);
    let rows: [(i64, i64, i64, SeanceStatus, DateTime); 8] = [
        (200, 100, MARTIN_ID, PendingApproval, at(TODAY, 10, 0)),
        (201, 101, MARTIN_ID, Scheduled, at(TODAY, 14, 0)),
        (202, 102, MARTIN_ID, Confirmed, at(date(2025, 3, 13), 9, 0)),
        (203, 103, MARTIN_ID, Completed, at(date(2025, 3, 10), 9, 0)),
        (204, 104, MARTIN_ID, PendingApproval, at(date(2025, 3, 14), 11, 0)),
        (205, 107, BERNARD_ID, PendingApproval, at(TODAY, 15, 0)),
        (206, 108, BERNARD_ID, Scheduled, at(date(2025, 3, 13), 16, 0)),
        (207, 109, BERNARD_ID, InProgress, at(date(2025, 3, 11), 10, 0)),
    ];

    rows.into_iter()
        .filter_map(|(id, patient_id, therapeute_id, status, when)| {
            by_id(patient_id).map(|p| seance(id, p, therapeute_id, status, when))
        })
        .collect()
}

pub fn predictions(patients: &[Patient]) -> Vec<PredictionDto> {
    let by_id = |id: i64| patients.iter().find(|p| p.id == id);
    let mut out = Vec::new();

    if let Some(p) = by_id(103) {
        out.push(prediction(
            300,
            p,
            Some(PredictionType::DropoutRisk),
            88.0,
            Some(RiskCategory::Critical),
            serde_json::json!({"Absences répétées": 0.6, "Baisse engagement": 0.3}),
        ));
    }
    if let Some(p) = by_id(106) {
        out.push(prediction(
            301,
            p,
            Some(PredictionType::NextSession),
            91.0,
            None,
            serde_json::json!(["Progression stagnante"]),
        ));
    }
    if let Some(p) = by_id(102) {
        out.push(prediction(
            302,
            p,
            Some(PredictionType::MoodTrend),
            72.0,
            Some(RiskCategory::High),
            serde_json::json!(["Humeur fluctuante", "Sommeil perturbé"]),
        ));
    }
    if let Some(p) = by_id(104) {
        out.push(prediction(
            303,
            p,
            Some(PredictionType::TreatmentOutcome),
            55.0,
            None,
            serde_json::Value::Null,
        ));
    }
    if let Some(p) = by_id(100) {
        out.push(prediction(
            304,
            p,
            None,
            12.0,
            Some(RiskCategory::Low),
            serde_json::json!([]),
        ));
    }

    out
}
