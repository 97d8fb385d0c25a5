//! French labels and CSS classes for every enum shown on screen.

use clinassist_core::RiskCategory;
use clinassist_core::models::patient::PatientStatus;
use clinassist_core::models::prediction::PredictionType;
use clinassist_core::models::seance::{SeanceStatus, SeanceType};

/// Display text and badge class of an enum value.
pub trait Badge {
    fn label(&self) -> &'static str;
    fn class(&self) -> &'static str;
}

impl Badge for PatientStatus {
    fn label(&self) -> &'static str {
        match self {
            PatientStatus::Active => "Actif",
            PatientStatus::OnHold => "En pause",
            PatientStatus::Inactive => "Inactif",
            PatientStatus::Discharged => "Sorti",
        }
    }

    fn class(&self) -> &'static str {
        match self {
            PatientStatus::Active => "bg-success-subtle text-success",
            PatientStatus::OnHold => "bg-warning-subtle text-warning",
            PatientStatus::Inactive => "bg-secondary-subtle text-secondary",
            PatientStatus::Discharged => "bg-info-subtle text-info",
        }
    }
}

impl Badge for SeanceStatus {
    fn label(&self) -> &'static str {
        match self {
            SeanceStatus::PendingApproval => "En attente",
            SeanceStatus::Scheduled => "Planifié",
            SeanceStatus::Confirmed => "Confirmé",
            SeanceStatus::InProgress => "En cours",
            SeanceStatus::Completed => "Terminé",
            SeanceStatus::Cancelled => "Annulé",
            SeanceStatus::NoShow => "Absent",
            SeanceStatus::Rescheduled => "Reporté",
        }
    }

    fn class(&self) -> &'static str {
        match self {
            SeanceStatus::PendingApproval | SeanceStatus::Scheduled => "bg-warning",
            SeanceStatus::Confirmed => "bg-primary",
            SeanceStatus::InProgress | SeanceStatus::Rescheduled => "bg-info",
            SeanceStatus::Completed => "bg-success",
            SeanceStatus::Cancelled => "bg-danger",
            SeanceStatus::NoShow => "bg-secondary",
        }
    }
}

impl Badge for SeanceType {
    fn label(&self) -> &'static str {
        match self {
            SeanceType::InPerson => "En personne",
            SeanceType::VideoCall => "Vidéo",
            SeanceType::PhoneCall => "Téléphone",
            SeanceType::HomeVisit => "À domicile",
            SeanceType::GroupSession => "Groupe",
            SeanceType::Consultation => "Consultation",
            SeanceType::Therapy => "Thérapie",
            SeanceType::FollowUp => "Suivi",
            SeanceType::Video => "Vidéoconférence",
            SeanceType::Emergency => "Urgence",
        }
    }

    fn class(&self) -> &'static str {
        match self {
            SeanceType::InPerson | SeanceType::Consultation => "bg-primary",
            SeanceType::VideoCall | SeanceType::Video => "bg-info",
            SeanceType::PhoneCall => "bg-warning",
            SeanceType::HomeVisit | SeanceType::Therapy | SeanceType::FollowUp => "bg-success",
            SeanceType::GroupSession => "bg-secondary",
            SeanceType::Emergency => "bg-danger",
        }
    }
}

impl Badge for RiskCategory {
    fn label(&self) -> &'static str {
        match self {
            RiskCategory::Critical => "Critique",
            RiskCategory::High => "Élevé",
            RiskCategory::Medium => "Modéré",
            RiskCategory::Low => "Faible",
        }
    }

    fn class(&self) -> &'static str {
        match self {
            RiskCategory::Critical => "bg-danger-subtle text-danger",
            RiskCategory::High => "bg-warning-subtle text-warning",
            RiskCategory::Medium => "bg-info-subtle text-info",
            RiskCategory::Low => "bg-success-subtle text-success",
        }
    }
}

impl Badge for PredictionType {
    fn label(&self) -> &'static str {
        match self {
            PredictionType::DropoutRisk => "Risque abandon",
            PredictionType::NextSession => "Prochaine séance",
            PredictionType::TreatmentOutcome => "Résultat traitement",
            PredictionType::MoodTrend => "Tendance humeur",
        }
    }

    fn class(&self) -> &'static str {
        match self {
            PredictionType::DropoutRisk => "bg-danger",
            PredictionType::NextSession => "bg-success",
            PredictionType::MoodTrend => "bg-warning",
            PredictionType::TreatmentOutcome => "bg-primary",
        }
    }
}

/// Solid avatar class for a risk level.
pub fn risk_avatar_class(level: RiskCategory) -> &'static str {
    match level {
        RiskCategory::Critical => "bg-danger text-white",
        RiskCategory::High => "bg-warning text-white",
        RiskCategory::Medium => "bg-info text-white",
        RiskCategory::Low => "bg-success text-white",
    }
}

/// Progress-bar class for a raw patient risk score.
pub fn risk_score_class(score: Option<f64>) -> &'static str {
    match score.unwrap_or(0.0) {
        s if s >= 70.0 => "bg-danger",
        s if s >= 40.0 => "bg-warning",
        _ => "bg-success",
    }
}

/// Up to two uppercase initials; `?` for an empty name.
pub fn initials(name: &str) -> String {
    let mut parts = name.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(first), Some(second)) => first
            .chars()
            .take(1)
            .chain(second.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect(),
        (Some(only), None) => only.chars().take(2).flat_map(char::to_uppercase).collect(),
        _ => "?".to_string(),
    }
}
