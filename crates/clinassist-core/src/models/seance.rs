use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::models::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum SeanceType {
    InPerson,
    VideoCall,
    PhoneCall,
    HomeVisit,
    GroupSession,
    Consultation,
    Therapy,
    FollowUp,
    Video,
    Emergency,
}

impl SeanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeanceType::InPerson => "IN_PERSON",
            SeanceType::VideoCall => "VIDEO_CALL",
            SeanceType::PhoneCall => "PHONE_CALL",
            SeanceType::HomeVisit => "HOME_VISIT",
            SeanceType::GroupSession => "GROUP_SESSION",
            SeanceType::Consultation => "CONSULTATION",
            SeanceType::Therapy => "THERAPY",
            SeanceType::FollowUp => "FOLLOW_UP",
            SeanceType::Video => "VIDEO",
            SeanceType::Emergency => "EMERGENCY",
        }
    }
}

/// Lifecycle of a Seance.
///
/// COMPLETED, CANCELLED and NO_SHOW are terminal: no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum SeanceStatus {
    PendingApproval,
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl SeanceStatus {
    pub const ALL: [SeanceStatus; 8] = [
        SeanceStatus::PendingApproval,
        SeanceStatus::Scheduled,
        SeanceStatus::Confirmed,
        SeanceStatus::InProgress,
        SeanceStatus::Completed,
        SeanceStatus::Cancelled,
        SeanceStatus::NoShow,
        SeanceStatus::Rescheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeanceStatus::PendingApproval => "PENDING_APPROVAL",
            SeanceStatus::Scheduled => "SCHEDULED",
            SeanceStatus::Confirmed => "CONFIRMED",
            SeanceStatus::InProgress => "IN_PROGRESS",
            SeanceStatus::Completed => "COMPLETED",
            SeanceStatus::Cancelled => "CANCELLED",
            SeanceStatus::NoShow => "NO_SHOW",
            SeanceStatus::Rescheduled => "RESCHEDULED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SeanceStatus::Completed | SeanceStatus::Cancelled | SeanceStatus::NoShow
        )
    }

    /// Whether any command moves a seance from `self` to `next`.
    pub fn can_transition_to(&self, next: SeanceStatus) -> bool {
        SeanceAction::ALL
            .iter()
            .any(|action| action.target() == next && action.allowed_from(*self))
    }

    /// Validate a raw status change.
    pub fn transition(self, next: SeanceStatus) -> Result<SeanceStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Validate a named command and return the resulting status.
    pub fn apply(self, action: SeanceAction) -> Result<SeanceStatus, CoreError> {
        if action.allowed_from(self) {
            Ok(action.target())
        } else {
            Err(CoreError::InvalidTransition {
                from: self,
                to: action.target(),
            })
        }
    }
}

impl std::fmt::Display for SeanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands that move a seance through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeanceAction {
    Approve,
    Reject,
    Confirm,
    Start,
    Complete,
    Cancel,
    MarkNoShow,
    Reschedule,
}

impl SeanceAction {
    pub const ALL: [SeanceAction; 8] = [
        SeanceAction::Approve,
        SeanceAction::Reject,
        SeanceAction::Confirm,
        SeanceAction::Start,
        SeanceAction::Complete,
        SeanceAction::Cancel,
        SeanceAction::MarkNoShow,
        SeanceAction::Reschedule,
    ];

    pub fn target(&self) -> SeanceStatus {
        match self {
            SeanceAction::Approve | SeanceAction::Confirm => SeanceStatus::Confirmed,
            SeanceAction::Reject | SeanceAction::Cancel => SeanceStatus::Cancelled,
            SeanceAction::Start => SeanceStatus::InProgress,
            SeanceAction::Complete => SeanceStatus::Completed,
            SeanceAction::MarkNoShow => SeanceStatus::NoShow,
            SeanceAction::Reschedule => SeanceStatus::Rescheduled,
        }
    }

    pub fn allowed_from(&self, from: SeanceStatus) -> bool {
        use SeanceStatus::*;
        match self {
            SeanceAction::Approve | SeanceAction::Reject => from == PendingApproval,
            SeanceAction::Confirm => matches!(from, Scheduled | Rescheduled),
            SeanceAction::Start => matches!(from, Scheduled | Confirmed | Rescheduled),
            SeanceAction::Complete => from == InProgress,
            SeanceAction::Cancel => !from.is_terminal(),
            SeanceAction::MarkNoShow => matches!(from, Scheduled | Confirmed | Rescheduled),
            SeanceAction::Reschedule => {
                matches!(from, PendingApproval | Scheduled | Confirmed | Rescheduled)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Seance {
    pub id: i64,
    pub seance_code: Option<String>,
    pub patient_id: i64,
    pub patient_name: Option<String>,
    pub patient_code: Option<String>,
    pub patient_image_url: Option<String>,
    pub therapeute_id: i64,
    pub therapeute_name: Option<String>,
    pub therapeute_image_url: Option<String>,
    #[serde(rename = "type")]
    pub seance_type: SeanceType,
    pub status: SeanceStatus,
    pub scheduled_at: jiff::civil::DateTime,
    pub started_at: Option<jiff::civil::DateTime>,
    pub ended_at: Option<jiff::civil::DateTime>,
    #[serde(default)]
    pub duration_minutes: u32,
    pub notes: Option<String>,
    pub objectives: Option<String>,
    pub outcomes: Option<String>,
    pub patient_mood: Option<i32>,
    pub progress: Option<i32>,
    pub next_steps: Option<String>,
    #[serde(default)]
    pub is_video_session: bool,
    pub video_session_url: Option<String>,
    pub created_at: Option<jiff::civil::DateTime>,
}

impl Entity for Seance {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Seance {
    pub fn is_pending_approval(&self) -> bool {
        self.status == SeanceStatus::PendingApproval
    }

    pub fn scheduled_date(&self) -> jiff::civil::Date {
        self.scheduled_at.date()
    }
}

/// Payload for `POST /seances` and `PUT /seances/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SeanceCreateRequest {
    pub patient_id: i64,
    pub therapeute_id: i64,
    #[serde(rename = "type")]
    pub seance_type: SeanceType,
    pub scheduled_at: jiff::civil::DateTime,
    pub duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objectives: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_video_session: Option<bool>,
}

/// Body of `PATCH /seances/{id}/complete`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompleteSeanceRequest {
    pub notes: Option<String>,
    pub outcomes: Option<String>,
}
