use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::Entity;
use crate::risk::{self, RiskCategory, RiskThresholds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PredictionType {
    DropoutRisk,
    NextSession,
    TreatmentOutcome,
    MoodTrend,
}

impl PredictionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionType::DropoutRisk => "DROPOUT_RISK",
            PredictionType::NextSession => "NEXT_SESSION",
            PredictionType::TreatmentOutcome => "TREATMENT_OUTCOME",
            PredictionType::MoodTrend => "MOOD_TREND",
        }
    }
}

/// Prediction as returned by the backend.
///
/// `risk_level` is the numeric score; `risk_category` may be absent, in
/// which case the client buckets the score itself. `factors` is either a
/// list of names or a map of name to weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PredictionDto {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: Option<String>,
    pub patient_code: Option<String>,
    #[serde(rename = "type")]
    pub prediction_type: Option<PredictionType>,
    pub prediction: Option<String>,
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub factors: serde_json::Value,
    pub recommendations: Option<String>,
    pub risk_level: Option<f64>,
    pub risk_category: Option<RiskCategory>,
    pub predicted_for_date: Option<jiff::civil::DateTime>,
    pub was_accurate: Option<bool>,
    pub created_at: Option<jiff::civil::DateTime>,
}

/// Normalized prediction used by services and views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Prediction {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    #[serde(rename = "type")]
    pub prediction_type: PredictionType,
    pub score: f64,
    pub confidence: f64,
    pub risk_level: RiskCategory,
    pub recommendation: Option<String>,
    pub factors: Vec<String>,
    pub generated_at: Option<jiff::civil::DateTime>,
    pub valid_until: Option<jiff::civil::DateTime>,
    pub is_active: bool,
}

impl Entity for Prediction {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Prediction {
    /// Normalize a backend prediction. Missing type defaults to
    /// DROPOUT_RISK; missing category is derived from the score.
    pub fn from_dto(dto: PredictionDto, thresholds: &RiskThresholds) -> Self {
        let score = dto.risk_level.unwrap_or(0.0);
        let risk_level = risk::resolve(dto.risk_category, Some(score), thresholds)
            .unwrap_or(RiskCategory::Low);

        Self {
            id: dto.id,
            patient_id: dto.patient_id,
            patient_name: dto.patient_name.unwrap_or_default(),
            prediction_type: dto.prediction_type.unwrap_or(PredictionType::DropoutRisk),
            score,
            confidence: dto.confidence_score.unwrap_or(0.0),
            risk_level,
            recommendation: dto.recommendations.or(dto.prediction),
            factors: factor_names(&dto.factors),
            generated_at: dto.created_at,
            valid_until: dto.predicted_for_date,
            is_active: true,
        }
    }

    pub fn patient_first_name(&self) -> &str {
        self.patient_name.split_whitespace().next().unwrap_or("")
    }
}

/// Flatten the backend's factor payload into names, heaviest first when
/// weights are present.
pub fn factor_names(factors: &serde_json::Value) -> Vec<String> {
    match factors {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        serde_json::Value::Object(map) => {
            let mut weighted: Vec<(&String, f64)> = map
                .iter()
                .map(|(name, weight)| (name, weight.as_f64().unwrap_or(0.0)))
                .collect();
            weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            weighted.into_iter().map(|(name, _)| name.clone()).collect()
        }
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PredictionStats {
    pub accuracy: f64,
    pub total: u64,
    pub successful: u64,
}
