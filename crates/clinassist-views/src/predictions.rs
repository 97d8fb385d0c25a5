use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use clinassist_core::RiskCategory;
use clinassist_core::models::prediction::{Prediction, PredictionStats, PredictionType};
use clinassist_services::{PredictionService, ServiceError};
use tracing::warn;

use crate::labels::Badge;

/// Number of recommendation cards shown next to the prediction list.
pub const MAX_RECOMMENDATIONS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskCounts {
    pub fn of(predictions: &[Prediction]) -> Self {
        let mut counts = Self::default();
        for p in predictions {
            match p.risk_level {
                RiskCategory::Critical => counts.critical += 1,
                RiskCategory::High => counts.high += 1,
                RiskCategory::Medium => counts.medium += 1,
                RiskCategory::Low => counts.low += 1,
            }
        }
        counts
    }

    pub fn get(&self, level: RiskCategory) -> usize {
        match level {
            RiskCategory::Critical => self.critical,
            RiskCategory::High => self.high,
            RiskCategory::Medium => self.medium,
            RiskCategory::Low => self.low,
        }
    }
}

/// A follow-up suggested for a high-risk prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub prediction_id: i64,
    pub patient_id: i64,
    pub title: String,
    pub description: String,
    pub class: &'static str,
}

/// Suggested action wording for a prediction.
pub fn suggested_action(prediction: &Prediction) -> String {
    let first = prediction.patient_first_name();
    match prediction.prediction_type {
        PredictionType::DropoutRisk => format!("Contacter {first}"),
        PredictionType::NextSession => format!("Planifier séance - {first}"),
        PredictionType::MoodTrend => format!("Surveiller {first}"),
        PredictionType::TreatmentOutcome => format!("Action pour {first}"),
    }
}

/// High-risk prediction board: risk-level filter, counts, recommendations
/// and the most frequent risk factors.
pub struct PredictionsView {
    service: Arc<PredictionService>,
    min_risk: f64,
    filter: Option<RiskCategory>,
    stats: Option<PredictionStats>,
    reviewed: HashSet<i64>,
}

impl PredictionsView {
    pub fn new(service: Arc<PredictionService>, min_risk: f64) -> Self {
        Self {
            service,
            min_risk,
            filter: None,
            stats: None,
            reviewed: HashSet::new(),
        }
    }

    pub fn stats(&self) -> Option<PredictionStats> {
        self.stats
    }

    pub fn filter(&self) -> Option<RiskCategory> {
        self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.service.is_loading()
    }

    /// Load high-risk predictions and accuracy stats together. A stats
    /// failure keeps the previous stats.
    pub async fn load(&mut self) -> Vec<Prediction> {
        let (predictions, stats) =
            tokio::join!(self.service.high_risk(self.min_risk), self.service.stats());
        match stats {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => warn!(error = %e, "failed to load prediction stats"),
        }
        self.reviewed.clear();
        predictions
    }

    pub fn set_filter(&mut self, filter: Option<RiskCategory>) {
        self.filter = filter;
    }

    fn shown(&self) -> Vec<Prediction> {
        self.service
            .predictions()
            .into_iter()
            .filter(|p| !self.reviewed.contains(&p.id))
            .collect()
    }

    /// Predictions matching the level filter, reviewed ones hidden.
    pub fn visible(&self) -> Vec<Prediction> {
        self.shown()
            .into_iter()
            .filter(|p| self.filter.is_none_or(|level| p.risk_level == level))
            .collect()
    }

    /// Counts per level, ignoring the level filter.
    pub fn counts(&self) -> RiskCounts {
        RiskCounts::of(&self.shown())
    }

    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.shown()
            .iter()
            .filter(|p| matches!(p.risk_level, RiskCategory::Critical | RiskCategory::High))
            .take(MAX_RECOMMENDATIONS)
            .map(|p| Recommendation {
                prediction_id: p.id,
                patient_id: p.patient_id,
                title: suggested_action(p),
                description: p
                    .recommendation
                    .clone()
                    .unwrap_or_else(|| "Action recommandée".to_string()),
                class: p.prediction_type.class(),
            })
            .collect()
    }

    /// Most frequent factor names with the share of predictions citing
    /// them, in percent.
    pub fn top_factors(&self, limit: usize) -> Vec<(String, u32)> {
        let shown = self.shown();
        if shown.is_empty() {
            return Vec::new();
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for p in &shown {
            for factor in &p.factors {
                *counts.entry(factor.as_str()).or_default() += 1;
            }
        }

        let total = shown.len() as f64;
        let mut factors: Vec<(String, u32)> = counts
            .into_iter()
            .map(|(name, n)| (name.to_string(), (n as f64 * 100.0 / total).round() as u32))
            .collect();
        factors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        factors.truncate(limit);
        factors
    }

    /// Mark a prediction reviewed and hide it from this board.
    pub async fn mark_reviewed(&mut self, id: i64) -> Result<Prediction, ServiceError> {
        let prediction = self.service.mark_reviewed(id).await?;
        self.reviewed.insert(id);
        Ok(prediction)
    }

    pub async fn dismiss(&mut self, id: i64) -> Result<(), ServiceError> {
        self.service.dismiss(id).await
    }
}
