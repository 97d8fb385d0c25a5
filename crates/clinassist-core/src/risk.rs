use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Bucketed severity label for a 0–100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::Low,
        RiskCategory::Medium,
        RiskCategory::High,
        RiskCategory::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "LOW",
            RiskCategory::Medium => "MEDIUM",
            RiskCategory::High => "HIGH",
            RiskCategory::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bounds (inclusive) of the MEDIUM, HIGH and CRITICAL buckets.
///
/// Only used when the backend does not already supply a category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RiskThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 25.0,
            high: 50.0,
            critical: 75.0,
        }
    }
}

impl RiskThresholds {
    /// Thresholds are valid when strictly increasing.
    pub fn is_valid(&self) -> bool {
        self.medium < self.high && self.high < self.critical
    }

    pub fn categorize(&self, score: f64) -> RiskCategory {
        if score >= self.critical {
            RiskCategory::Critical
        } else if score >= self.high {
            RiskCategory::High
        } else if score >= self.medium {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }
}

/// Categorize with the default thresholds.
pub fn categorize(score: f64) -> RiskCategory {
    RiskThresholds::default().categorize(score)
}

/// Prefer the backend-supplied category; fall back to bucketing the score.
pub fn resolve(
    supplied: Option<RiskCategory>,
    score: Option<f64>,
    thresholds: &RiskThresholds,
) -> Option<RiskCategory> {
    supplied.or_else(|| score.map(|s| thresholds.categorize(s)))
}
