use std::collections::BTreeMap;
use std::sync::Arc;

use clinassist_core::models::dashboard::{ChartDataPoint, DashboardStats};
use clinassist_core::models::seance::SeanceType;
use clinassist_services::DashboardService;

use crate::labels::Badge;

/// One bar of the weekly activity chart, scaled against the busiest day.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityBar {
    pub label: String,
    pub count: f64,
    pub percent: f64,
    pub is_today: bool,
}

/// Share of seances held in one modality.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeShare {
    pub kind: SeanceType,
    pub label: &'static str,
    pub percent: u32,
}

/// Modalities shown in the session-type breakdown.
const SHOWN_TYPES: [SeanceType; 4] = [
    SeanceType::InPerson,
    SeanceType::VideoCall,
    SeanceType::PhoneCall,
    SeanceType::HomeVisit,
];

pub struct DashboardView {
    service: Arc<DashboardService>,
    weekly: Vec<ChartDataPoint>,
    by_type: BTreeMap<String, u64>,
}

impl DashboardView {
    pub fn new(service: Arc<DashboardService>) -> Self {
        Self {
            service,
            weekly: Vec::new(),
            by_type: BTreeMap::new(),
        }
    }

    /// Refresh stats and chart series. Each part degrades to empty on its
    /// own.
    pub async fn load(&mut self) {
        let ((), weekly, by_type) = tokio::join!(
            self.service.refresh(),
            self.service.weekly_activity(),
            self.service.seances_by_type(),
        );
        self.weekly = weekly;
        self.by_type = by_type;
    }

    pub fn stats(&self) -> Option<DashboardStats> {
        self.service.current()
    }

    pub fn is_loading(&self) -> bool {
        self.service.is_loading()
    }

    /// Completion rate in percent: the backend's figure when it sends one,
    /// otherwise completed over total seances.
    pub fn completion_rate(&self) -> f64 {
        let Some(stats) = self.stats() else {
            return 0.0;
        };
        if stats.seance_completion_rate > 0.0 {
            return stats.seance_completion_rate;
        }
        if stats.total_seances == 0 {
            return 0.0;
        }
        stats.completed_seances_this_month as f64 * 100.0 / stats.total_seances as f64
    }

    /// Weekly bars from the fetched series, falling back to the trend in
    /// the stats snapshot. The last bar is today.
    pub fn weekly_bars(&self) -> Vec<ActivityBar> {
        let trend = if self.weekly.is_empty() {
            self.stats().map(|s| s.seances_trend).unwrap_or_default()
        } else {
            self.weekly.clone()
        };

        let max = trend.iter().map(|p| p.value).fold(0.0, f64::max);
        let last = trend.len().saturating_sub(1);
        trend
            .into_iter()
            .enumerate()
            .map(|(i, point)| ActivityBar {
                percent: if max > 0.0 { point.value / max * 100.0 } else { 0.0 },
                count: point.value,
                label: point.label,
                is_today: i == last,
            })
            .collect()
    }

    /// Percent of seances per modality. Uses the fetched breakdown, or the
    /// one embedded in the stats snapshot.
    pub fn type_shares(&self) -> Vec<TypeShare> {
        let counts = if self.by_type.is_empty() {
            self.stats().map(|s| s.seances_by_type).unwrap_or_default()
        } else {
            self.by_type.clone()
        };
        let total: u64 = counts.values().sum();

        SHOWN_TYPES
            .into_iter()
            .map(|kind| {
                let n = counts.get(kind.as_str()).copied().unwrap_or(0);
                let percent = if total > 0 {
                    (n as f64 * 100.0 / total as f64).round() as u32
                } else {
                    0
                };
                TypeShare {
                    kind,
                    label: kind.label(),
                    percent,
                }
            })
            .collect()
    }
}
