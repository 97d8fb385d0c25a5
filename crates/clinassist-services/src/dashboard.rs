use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use clinassist_auth::DataScope;
use clinassist_core::api_paths;
use clinassist_core::models::dashboard::{ChartDataPoint, DashboardStats};
use tokio::sync::watch;
use tracing::warn;

use crate::context::ServiceContext;
use crate::error::ServiceError;

/// Dashboard aggregates. Stats are held as observable state; the chart
/// series are fetched on demand.
pub struct DashboardService {
    ctx: ServiceContext,
    stats: watch::Sender<Option<DashboardStats>>,
    loading: watch::Sender<bool>,
    generation: AtomicU64,
}

impl DashboardService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            stats: watch::Sender::new(None),
            loading: watch::Sender::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub fn current(&self) -> Option<DashboardStats> {
        self.stats.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<DashboardStats>> {
        self.stats.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Fetch stats, restricted to the resolved therapist when scoped.
    pub async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        let query: Vec<(&str, String)> = match self.ctx.scope() {
            DataScope::Therapeute(id) => vec![("therapeuteId", id.to_string())],
            DataScope::Unresolved => return Ok(DashboardStats::default()),
            DataScope::All => Vec::new(),
        };

        let request = StatsRequest::begin(self);
        let stats: DashboardStats = self.ctx.api.get(api_paths::DASHBOARD_STATS, &query).await?;
        request.publish(&stats);
        Ok(stats)
    }

    /// Re-fetch stats, keeping the previous snapshot on failure.
    pub async fn refresh(&self) {
        if let Err(e) = self.stats().await {
            warn!(error = %e, "dashboard refresh failed");
        }
    }

    pub async fn weekly_activity(&self) -> Vec<ChartDataPoint> {
        self.series(api_paths::DASHBOARD_WEEKLY_ACTIVITY).await
    }

    pub async fn monthly_activity(&self) -> Vec<ChartDataPoint> {
        self.series(api_paths::DASHBOARD_MONTHLY_ACTIVITY).await
    }

    pub async fn seances_by_type(&self) -> BTreeMap<String, u64> {
        match self
            .ctx
            .api
            .get(api_paths::DASHBOARD_SEANCES_BY_TYPE, &[])
            .await
        {
            Ok(counts) => counts,
            Err(e) => {
                warn!(error = %e, "failed to load seances by type");
                BTreeMap::new()
            }
        }
    }

    async fn series(&self, path: &str) -> Vec<ChartDataPoint> {
        match self.ctx.api.get(path, &[]).await {
            Ok(points) => points,
            Err(e) => {
                warn!(path, error = %e, "failed to load chart series");
                Vec::new()
            }
        }
    }

    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.stats.send_replace(None);
        self.loading.send_replace(false);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

/// One in-flight stats fetch. Raises the loading flag; dropping it, on
/// completion, error or cancellation, lowers the flag unless a newer fetch
/// has started.
struct StatsRequest<'a> {
    service: &'a DashboardService,
    generation: u64,
}

impl<'a> StatsRequest<'a> {
    fn begin(service: &'a DashboardService) -> Self {
        let generation = service.generation.fetch_add(1, Ordering::SeqCst) + 1;
        service.loading.send_replace(true);
        Self { service, generation }
    }

    fn publish(&self, stats: &DashboardStats) {
        if self.service.is_current(self.generation) {
            self.service.stats.send_replace(Some(stats.clone()));
        } else {
            tracing::debug!(generation = self.generation, "discarding stale dashboard stats");
        }
    }
}

impl Drop for StatsRequest<'_> {
    fn drop(&mut self) {
        if self.service.is_current(self.generation) {
            self.service.loading.send_replace(false);
        }
    }
}
