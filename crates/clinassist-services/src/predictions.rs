use clinassist_core::api_paths;
use clinassist_core::models::prediction::{Prediction, PredictionDto, PredictionStats};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cache::{Collection, MergeMode};
use crate::context::ServiceContext;
use crate::error::ServiceError;

/// Default `minRisk` for the high-risk prediction listing.
pub const DEFAULT_HIGH_RISK_MIN: f64 = 30.0;

/// Risk predictions. Backend DTOs are normalized into [`Prediction`] on the
/// way in, so views only ever see the client model.
pub struct PredictionService {
    ctx: ServiceContext,
    cache: Collection<Prediction>,
}

impl PredictionService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            cache: Collection::new(),
        }
    }

    pub fn cache(&self) -> &Collection<Prediction> {
        &self.cache
    }

    pub fn predictions(&self) -> Vec<Prediction> {
        self.cache.items()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Prediction>> {
        self.cache.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    fn normalize(&self, dtos: Vec<PredictionDto>) -> Vec<Prediction> {
        dtos.into_iter()
            .map(|dto| Prediction::from_dto(dto, &self.ctx.thresholds))
            .collect()
    }

    pub async fn for_patient(&self, patient_id: i64) -> Vec<Prediction> {
        match self
            .ctx
            .api
            .get(api_paths::predictions_by_patient(patient_id), &[])
            .await
        {
            Ok(dtos) => self.normalize(dtos),
            Err(e) => {
                warn!(patient_id, error = %e, "failed to load patient predictions");
                Vec::new()
            }
        }
    }

    /// Predictions at or above `min_risk`; the result becomes the cached
    /// collection. Failures yield an empty list and leave the cache alone.
    pub async fn high_risk(&self, min_risk: f64) -> Vec<Prediction> {
        let ticket = self.cache.begin();
        let fetched: Result<Vec<PredictionDto>, _> = self
            .ctx
            .api
            .get(
                api_paths::PREDICTIONS_HIGH_RISK,
                &[("minRisk", min_risk.to_string())],
            )
            .await;

        match fetched {
            Ok(dtos) => {
                let predictions = self.normalize(dtos);
                ticket.publish(predictions.clone());
                predictions
            }
            Err(e) => {
                warn!(min_risk, error = %e, "failed to load high-risk predictions");
                Vec::new()
            }
        }
    }

    pub async fn active(&self) -> Vec<Prediction> {
        match self.ctx.api.get(api_paths::PREDICTIONS_ACTIVE, &[]).await {
            Ok(dtos) => self.normalize(dtos),
            Err(e) => {
                warn!(error = %e, "failed to load active predictions");
                Vec::new()
            }
        }
    }

    pub async fn generate_next_session(&self, patient_id: i64) -> Result<Prediction, ServiceError> {
        self.generate(api_paths::prediction_next_session(patient_id), patient_id)
            .await
    }

    pub async fn generate_dropout_risk(&self, patient_id: i64) -> Result<Prediction, ServiceError> {
        self.generate(api_paths::prediction_dropout_risk(patient_id), patient_id)
            .await
    }

    async fn generate(&self, path: String, patient_id: i64) -> Result<Prediction, ServiceError> {
        let dto: PredictionDto = self.ctx.api.post(path, &serde_json::json!({})).await?;
        let prediction = Prediction::from_dto(dto, &self.ctx.thresholds);
        info!(
            patient_id,
            prediction_id = prediction.id,
            kind = prediction.prediction_type.as_str(),
            risk = %prediction.risk_level,
            "prediction generated"
        );
        self.cache.merge(prediction.clone(), MergeMode::Prepend);
        Ok(prediction)
    }

    pub async fn stats(&self) -> Result<PredictionStats, ServiceError> {
        Ok(self.ctx.api.get(api_paths::PREDICTIONS_STATS, &[]).await?)
    }

    pub async fn mark_reviewed(&self, id: i64) -> Result<Prediction, ServiceError> {
        let dto: PredictionDto = self
            .ctx
            .api
            .patch(api_paths::prediction_reviewed(id), &[])
            .await?;
        let prediction = Prediction::from_dto(dto, &self.ctx.thresholds);
        info!(prediction_id = id, "prediction reviewed");
        self.cache.merge(prediction.clone(), MergeMode::Replace);
        Ok(prediction)
    }

    pub async fn dismiss(&self, id: i64) -> Result<(), ServiceError> {
        self.ctx.api.delete(api_paths::prediction(id)).await?;
        info!(prediction_id = id, "prediction dismissed");
        self.cache.remove(id);
        Ok(())
    }
}
