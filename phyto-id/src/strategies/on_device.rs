//! On-device tier (Tier 2)
//!
//! Decodes the image first (an unreadable payload is terminal whether or not
//! a model is available), then runs the cached classifier, maps the top-K
//! class names onto catalog entries and accepts the result only when the
//! best mapped confidence reaches the configured floor.

use crate::classifier::{preprocess, ModelCache, ModelError};
use crate::config::OnDeviceSettings;
use crate::types::{
    IdentificationRequest, IdentificationResult, IdentificationStrategy, RawPrediction,
    ResultSource, ScoredPlant, StrategyError,
};
use async_trait::async_trait;
use phyto_common::Catalog;
use std::sync::Arc;
use tracing::{debug, info};

pub struct OnDeviceStrategy {
    cache: Arc<ModelCache>,
    catalog: Arc<Catalog>,
    settings: OnDeviceSettings,
}

impl OnDeviceStrategy {
    pub fn new(cache: Arc<ModelCache>, catalog: Arc<Catalog>, settings: OnDeviceSettings) -> Self {
        Self {
            cache,
            catalog,
            settings,
        }
    }

    /// Resolve predictions against the catalog
    ///
    /// Class names with no catalog entry are skipped.
    fn map_predictions(&self, predictions: Vec<RawPrediction>) -> Vec<ScoredPlant> {
        predictions
            .into_iter()
            .filter_map(|prediction| match self.catalog.get(&prediction.class_id) {
                Some(plant) => Some(ScoredPlant::new(plant, prediction.confidence)),
                None => {
                    debug!(
                        class_id = %prediction.class_id,
                        class_index = prediction.class_index,
                        "Prediction has no catalog entry, skipped"
                    );
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl IdentificationStrategy for OnDeviceStrategy {
    fn name(&self) -> &'static str {
        "on-device"
    }

    fn source(&self) -> ResultSource {
        ResultSource::OnDevice
    }

    async fn try_identify(
        &self,
        request: &IdentificationRequest,
    ) -> Result<IdentificationResult, StrategyError> {
        let image = preprocess::decode_image_blocking(Arc::clone(&request.image))
            .await
            .map_err(|e| match e {
                ModelError::InvalidImage(msg) => StrategyError::InvalidImage(msg),
                other => StrategyError::Inference(other.to_string()),
            })?;

        let model = self
            .cache
            .get_or_load()
            .await
            .map_err(|e| StrategyError::ModelUnavailable(e.to_string()))?;

        let predictions = model
            .classify(image, self.settings.top_k)
            .await
            .map_err(|e| StrategyError::Inference(e.to_string()))?;

        let candidates = self.map_predictions(predictions);
        let max_alternatives = self.settings.top_k.saturating_sub(1);
        let result = IdentificationResult::from_candidates(
            candidates,
            self.source(),
            Some(max_alternatives),
        )
        .ok_or(StrategyError::NoPredictions)?;

        if result.confidence < self.settings.min_confidence {
            return Err(StrategyError::BelowConfidenceFloor {
                confidence: result.confidence,
                floor: self.settings.min_confidence,
            });
        }

        info!(
            request_id = %request.id,
            plant_id = %result.plant.id,
            confidence = result.confidence,
            alternatives = result.alternatives.len(),
            "On-device identification complete"
        );

        Ok(result)
    }
}
