//! Identification resolver
//!
//! Runs the tiers strictly in order for each request and returns the first
//! result produced. Tiers never run concurrently for one request; separate
//! requests are independent and share only the model cache.
//!
//! # Failure handling
//! - Non-terminal `StrategyError`: logged, next tier tried
//! - Terminal `StrategyError` (undecodable image, empty catalog): returned
//!   to the caller as `IdentifyError`
//! - Empty image payload: rejected before any tier runs

use crate::classifier::ModelCache;
use crate::config::ResolverSettings;
use crate::connectivity::ConnectivityMonitor;
use crate::error::{IdentifyError, IdentifyResult};
use crate::strategies::{OnDeviceStrategy, PlaceholderStrategy, RemoteInferenceClient, RemoteStrategy};
use crate::types::{IdentificationRequest, IdentificationResult, IdentificationStrategy, UserIntent};
use phyto_common::Catalog;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ordered fallback chain of identification tiers
pub struct IdentificationResolver {
    strategies: Vec<Arc<dyn IdentificationStrategy>>,
}

impl IdentificationResolver {
    /// Resolver over an explicit, ordered tier list
    pub fn new(strategies: Vec<Arc<dyn IdentificationStrategy>>) -> Self {
        Self { strategies }
    }

    /// Standard chain: remote → on-device → placeholder
    ///
    /// The model cache is passed in so its lifetime (and `dispose`) stays
    /// with the caller.
    pub fn standard(
        settings: &ResolverSettings,
        catalog: Arc<Catalog>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        model_cache: Arc<ModelCache>,
    ) -> IdentifyResult<Self> {
        let client = RemoteInferenceClient::new(settings.remote.clone())
            .map_err(|e| IdentifyError::Config(e.to_string()))?;
        let placeholder = PlaceholderStrategy::new(Arc::clone(&catalog), settings.placeholder.clone())
            .map_err(|e| IdentifyError::Config(e.to_string()))?;

        info!(
            api_base_url = %client.base_url(),
            top_k = settings.on_device.top_k,
            min_confidence = settings.on_device.min_confidence,
            catalog_entries = catalog.len(),
            "Identification resolver initialized"
        );

        Ok(Self::new(vec![
            Arc::new(RemoteStrategy::new(client, connectivity)),
            Arc::new(OnDeviceStrategy::new(model_cache, catalog, settings.on_device)),
            Arc::new(placeholder),
        ]))
    }

    /// Tier names in evaluation order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Identify the plant in `image`
    ///
    /// Returns a one-element list; secondary candidates are carried in the
    /// result's `alternatives`.
    pub async fn identify(
        &self,
        image: impl Into<Vec<u8>>,
        intent: Option<UserIntent>,
    ) -> IdentifyResult<Vec<IdentificationResult>> {
        let request = IdentificationRequest::new(image).with_intent(intent);
        self.identify_request(&request).await
    }

    /// Identify an already-built request
    ///
    /// # Errors
    /// - `IdentifyError::InvalidImage` for an empty or undecodable payload
    /// - `IdentifyError::EmptyCatalog` when the placeholder tier has nothing to pick
    /// - `IdentifyError::NoStrategyAvailable` when every tier declined
    pub async fn identify_request(
        &self,
        request: &IdentificationRequest,
    ) -> IdentifyResult<Vec<IdentificationResult>> {
        if request.image.is_empty() {
            return Err(IdentifyError::InvalidImage("empty image payload".to_string()));
        }

        debug!(
            request_id = %request.id,
            bytes = request.image.len(),
            intent = ?request.intent,
            "Identification started"
        );

        for strategy in &self.strategies {
            match strategy.try_identify(request).await {
                Ok(result) => {
                    info!(
                        request_id = %request.id,
                        strategy = strategy.name(),
                        source = %result.source,
                        plant_id = %result.plant.id,
                        confidence = result.confidence,
                        "Identification resolved"
                    );
                    return Ok(vec![result]);
                }
                Err(e) if e.is_terminal() => {
                    warn!(
                        request_id = %request.id,
                        strategy = strategy.name(),
                        error = %e,
                        "Identification aborted"
                    );
                    return Err(e.into());
                }
                Err(e) => {
                    debug!(
                        request_id = %request.id,
                        strategy = strategy.name(),
                        reason = %e,
                        "Strategy not viable, trying next"
                    );
                }
            }
        }

        warn!(request_id = %request.id, "No identification strategy produced a result");
        Err(IdentifyError::NoStrategyAvailable)
    }
}
