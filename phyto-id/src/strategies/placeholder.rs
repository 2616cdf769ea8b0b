//! Placeholder tier (Tier 3)
//!
//! Always answers as long as the catalog has entries: a uniformly random
//! plant with a confidence drawn from the primary band, plus up to
//! `max_alternatives` other distinct plants drawn from the alternative band.
//! Results are tagged `placeholder` so callers can tell them apart from real
//! identifications.

use crate::config::PlaceholderSettings;
use crate::types::{
    IdentificationRequest, IdentificationResult, IdentificationStrategy, ResultSource,
    ScoredPlant, StrategyError,
};
use async_trait::async_trait;
use phyto_common::Catalog;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub struct PlaceholderStrategy {
    catalog: Arc<Catalog>,
    settings: PlaceholderSettings,
    rng: Mutex<StdRng>,
}

impl PlaceholderStrategy {
    /// Fails if either confidence band is empty or outside 0..=100
    pub fn new(catalog: Arc<Catalog>, settings: PlaceholderSettings) -> phyto_common::Result<Self> {
        Self::with_rng(catalog, settings, StdRng::from_entropy())
    }

    /// Deterministic picks for tests
    pub fn with_seed(
        catalog: Arc<Catalog>,
        settings: PlaceholderSettings,
        seed: u64,
    ) -> phyto_common::Result<Self> {
        Self::with_rng(catalog, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        catalog: Arc<Catalog>,
        settings: PlaceholderSettings,
        rng: StdRng,
    ) -> phyto_common::Result<Self> {
        settings.validate()?;
        Ok(Self {
            catalog,
            settings,
            rng: Mutex::new(rng),
        })
    }

    fn pick(&self) -> Result<Vec<ScoredPlant>, StrategyError> {
        let entries = self.catalog.entries();
        if entries.is_empty() {
            return Err(StrategyError::EmptyCatalog);
        }

        // RNG state stays valid across a poisoned lock
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let primary_index = rng.gen_range(0..entries.len());
        let primary_confidence = rng.gen_range(self.settings.primary_band.clone());
        let mut picks = vec![ScoredPlant::new(
            Arc::clone(&entries[primary_index]),
            primary_confidence,
        )];

        let others: Vec<usize> = (0..entries.len()).filter(|&i| i != primary_index).collect();
        let alternative_indices: Vec<usize> = others
            .choose_multiple(&mut *rng, self.settings.max_alternatives)
            .copied()
            .collect();
        for index in alternative_indices {
            let confidence = rng.gen_range(self.settings.alternative_band.clone());
            picks.push(ScoredPlant::new(Arc::clone(&entries[index]), confidence));
        }

        Ok(picks)
    }
}

#[async_trait]
impl IdentificationStrategy for PlaceholderStrategy {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn source(&self) -> ResultSource {
        ResultSource::Placeholder
    }

    async fn try_identify(
        &self,
        request: &IdentificationRequest,
    ) -> Result<IdentificationResult, StrategyError> {
        let picks = self.pick()?;
        let result = IdentificationResult::from_candidates(
            picks,
            self.source(),
            Some(self.settings.max_alternatives),
        )
        .ok_or(StrategyError::EmptyCatalog)?;

        warn!(
            request_id = %request.id,
            plant_id = %result.plant.id,
            "No identification tier succeeded, returning placeholder result"
        );
        info!(
            request_id = %request.id,
            confidence = result.confidence,
            alternatives = result.alternatives.len(),
            "Placeholder identification complete"
        );

        Ok(result)
    }
}
