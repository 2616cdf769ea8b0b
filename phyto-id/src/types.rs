//! Core Types and Trait Definitions for phyto-id
//!
//! Defines the request/result model shared by every identification tier and
//! the `IdentificationStrategy` trait the resolver iterates over:
//! - **Tier 1:** Remote inference service
//! - **Tier 2:** On-device classifier
//! - **Tier 3:** Placeholder (random catalog pick)

use phyto_common::CatalogEntry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Request
// ============================================================================

/// Purpose the user is identifying the plant for
///
/// Serialized with the inference service's wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserIntent {
    #[serde(rename = "agriculture")]
    Agriculture,
    #[serde(rename = "medecine")]
    Medicine,
}

impl UserIntent {
    /// Value sent in the `user_intent` form field
    pub fn as_wire(&self) -> &'static str {
        match self {
            UserIntent::Agriculture => "agriculture",
            UserIntent::Medicine => "medecine",
        }
    }
}

impl fmt::Display for UserIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for UserIntent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "agriculture" => Ok(UserIntent::Agriculture),
            "medecine" | "medicine" => Ok(UserIntent::Medicine),
            other => Err(format!(
                "unknown intent '{}' (expected 'agriculture' or 'medecine')",
                other
            )),
        }
    }
}

/// One identification request
///
/// The image payload is shared (`Arc<[u8]>`) so tiers can hand it to blocking
/// tasks without copying.
#[derive(Debug, Clone)]
pub struct IdentificationRequest {
    /// Correlation id for logs
    pub id: Uuid,
    /// Encoded image bytes (format is not checked here)
    pub image: Arc<[u8]>,
    pub intent: Option<UserIntent>,
}

impl IdentificationRequest {
    pub fn new(image: impl Into<Vec<u8>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            image: Arc::from(image.into()),
            intent: None,
        }
    }

    pub fn with_intent(mut self, intent: Option<UserIntent>) -> Self {
        self.intent = intent;
        self
    }
}

// ============================================================================
// Results
// ============================================================================

/// Tier that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultSource {
    Remote,
    OnDevice,
    Placeholder,
}

impl fmt::Display for ResultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResultSource::Remote => "remote",
            ResultSource::OnDevice => "on-device",
            ResultSource::Placeholder => "placeholder",
        })
    }
}

/// Ranked class produced by the on-device classifier
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    /// Index in the model output vector
    pub class_index: usize,
    /// Class name from the class-name table (a catalog id)
    pub class_id: String,
    /// Percentage confidence (0-100)
    pub confidence: f32,
}

/// A catalog entry with a confidence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPlant {
    pub plant: Arc<CatalogEntry>,
    /// Percentage confidence (0-100)
    pub confidence: f32,
}

impl ScoredPlant {
    /// Create a scored plant with the confidence clamped to 0-100
    pub fn new(plant: Arc<CatalogEntry>, confidence: f32) -> Self {
        Self {
            plant,
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Medicinal information attached by the inference service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicinalInfo {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub properties: Vec<MedicinalInfoProperty>,
    #[serde(default)]
    pub traditional_uses: Vec<MedicinalInfoUse>,
    #[serde(default)]
    pub diseases_treated: Vec<String>,
    #[serde(default)]
    pub preparation_methods: Vec<String>,
    #[serde(default)]
    pub precautions: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Pre-rendered answer for display
    #[serde(default)]
    pub formatted_response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicinalInfoProperty {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub evidence_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicinalInfoUse {
    pub preparation: String,
    pub indication: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Final identification returned to callers
///
/// Invariants (enforced by `from_candidates`):
/// - every confidence is within 0-100
/// - `confidence` is the highest among all candidates considered
/// - `alternatives` is sorted by descending confidence, never contains the
///   primary's id, and contains each id at most once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationResult {
    pub plant: Arc<CatalogEntry>,
    pub confidence: f32,
    #[serde(default)]
    pub alternatives: Vec<ScoredPlant>,
    pub source: ResultSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medicinal_info: Option<MedicinalInfo>,
}

impl IdentificationResult {
    /// Normalize a candidate list into a result
    ///
    /// Candidates are stable-sorted by descending confidence, so equal scores
    /// keep their input order. The first becomes the primary; later duplicates
    /// of an id are dropped. Returns `None` for an empty list.
    pub fn from_candidates(
        candidates: Vec<ScoredPlant>,
        source: ResultSource,
        max_alternatives: Option<usize>,
    ) -> Option<Self> {
        let mut candidates: Vec<ScoredPlant> = candidates
            .into_iter()
            .map(|c| ScoredPlant::new(c.plant, c.confidence))
            .collect();
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });

        let mut iter = candidates.into_iter();
        let primary = iter.next()?;

        let mut seen = HashSet::new();
        seen.insert(primary.plant.id.clone());

        let limit = max_alternatives.unwrap_or(usize::MAX);
        let alternatives: Vec<ScoredPlant> = iter
            .filter(|c| seen.insert(c.plant.id.clone()))
            .take(limit)
            .collect();

        Some(Self {
            plant: primary.plant,
            confidence: primary.confidence,
            alternatives,
            source,
            medicinal_info: None,
        })
    }

    pub fn with_medicinal_info(mut self, info: Option<MedicinalInfo>) -> Self {
        self.medicinal_info = info;
        self
    }
}

/// Clamp a confidence into 0-100 (NaN becomes 0)
pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 100.0)
    }
}

// ============================================================================
// Strategy Trait
// ============================================================================

/// One identification tier
///
/// The resolver calls tiers in a fixed order and takes the first `Ok`.
/// Returning an error means "not viable for this request"; only
/// `StrategyError::is_terminal` errors stop the chain.
///
/// # Example
/// ```rust,ignore
/// use phyto_id::types::{IdentificationStrategy, IdentificationRequest};
///
/// let result = strategy.try_identify(&request).await?;
/// println!("{} ({:.1}%)", result.plant.scientific_name, result.confidence);
/// ```
#[async_trait::async_trait]
pub trait IdentificationStrategy: Send + Sync {
    /// Tier name for logs
    fn name(&self) -> &'static str;

    /// Provenance tag carried by results of this tier
    fn source(&self) -> ResultSource;

    /// Attempt identification
    ///
    /// # Errors
    /// Any `StrategyError`; non-terminal errors make the resolver fall through
    /// to the next tier.
    async fn try_identify(
        &self,
        request: &IdentificationRequest,
    ) -> Result<IdentificationResult, StrategyError>;
}

/// Reason a tier did not produce a result
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Runtime reports no network connectivity
    #[error("Offline")]
    Offline,

    /// Health check failed or reported an unhealthy service
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Transport error or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Response body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Model or class-name table could not be loaded
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Inference failed after the model was loaded
    #[error("Inference error: {0}")]
    Inference(String),

    /// No prediction mapped to a catalog entry
    #[error("No predictions")]
    NoPredictions,

    /// Top prediction below the configured floor
    #[error("Top confidence {confidence:.3} below floor {floor:.3}")]
    BelowConfidenceFloor { confidence: f32, floor: f32 },

    /// Image could not be decoded (terminal)
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Catalog has no entries (terminal)
    #[error("Catalog is empty")]
    EmptyCatalog,
}

impl StrategyError {
    /// Terminal errors are reported to the caller instead of falling through
    pub fn is_terminal(&self) -> bool {
        matches!(self, StrategyError::InvalidImage(_) | StrategyError::EmptyCatalog)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use phyto_common::Catalog;

    fn plant(catalog: &Catalog, id: &str) -> Arc<CatalogEntry> {
        catalog.get(id).unwrap()
    }

    #[test]
    fn test_intent_parsing() {
        assert_eq!("agriculture".parse::<UserIntent>(), Ok(UserIntent::Agriculture));
        assert_eq!("Medecine".parse::<UserIntent>(), Ok(UserIntent::Medicine));
        assert_eq!("medicine".parse::<UserIntent>(), Ok(UserIntent::Medicine));
        assert!("gardening".parse::<UserIntent>().is_err());
        assert_eq!(UserIntent::Medicine.as_wire(), "medecine");
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(serde_json::to_string(&ResultSource::OnDevice).unwrap(), "\"on-device\"");
        assert_eq!(serde_json::to_string(&ResultSource::Remote).unwrap(), "\"remote\"");
        assert_eq!(
            serde_json::to_string(&ResultSource::Placeholder).unwrap(),
            "\"placeholder\""
        );
    }

    #[test]
    fn test_confidence_clamping() {
        assert_eq!(clamp_confidence(150.0), 100.0);
        assert_eq!(clamp_confidence(-3.0), 0.0);
        assert_eq!(clamp_confidence(f32::NAN), 0.0);
        assert_eq!(clamp_confidence(42.5), 42.5);
    }

    #[test]
    fn test_from_candidates_orders_and_dedupes() {
        let catalog = Catalog::bundled().unwrap();
        let candidates = vec![
            ScoredPlant::new(plant(&catalog, "2"), 40.0),
            ScoredPlant::new(plant(&catalog, "1"), 80.0),
            ScoredPlant::new(plant(&catalog, "1"), 35.0),
            ScoredPlant::new(plant(&catalog, "3"), 55.0),
        ];

        let result =
            IdentificationResult::from_candidates(candidates, ResultSource::OnDevice, None)
                .unwrap();

        assert_eq!(result.plant.id, "1");
        assert_eq!(result.confidence, 80.0);
        let alt_ids: Vec<&str> = result.alternatives.iter().map(|a| a.plant.id.as_str()).collect();
        assert_eq!(alt_ids, vec!["3", "2"], "Duplicate of primary must be dropped");
    }

    #[test]
    fn test_from_candidates_limits_alternatives() {
        let catalog = Catalog::bundled().unwrap();
        let candidates = catalog
            .entries()
            .iter()
            .enumerate()
            .map(|(i, p)| ScoredPlant::new(Arc::clone(p), 90.0 - i as f32 * 10.0))
            .collect();

        let result =
            IdentificationResult::from_candidates(candidates, ResultSource::Remote, Some(2))
                .unwrap();
        assert_eq!(result.alternatives.len(), 2);
    }

    #[test]
    fn test_from_candidates_empty() {
        assert!(
            IdentificationResult::from_candidates(vec![], ResultSource::Remote, None).is_none()
        );
    }

    #[test]
    fn test_terminal_errors() {
        assert!(StrategyError::InvalidImage("bad".into()).is_terminal());
        assert!(StrategyError::EmptyCatalog.is_terminal());
        assert!(!StrategyError::Offline.is_terminal());
        assert!(!StrategyError::BelowConfidenceFloor { confidence: 29.9, floor: 30.0 }
            .is_terminal());
    }
}
