//! Remote inference tier (Tier 1)
//!
//! Talks to the plant inference service:
//! - `GET  {base}/api/health`   → `{"status": "healthy" | "degraded" | "unhealthy"}`
//! - `POST {base}/api/identify` → multipart `file`, `user_intent`, `include_medicinal_info`
//!
//! The tier is viable only when the host reports connectivity and the health
//! check answers in time with a usable status. Every failure after that
//! (transport, timeout, HTTP status, body) is returned as a non-terminal
//! `StrategyError` so the resolver moves on.

use crate::config::RemoteSettings;
use crate::connectivity::ConnectivityMonitor;
use crate::types::{
    IdentificationRequest, IdentificationResult, IdentificationStrategy, MedicinalInfo,
    ResultSource, ScoredPlant, StrategyError,
};
use async_trait::async_trait;
use phyto_common::plant::{CommonNames, PlantType, ScientificStatus};
use phyto_common::CatalogEntry;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Health state reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// Some backing services are down; identification still works
    Degraded,
    Unhealthy,
    Unknown(String),
}

impl HealthStatus {
    fn from_wire(status: &str) -> Self {
        match status {
            "healthy" => Self::Healthy,
            "degraded" => Self::Degraded,
            "unhealthy" => Self::Unhealthy,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Healthy and degraded services accept identification requests
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }
}

/// HTTP client for the plant inference service
pub struct RemoteInferenceClient {
    http_client: Client,
    settings: RemoteSettings,
}

impl RemoteInferenceClient {
    pub fn new(settings: RemoteSettings) -> Result<Self, StrategyError> {
        let http_client = Client::builder()
            .timeout(settings.identify_timeout)
            .build()
            .map_err(|e| StrategyError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    /// Query the health endpoint within the health timeout
    pub async fn health_check(&self) -> Result<HealthStatus, StrategyError> {
        let url = format!("{}/api/health", self.settings.base_url);

        let response = self
            .http_client
            .get(&url)
            .timeout(self.settings.health_timeout)
            .send()
            .await
            .map_err(|e| StrategyError::Network(format!("Health check failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StrategyError::Api(
                status.as_u16(),
                "health check returned non-success status".to_string(),
            ));
        }

        let body: HealthResponse = response
            .json()
            .await
            .map_err(|e| StrategyError::Parse(format!("Invalid health response: {}", e)))?;

        Ok(HealthStatus::from_wire(&body.status))
    }

    /// Submit the image for identification
    pub async fn identify(
        &self,
        request: &IdentificationRequest,
    ) -> Result<ApiIdentifyResponse, StrategyError> {
        let url = format!("{}/api/identify", self.settings.base_url);

        let (mime, file_name) = match infer::get(&request.image) {
            Some(kind) => (kind.mime_type(), format!("plant.{}", kind.extension())),
            None => ("application/octet-stream", "plant".to_string()),
        };

        let part = Part::bytes(request.image.to_vec())
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| StrategyError::Network(format!("Invalid MIME type: {}", e)))?;

        let mut form = Form::new()
            .part("file", part)
            .text("include_medicinal_info", "true");
        if let Some(intent) = request.intent {
            form = form.text("user_intent", intent.as_wire());
        }

        debug!(
            request_id = %request.id,
            bytes = request.image.len(),
            mime,
            "Submitting image to inference service"
        );

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StrategyError::Network(format!("Identify request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StrategyError::Api(status.as_u16(), body));
        }

        response
            .json::<ApiIdentifyResponse>()
            .await
            .map_err(|e| StrategyError::Parse(format!("Invalid identify response: {}", e)))
    }
}

/// Remote tier: connectivity check, health check, then identification
pub struct RemoteStrategy {
    client: RemoteInferenceClient,
    connectivity: Arc<dyn ConnectivityMonitor>,
}

impl RemoteStrategy {
    pub fn new(client: RemoteInferenceClient, connectivity: Arc<dyn ConnectivityMonitor>) -> Self {
        Self {
            client,
            connectivity,
        }
    }
}

#[async_trait]
impl IdentificationStrategy for RemoteStrategy {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn source(&self) -> ResultSource {
        ResultSource::Remote
    }

    async fn try_identify(
        &self,
        request: &IdentificationRequest,
    ) -> Result<IdentificationResult, StrategyError> {
        if !self.connectivity.is_online() {
            return Err(StrategyError::Offline);
        }

        let health = self.client.health_check().await?;
        if !health.is_usable() {
            warn!(
                request_id = %request.id,
                status = ?health,
                "Inference service not usable"
            );
            return Err(StrategyError::ServiceUnavailable(format!("{:?}", health)));
        }

        let response = self.client.identify(request).await?;
        let result = response.into_result(self.source())?;

        info!(
            request_id = %request.id,
            plant_id = %result.plant.id,
            confidence = result.confidence,
            alternatives = result.alternatives.len(),
            "Remote identification complete"
        );

        Ok(result)
    }
}

// ============================================================================
// Inference Service Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Plant as described by the inference service
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPlant {
    pub id: String,
    #[serde(default)]
    pub scientific_name: String,
    #[serde(default)]
    pub common_names: Option<ApiCommonNames>,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub genus: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub plant_type: Option<String>,
    #[serde(default)]
    pub parts_used: Option<Vec<String>>,
    #[serde(default)]
    pub region: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiCommonNames {
    #[serde(default)]
    pub fr: Option<String>,
    #[serde(default)]
    pub local: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAlternative {
    pub plant: ApiPlant,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Body of a successful `POST /api/identify`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiIdentifyResponse {
    pub plant: Option<ApiPlant>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub alternatives: Option<Vec<ApiAlternative>>,
    #[serde(default)]
    pub medicinal_info: Option<MedicinalInfo>,
}

impl ApiIdentifyResponse {
    /// Map the service's response into a normalized result
    pub fn into_result(self, source: ResultSource) -> Result<IdentificationResult, StrategyError> {
        let plant = self
            .plant
            .ok_or_else(|| StrategyError::Parse("response has no plant".to_string()))?;

        let mut candidates = vec![ScoredPlant::new(
            Arc::new(convert_api_plant(plant)),
            self.confidence.unwrap_or(0.0),
        )];
        candidates.extend(self.alternatives.unwrap_or_default().into_iter().map(|alt| {
            ScoredPlant::new(
                Arc::new(convert_api_plant(alt.plant)),
                alt.confidence.unwrap_or(0.0),
            )
        }));

        let result = IdentificationResult::from_candidates(candidates, source, None)
            .ok_or(StrategyError::NoPredictions)?;

        Ok(result.with_medicinal_info(self.medicinal_info))
    }
}

/// Map a service plant onto the catalog shape
///
/// Medicinal and safety fields are not part of the service's plant object
/// and start empty.
pub fn convert_api_plant(plant: ApiPlant) -> CatalogEntry {
    let common_names = plant.common_names.unwrap_or_default();

    CatalogEntry {
        id: plant.id,
        scientific_name: plant.scientific_name,
        common_names: CommonNames {
            fr: common_names.fr.unwrap_or_default(),
            local: common_names.local.unwrap_or_default(),
        },
        family: plant.family,
        genus: plant.genus,
        species: plant.species,
        description: plant.description,
        plant_type: plant
            .plant_type
            .as_deref()
            .map(PlantType::from_wire)
            .unwrap_or_default(),
        parts_used: plant.parts_used.unwrap_or_default(),
        properties: Vec::new(),
        traditional_uses: Vec::new(),
        safety: Default::default(),
        scientific_status: ScientificStatus::Traditional,
        region: plant.region,
        images: plant.images,
    }
}

// ============================================================================
// Tests
// ============================================================================
