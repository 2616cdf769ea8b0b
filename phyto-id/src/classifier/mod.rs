//! On-device image classifier
//!
//! The classifier itself is opaque: anything implementing `ImageClassifier`
//! that maps a `[1, height, width, 3]` tensor to one score per class. Models
//! are produced by a `ModelLoader` and held by the session-wide `ModelCache`.
//!
//! # Modules
//! - **preprocess** - decode (before the model is needed), resize, normalize, batch
//! - **cache** - single-slot, load-once model cache
//! - **onnx** - ONNX backend (tract) with a persisted local copy

pub mod cache;
pub mod onnx;
pub mod preprocess;

pub use cache::ModelCache;
pub use onnx::{OnnxClassifier, OnnxModelLoader};

use crate::ranking::rank_predictions;
use crate::types::RawPrediction;
use async_trait::async_trait;
use image::RgbImage;
use ndarray::Array4;
use std::sync::Arc;
use thiserror::Error;

/// Classifier / model errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// Model file missing at every candidate location
    #[error("Model not found: {0}")]
    NotFound(String),

    /// Model file present but could not be parsed or optimized
    #[error("Model load failed: {0}")]
    Load(String),

    /// Class-name table missing or malformed
    #[error("Class names unavailable: {0}")]
    ClassNames(String),

    /// Inference failed
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Image bytes could not be decoded
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

/// Image classifier producing one raw score per class
pub trait ImageClassifier: Send + Sync {
    /// Expected input size as (width, height)
    fn input_size(&self) -> (u32, u32);

    /// Run inference on a preprocessed `[1, height, width, 3]` batch
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, ModelError>;
}

/// Source of loaded models
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<LoadedModel, ModelError>;
}

/// A classifier together with its index-aligned class-name table
pub struct LoadedModel {
    pub classifier: Arc<dyn ImageClassifier>,
    pub class_names: Vec<String>,
}

impl LoadedModel {
    pub fn new(classifier: Arc<dyn ImageClassifier>, class_names: Vec<String>) -> Self {
        Self {
            classifier,
            class_names,
        }
    }

    /// Resize, infer and rank a decoded image on the blocking pool
    ///
    /// # Errors
    /// `ModelError::Inference` when the classifier fails.
    pub async fn classify(
        self: &Arc<Self>,
        image: RgbImage,
        top_k: usize,
    ) -> Result<Vec<RawPrediction>, ModelError> {
        let model = Arc::clone(self);

        tokio::task::spawn_blocking(move || -> Result<Vec<RawPrediction>, ModelError> {
            let (width, height) = model.classifier.input_size();
            let input = preprocess::to_input_tensor(&image, width, height);
            let scores = model.classifier.predict(&input)?;
            Ok(rank_predictions(&scores, &model.class_names, top_k))
        })
        .await
        .map_err(|e| ModelError::Inference(format!("Inference task join error: {}", e)))?
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("input_size", &self.classifier.input_size())
            .field("classes", &self.class_names.len())
            .finish()
    }
}
