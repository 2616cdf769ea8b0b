//! ONNX classifier backend
//!
//! Loads the model with tract (pure Rust, no native runtime). Model lookup
//! order:
//! 1. Persisted copy in the cache directory (if configured and present)
//! 2. Bundled `model_path`, which is then copied into the cache directory
//!
//! The class-name table is always read from `class_names_path`; a missing or
//! malformed table fails the whole load.

use super::{ImageClassifier, LoadedModel, ModelError, ModelLoader};
use async_trait::async_trait;
use ndarray::Array4;
use phyto_common::config::ModelConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tract_onnx::prelude::*;
use tracing::{debug, info, warn};

/// File name of the persisted model inside the cache directory
const CACHED_MODEL_FILE: &str = "plant-recognition-model.onnx";

/// Optimized, runnable ONNX image classifier
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    width: u32,
    height: u32,
}

impl OnnxClassifier {
    /// Parse and optimize an ONNX model for a fixed NHWC f32 input
    pub fn from_path(path: &Path, width: u32, height: u32) -> Result<Self, ModelError> {
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(
                    0,
                    f32::fact([1, height as usize, width as usize, 3]).into(),
                )
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ModelError::Load(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            plan,
            width,
            height,
        })
    }
}

impl ImageClassifier for OnnxClassifier {
    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, ModelError> {
        let data = input
            .as_slice()
            .ok_or_else(|| ModelError::Inference("input tensor is not contiguous".to_string()))?;
        let tensor = Tensor::from_shape::<f32>(input.shape(), data)
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let first = outputs
            .first()
            .ok_or_else(|| ModelError::Inference("model produced no outputs".to_string()))?;
        let view = first
            .to_array_view::<f32>()
            .map_err(|e| ModelError::Inference(format!("output is not f32: {}", e)))?;

        Ok(view.iter().copied().collect())
    }
}

/// Loads `OnnxClassifier` models from the configured locations
pub struct OnnxModelLoader {
    config: ModelConfig,
}

impl OnnxModelLoader {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    fn cached_model_path(&self) -> Option<PathBuf> {
        self.config
            .cache_dir
            .as_ref()
            .map(|dir| dir.join(CACHED_MODEL_FILE))
    }

    fn load_blocking(&self) -> Result<LoadedModel, ModelError> {
        let (width, height) = (self.config.input_width, self.config.input_height);

        let classifier = match self.load_from_cache(width, height) {
            Some(classifier) => classifier,
            None => self.load_bundled(width, height)?,
        };

        let class_names = load_class_names(&self.config.class_names_path)?;

        Ok(LoadedModel::new(Arc::new(classifier), class_names))
    }

    fn load_from_cache(&self, width: u32, height: u32) -> Option<OnnxClassifier> {
        let path = self.cached_model_path()?;
        if !path.exists() {
            return None;
        }

        match OnnxClassifier::from_path(&path, width, height) {
            Ok(classifier) => {
                info!("Model loaded from local cache {}", path.display());
                Some(classifier)
            }
            Err(e) => {
                warn!(error = %e, "Cached model unusable, falling back to bundled model");
                None
            }
        }
    }

    fn load_bundled(&self, width: u32, height: u32) -> Result<OnnxClassifier, ModelError> {
        let path = &self.config.model_path;
        if !path.exists() {
            warn!(
                "Model not found at {}. Place an ONNX export there to enable on-device identification.",
                path.display()
            );
            return Err(ModelError::NotFound(path.display().to_string()));
        }

        let classifier = OnnxClassifier::from_path(path, width, height)?;
        info!("Model loaded from {}", path.display());

        if let Some(cached) = self.cached_model_path() {
            persist_copy(path, &cached);
        }

        Ok(classifier)
    }
}

#[async_trait]
impl ModelLoader for OnnxModelLoader {
    async fn load(&self) -> Result<LoadedModel, ModelError> {
        let loader = Self::new(self.config.clone());
        tokio::task::spawn_blocking(move || loader.load_blocking())
            .await
            .map_err(|e| ModelError::Load(format!("Model load task join error: {}", e)))?
    }
}

/// Best-effort copy of the model into the local cache
fn persist_copy(source: &Path, target: &Path) {
    let result = target
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|_| std::fs::copy(source, target));

    match result {
        Ok(bytes) => debug!(bytes, "Model persisted to {}", target.display()),
        Err(e) => warn!(error = %e, "Could not persist model to {}", target.display()),
    }
}

/// Read the class-name table (JSON array of strings)
pub fn load_class_names(path: &Path) -> Result<Vec<String>, ModelError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ModelError::ClassNames(format!("{}: {}", path.display(), e)))?;
    let names: Vec<String> = serde_json::from_str(&content)
        .map_err(|e| ModelError::ClassNames(format!("{}: {}", path.display(), e)))?;

    if names.is_empty() {
        return Err(ModelError::ClassNames(format!("{}: empty table", path.display())));
    }

    Ok(names)
}
