//! In-memory classifier and loader with a load counter

use async_trait::async_trait;
use ndarray::Array4;
use phyto_id::classifier::{ImageClassifier, LoadedModel, ModelError, ModelLoader};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Returns the same score vector for every input, or always errors
pub struct FixedClassifier {
    scores: Vec<f32>,
    fail: bool,
}

impl ImageClassifier for FixedClassifier {
    fn input_size(&self) -> (u32, u32) {
        (16, 16)
    }

    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, ModelError> {
        assert_eq!(input.shape(), &[1, 16, 16, 3]);
        if self.fail {
            return Err(ModelError::Inference("output tensor has unexpected rank".to_string()));
        }
        Ok(self.scores.clone())
    }
}

/// Loader that counts invocations and can be made slow or unavailable
pub struct CountingLoader {
    scores: Vec<f32>,
    class_names: Vec<String>,
    delay: Duration,
    available: bool,
    fail_inference: bool,
    loads: AtomicUsize,
}

impl CountingLoader {
    /// Model over the bundled catalog ids "1".."4"
    pub fn with_scores(scores: Vec<f32>) -> Arc<Self> {
        Self::build(scores, Duration::ZERO, true, false)
    }

    pub fn slow(scores: Vec<f32>, delay: Duration) -> Arc<Self> {
        Self::build(scores, delay, true, false)
    }

    /// Every load fails as if the model file were missing
    pub fn unavailable() -> Arc<Self> {
        Self::build(vec![], Duration::ZERO, false, false)
    }

    /// Loads fine but every prediction fails
    pub fn failing_inference() -> Arc<Self> {
        Self::build(vec![], Duration::ZERO, true, true)
    }

    fn build(scores: Vec<f32>, delay: Duration, available: bool, fail_inference: bool) -> Arc<Self> {
        Arc::new(Self {
            scores,
            class_names: ["1", "2", "3", "4"].iter().map(|s| s.to_string()).collect(),
            delay,
            available,
            fail_inference,
            loads: AtomicUsize::new(0),
        })
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for CountingLoader {
    async fn load(&self) -> Result<LoadedModel, ModelError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        if !self.available {
            return Err(ModelError::NotFound("models/plant_model/model.onnx".to_string()));
        }

        Ok(LoadedModel::new(
            Arc::new(FixedClassifier {
                scores: self.scores.clone(),
                fail: self.fail_inference,
            }),
            self.class_names.clone(),
        ))
    }
}
