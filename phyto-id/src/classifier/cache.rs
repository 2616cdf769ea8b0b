//! Session-wide model cache
//!
//! Single slot holding the loaded model and its class names. The slot is
//! guarded by one async mutex that stays locked for the duration of a load,
//! so concurrent first callers wait for the in-flight load instead of
//! starting their own. A failed load leaves the slot empty and the next call
//! tries again; the first success is kept until `dispose`.

use super::{LoadedModel, ModelError, ModelLoader};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Lazily loaded, explicitly owned model handle
///
/// Construct once at startup and share (`Arc<ModelCache>`) with every
/// consumer.
pub struct ModelCache {
    loader: Arc<dyn ModelLoader>,
    slot: Mutex<Option<Arc<LoadedModel>>>,
}

impl ModelCache {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached model, loading it first if needed
    ///
    /// # Errors
    /// The loader's error when no model is cached and loading fails. Nothing
    /// is cached in that case.
    pub async fn get_or_load(&self) -> Result<Arc<LoadedModel>, ModelError> {
        let mut slot = self.slot.lock().await;

        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }

        debug!("Loading on-device model");
        match self.loader.load().await {
            Ok(model) => {
                let model = Arc::new(model);
                info!(classes = model.class_names.len(), "On-device model loaded");
                *slot = Some(Arc::clone(&model));
                Ok(model)
            }
            Err(e) => {
                warn!(error = %e, "On-device model load failed, will retry on next request");
                Err(e)
            }
        }
    }

    /// Whether a model is currently cached
    pub async fn is_loaded(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// Release the cached model and reset to "not loaded"
    ///
    /// In-flight classifications keep their own `Arc` and finish normally.
    pub async fn dispose(&self) {
        if self.slot.lock().await.take().is_some() {
            info!("On-device model released");
        }
    }
}
