//! Test Helper Utilities
//!
//! Shared utilities for testing phyto-id

#![allow(dead_code)]

pub mod fake_model;
pub mod fake_service;
pub mod image_fixtures;

pub use fake_model::{CountingLoader, FixedClassifier};
pub use fake_service::{unreachable_base_url, FakeService, FakeServiceConfig};
pub use image_fixtures::{jpeg_bytes, png_bytes};

use phyto_common::Catalog;
use phyto_id::classifier::ModelCache;
use phyto_id::config::{OnDeviceSettings, PlaceholderSettings, RemoteSettings, ResolverSettings};
use phyto_id::{IdentificationResolver, NetworkStatus};
use std::sync::Arc;
use std::time::Duration;

/// Resolver settings pointing at `base_url` with short timeouts
pub fn test_settings(base_url: &str) -> ResolverSettings {
    ResolverSettings {
        remote: RemoteSettings {
            base_url: base_url.to_string(),
            health_timeout: Duration::from_millis(500),
            identify_timeout: Duration::from_millis(1000),
        },
        on_device: OnDeviceSettings::default(),
        placeholder: PlaceholderSettings::default(),
    }
}

/// Standard resolver chain over the bundled catalog
pub fn build_resolver(
    settings: &ResolverSettings,
    online: bool,
    loader: Arc<CountingLoader>,
) -> (IdentificationResolver, Arc<ModelCache>) {
    let cache = Arc::new(ModelCache::new(loader));
    let resolver = IdentificationResolver::standard(
        settings,
        Arc::new(Catalog::bundled().unwrap()),
        Arc::new(NetworkStatus::new(online)),
        Arc::clone(&cache),
    )
    .unwrap();
    (resolver, cache)
}
