//! phyto-id library interface
//!
//! Tiered plant identification: remote inference service, on-device
//! classifier, then a placeholder pick from the catalog.
//!
//! ```rust,ignore
//! let resolver = IdentificationResolver::standard(&settings, catalog, network, cache)?;
//! let results = resolver.identify(image_bytes, Some(UserIntent::Medicine)).await?;
//! ```

pub mod classifier;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod ranking;
pub mod resolver;
pub mod strategies;
pub mod types;

pub use crate::classifier::{ModelCache, OnnxModelLoader};
pub use crate::config::ResolverSettings;
pub use crate::connectivity::{ConnectivityMonitor, NetworkStatus};
pub use crate::error::{IdentifyError, IdentifyResult};
pub use crate::resolver::IdentificationResolver;
pub use crate::types::{
    IdentificationRequest, IdentificationResult, IdentificationStrategy, ResultSource,
    StrategyError, UserIntent,
};
