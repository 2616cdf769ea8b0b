//! Error types for phyto-id
//!
//! `IdentifyError` is what callers of the resolver see. Per-tier failures
//! (`StrategyError`) are absorbed by the fallback chain unless terminal.

use crate::types::StrategyError;
use thiserror::Error;

/// Identification error surfaced to callers
#[derive(Debug, Error)]
pub enum IdentifyError {
    /// Empty payload or bytes that do not decode as an image
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// No catalog entries to identify against
    #[error("Plant catalog is empty")]
    EmptyCatalog,

    /// Every tier declined the request
    #[error("No identification strategy available")]
    NoStrategyAvailable,

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// phyto-common error
    #[error("Common error: {0}")]
    Common(#[from] phyto_common::Error),
}

impl From<StrategyError> for IdentifyError {
    fn from(err: StrategyError) -> Self {
        match err {
            StrategyError::InvalidImage(msg) => IdentifyError::InvalidImage(msg),
            StrategyError::EmptyCatalog => IdentifyError::EmptyCatalog,
            _ => IdentifyError::NoStrategyAvailable,
        }
    }
}

/// Result type for identification
pub type IdentifyResult<T> = Result<T, IdentifyError>;
