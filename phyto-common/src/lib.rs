//! # Phyto Common Library
//!
//! Shared code for the phyto crates including:
//! - Plant catalog model and the bundled catalog
//! - Configuration loading (TOML bootstrap with graceful degradation)
//! - Logging initialization
//! - Common error type

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod plant;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use plant::CatalogEntry;
