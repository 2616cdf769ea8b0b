//! Common error types for phyto

use thiserror::Error;

/// Common result type for phyto operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the phyto crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bundled or supplied catalog data could not be parsed
    #[error("Catalog error: {0}")]
    Catalog(String),
}
