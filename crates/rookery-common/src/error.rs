//! Common error types for Rookery components.

use thiserror::Error;

/// Common errors across Rookery components
#[derive(Debug, Error)]
pub enum GateError {
    /// Configuration error (empty catalog, malformed config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pattern artwork missing from the asset store
    #[error("Artwork not found for pattern: {0}")]
    AssetNotFound(String),

    /// Compositing or encoding failure while rendering a challenge
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid input/request from the host layer
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GateError {
    /// Returns true if this error is fatal at startup rather than per-call
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if the caller may retry with a fresh challenge
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AssetNotFound(_) | Self::Render(_))
    }
}
