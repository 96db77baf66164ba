use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object {key} not found")]
    NotFound { key: String },

    #[error("{0}")]
    Transport(String),
}

/// Read access to the artifact bucket.
pub trait ArtifactStore {
    /// Existence probe, distinct from the transfer itself.
    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    fn download(&self, key: &str, destination: &Path) -> Result<(), StoreError>;
}
