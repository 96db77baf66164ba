use thiserror::Error;

use crate::adapters::object_store::StoreError;
use crate::runtime::contract::ValidationError;

/// Failure of one pipeline run. A corrupted template is not an error, it is
/// reported as `IntegrityStatus::Corrupted`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("The file {key} does not exist.")]
    NotFound { key: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Permission error on {path}: {source}")]
    Permission {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch `{command}`: {source}")]
    ToolInvocation {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Reference template unavailable at {0}")]
    TemplateUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for PipelineError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { key } => Self::NotFound { key },
            StoreError::Transport(message) => Self::Transport(message),
        }
    }
}

impl PipelineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
