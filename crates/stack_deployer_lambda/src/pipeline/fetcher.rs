use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::adapters::object_store::ArtifactStore;
use crate::errors::PipelineError;
use crate::runtime::storage_keys::staging_file_name;

/// Resolves storage keys to files under the staging root.
pub struct ArtifactFetcher<'a> {
    store: &'a dyn ArtifactStore,
    staging_root: &'a Path,
}

impl<'a> ArtifactFetcher<'a> {
    pub fn new(store: &'a dyn ArtifactStore, staging_root: &'a Path) -> Self {
        Self {
            store,
            staging_root,
        }
    }

    pub fn fetch(&self, key: &str) -> Result<PathBuf, PipelineError> {
        let destination = self.staging_root.join(staging_file_name(key)?);

        let exists = self.store.exists(key).map_err(|error| {
            error!(artifact_key = key, error = %error, "artifact existence probe failed");
            PipelineError::from(error)
        })?;
        if !exists {
            error!(artifact_key = key, "artifact does not exist");
            return Err(PipelineError::NotFound {
                key: key.to_string(),
            });
        }

        info!(
            artifact_key = key,
            destination = %destination.display(),
            "downloading artifact"
        );
        self.store.download(key, &destination).map_err(|error| {
            error!(artifact_key = key, error = %error, "artifact download failed");
            PipelineError::from(error)
        })?;

        Ok(destination)
    }
}
