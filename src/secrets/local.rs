use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::{CredentialBundle, SecretsProvider};
use crate::error::SecretsError;

/// Reads the credential bundle from a JSON file on disk
#[derive(Debug, Clone)]
pub struct LocalFileSecretsProvider {
    path: PathBuf,
}

impl LocalFileSecretsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SecretsProvider for LocalFileSecretsProvider {
    fn name(&self) -> &str {
        "local_file"
    }

    async fn fetch(&self) -> Result<CredentialBundle, SecretsError> {
        if !self.path.is_file() {
            return Err(SecretsError::LocalFileMissing(
                self.path.display().to_string(),
            ));
        }

        let payload = tokio::fs::read_to_string(&self.path).await?;
        debug!(path = %self.path.display(), "Read local secrets file");
        CredentialBundle::from_json(&payload)
    }
}
