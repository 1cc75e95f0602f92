use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use tracing::debug;

use super::{CredentialBundle, SecretsProvider};
use crate::error::SecretsError;

/// Reads the credential bundle from AWS Secrets Manager.
///
/// Credentials for AWS itself come from the standard provider chain
/// (environment, profile, instance metadata).
#[derive(Debug, Clone)]
pub struct AwsSecretsManagerProvider {
    secret_name: String,
    region: String,
}

impl AwsSecretsManagerProvider {
    pub fn new(secret_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            secret_name: secret_name.into(),
            region: region.into(),
        }
    }
}

#[async_trait]
impl SecretsProvider for AwsSecretsManagerProvider {
    fn name(&self) -> &str {
        "aws_secrets_manager"
    }

    async fn fetch(&self) -> Result<CredentialBundle, SecretsError> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .load()
            .await;
        let client = aws_sdk_secretsmanager::Client::new(&sdk_config);

        let output = client
            .get_secret_value()
            .secret_id(&self.secret_name)
            .send()
            .await
            .map_err(|e| SecretsError::Remote(DisplayErrorContext(&e).to_string()))?;

        let payload = output.secret_string().ok_or_else(|| {
            SecretsError::Remote(format!(
                "secret '{}' has no SecretString payload",
                self.secret_name
            ))
        })?;

        debug!(secret = %self.secret_name, region = %self.region, "Fetched remote secret");
        CredentialBundle::from_json(payload)
    }
}
