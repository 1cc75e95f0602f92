//! # Secrets
//!
//! Resolves the credential bundle for a run from an ordered list of
//! providers. The first provider that yields a structurally valid bundle wins;
//! each failure is logged and the next provider is tried. There are no retries
//! beyond walking the list once.
//!
//! The default chain is the AWS Secrets Manager provider followed by the local
//! fallback file.

pub mod aws;
pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::RunnerConfig;
use crate::constants::stages;
use crate::error::{Result, RunnerError, SecretsError};

pub use aws::AwsSecretsManagerProvider;
pub use local::LocalFileSecretsProvider;

/// Database and mail credentials for one run. Immutable once fetched.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    pub database_url: String,
    pub sender_email: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub success_recipients: Vec<String>,
    pub error_recipients: Vec<String>,
}

impl std::fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("sender_email", &self.sender_email)
            .field("success_recipients", &self.success_recipients)
            .field("error_recipients", &self.error_recipients)
            .finish_non_exhaustive()
    }
}

/// Wire shape of the secrets JSON; every field optional so validation can name
/// exactly what is missing
#[derive(Debug, Default, Deserialize, Serialize)]
struct RawSecrets {
    #[serde(rename = "DB_DSN")]
    db_dsn: Option<String>,
    #[serde(rename = "GMAIL_SENDER_EMAIL")]
    sender_email: Option<String>,
    #[serde(rename = "GMAIL_CLIENT_ID")]
    client_id: Option<String>,
    #[serde(rename = "GMAIL_CLIENT_SECRET")]
    client_secret: Option<String>,
    #[serde(rename = "GMAIL_REFRESH_TOKEN")]
    refresh_token: Option<String>,
    #[serde(rename = "RECEIVERS")]
    receivers: Option<Vec<String>>,
    #[serde(rename = "ERROR_RECEIVERS")]
    error_receivers: Option<Vec<String>>,
}

impl CredentialBundle {
    /// Parse and validate a secrets JSON document
    pub fn from_json(payload: &str) -> std::result::Result<Self, SecretsError> {
        let raw: RawSecrets = serde_json::from_str(payload)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSecrets) -> std::result::Result<Self, SecretsError> {
        let mut missing = Vec::new();

        let mut required = |key: &'static str, value: Option<String>| -> String {
            match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(key);
                    String::new()
                }
            }
        };

        let database_url = required("DB_DSN", raw.db_dsn);
        let sender_email = required("GMAIL_SENDER_EMAIL", raw.sender_email);
        let client_id = required("GMAIL_CLIENT_ID", raw.client_id);
        let client_secret = required("GMAIL_CLIENT_SECRET", raw.client_secret);
        let refresh_token = required("GMAIL_REFRESH_TOKEN", raw.refresh_token);

        let success_recipients = recipients(raw.receivers);
        if success_recipients.is_empty() {
            missing.push("RECEIVERS");
        }
        let error_recipients = recipients(raw.error_receivers);
        if error_recipients.is_empty() {
            missing.push("ERROR_RECEIVERS");
        }

        if !missing.is_empty() {
            return Err(SecretsError::Invalid(format!(
                "missing or empty keys: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            database_url,
            sender_email,
            client_id,
            client_secret,
            refresh_token,
            success_recipients,
            error_recipients,
        })
    }

    /// Masked rendering for debug logs
    pub fn redacted(&self) -> serde_json::Value {
        serde_json::json!({
            "DB_DSN": mask(&self.database_url),
            "GMAIL_SENDER_EMAIL": self.sender_email,
            "GMAIL_CLIENT_ID": mask(&self.client_id),
            "GMAIL_CLIENT_SECRET": mask(&self.client_secret),
            "GMAIL_REFRESH_TOKEN": mask(&self.refresh_token),
            "RECEIVERS": self.success_recipients,
            "ERROR_RECEIVERS": self.error_recipients,
        })
    }
}

fn recipients(list: Option<Vec<String>>) -> Vec<String> {
    list.unwrap_or_default()
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

/// Show only first 2 and last 2 characters
fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 4 {
        let head: String = chars[..2].iter().collect();
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("[MASKED: {head}***{tail}]")
    } else {
        "[MASKED]".to_string()
    }
}

/// A source of credential bundles
#[async_trait]
pub trait SecretsProvider: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    async fn fetch(&self) -> std::result::Result<CredentialBundle, SecretsError>;
}

/// Ordered providers tried in sequence
pub struct SecretsChain {
    providers: Vec<Box<dyn SecretsProvider>>,
}

impl SecretsChain {
    pub fn new(providers: Vec<Box<dyn SecretsProvider>>) -> Self {
        Self { providers }
    }

    /// Remote store (when enabled) followed by the local fallback file
    pub fn from_config(config: &RunnerConfig) -> Self {
        let mut providers: Vec<Box<dyn SecretsProvider>> = Vec::new();
        if config.remote_secrets_enabled {
            providers.push(Box::new(AwsSecretsManagerProvider::new(
                config.secret_name.clone(),
                config.aws_region.clone(),
            )));
        }
        providers.push(Box::new(LocalFileSecretsProvider::new(
            config.local_secrets_path.clone(),
        )));
        Self::new(providers)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Fetch from the first provider that succeeds
    pub async fn fetch(&self) -> Result<CredentialBundle> {
        let mut failures = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            match provider.fetch().await {
                Ok(bundle) => {
                    info!(
                        provider = provider.name(),
                        secrets = %bundle.redacted(),
                        "Credential bundle loaded"
                    );
                    return Ok(bundle);
                }
                Err(e) => {
                    warn!(
                        stage = stages::WARN,
                        provider = provider.name(),
                        error = %e,
                        "Secrets provider failed, trying next"
                    );
                    failures.push(format!("{}: {e}", provider.name()));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no secrets providers configured".to_string());
        }
        Err(RunnerError::SecretsUnavailable(failures.join("; ")))
    }
}
