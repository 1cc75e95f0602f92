//! # Runner Configuration
//!
//! Fixed paths, pool size and mail endpoints for a run. Values come from
//! built-in defaults, then an optional `report-runner.toml` in the working
//! directory, then `REPORT_RUNNER_*` environment variables (highest wins).
//! There are no command-line flags.
//!
//! ```rust,no_run
//! use report_runner::config::RunnerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunnerConfig::load()?;
//! println!("running with {} workers", config.max_workers);
//! # Ok(())
//! # }
//! ```

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, RunnerError};

pub use loader::ConfigLoader;

/// Root configuration for one run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory holding one query file per report identifier
    pub scripts_dir: PathBuf,
    /// Directory receiving CSV and ZIP artifacts
    pub output_dir: PathBuf,
    /// Ordered list of report identifiers
    pub job_list_path: PathBuf,
    /// Append-only CSV audit log
    pub audit_log_path: PathBuf,
    /// Fallback secrets file used when the remote store is unavailable
    pub local_secrets_path: PathBuf,
    /// Secret id in the remote store
    pub secret_name: String,
    pub aws_region: String,
    /// Skip the remote store entirely and read only the local file
    pub remote_secrets_enabled: bool,
    /// Fixed worker pool size
    pub max_workers: usize,
    pub oauth_token_uri: String,
    pub gmail_api_base: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("Scripts"),
            output_dir: PathBuf::from("Output"),
            job_list_path: PathBuf::from("querymod.txt"),
            audit_log_path: PathBuf::from("logs.csv"),
            local_secrets_path: PathBuf::from("local_secrets.json"),
            secret_name: "report_automation_secrets".to_string(),
            aws_region: "ap-south-1".to_string(),
            remote_secrets_enabled: true,
            max_workers: 5,
            oauth_token_uri: "https://oauth2.googleapis.com/token".to_string(),
            gmail_api_base: "https://gmail.googleapis.com".to_string(),
        }
    }
}

impl RunnerConfig {
    /// Load from the default layered sources
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Reject values that would make the run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(RunnerError::Configuration(
                "max_workers must be at least 1".to_string(),
            ));
        }

        let paths = [
            ("scripts_dir", &self.scripts_dir),
            ("output_dir", &self.output_dir),
            ("job_list_path", &self.job_list_path),
            ("audit_log_path", &self.audit_log_path),
            ("local_secrets_path", &self.local_secrets_path),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(RunnerError::Configuration(format!("{name} must not be empty")));
            }
        }

        if self.remote_secrets_enabled && self.secret_name.trim().is_empty() {
            return Err(RunnerError::Configuration(
                "secret_name is required when remote secrets are enabled".to_string(),
            ));
        }

        Ok(())
    }
}
