//! Temporary run directory with scripts, job list and local secrets

use std::path::{Path, PathBuf};
use std::sync::Arc;

use report_runner::{Mailer, Orchestrator, RunnerConfig, SecretsChain};
use tempfile::TempDir;

pub const LOCAL_SECRETS: &str = r#"{
    "DB_DSN": "sqlite::memory:",
    "GMAIL_SENDER_EMAIL": "reports@example.com",
    "GMAIL_CLIENT_ID": "client-id",
    "GMAIL_CLIENT_SECRET": "client-secret",
    "GMAIL_REFRESH_TOKEN": "refresh-token",
    "RECEIVERS": ["team@example.com", "lead@example.com"],
    "ERROR_RECEIVERS": ["oncall@example.com"]
}"#;

/// Builder for a self-contained run directory
pub struct WorkspaceBuilder {
    scripts: Vec<(String, String)>,
    job_list: Option<String>,
    secrets: Option<String>,
    max_workers: usize,
}

impl WorkspaceBuilder {
    pub fn new() -> Self {
        Self {
            scripts: Vec::new(),
            job_list: Some(String::new()),
            secrets: Some(LOCAL_SECRETS.to_string()),
            max_workers: 2,
        }
    }

    pub fn with_script(mut self, name: &str, sql: &str) -> Self {
        self.scripts.push((name.to_string(), sql.to_string()));
        self
    }

    pub fn with_job_list(mut self, contents: &str) -> Self {
        self.job_list = Some(contents.to_string());
        self
    }

    pub fn without_job_list(mut self) -> Self {
        self.job_list = None;
        self
    }

    pub fn without_secrets(mut self) -> Self {
        self.secrets = None;
        self
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    pub fn build(self) -> Workspace {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let scripts_dir = root.join("Scripts");
        std::fs::create_dir_all(&scripts_dir).expect("Failed to create Scripts");

        for (name, sql) in &self.scripts {
            std::fs::write(scripts_dir.join(name), sql).expect("Failed to write script");
        }
        if let Some(job_list) = &self.job_list {
            std::fs::write(root.join("querymod.txt"), job_list).expect("Failed to write job list");
        }
        if let Some(secrets) = &self.secrets {
            std::fs::write(root.join("local_secrets.json"), secrets)
                .expect("Failed to write secrets");
        }

        let config = RunnerConfig {
            scripts_dir,
            output_dir: root.join("Output"),
            job_list_path: root.join("querymod.txt"),
            audit_log_path: root.join("logs.csv"),
            local_secrets_path: root.join("local_secrets.json"),
            remote_secrets_enabled: false,
            max_workers: self.max_workers,
            ..RunnerConfig::default()
        };

        Workspace { dir, config }
    }
}

pub struct Workspace {
    dir: TempDir,
    pub config: RunnerConfig,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn audit_log(&self) -> PathBuf {
        self.config.audit_log_path.clone()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.output_dir.clone()
    }

    /// Orchestrator reading local secrets only and sending through `mailer`
    pub fn orchestrator(&self, mailer: Arc<dyn Mailer>) -> Orchestrator {
        Orchestrator::new(
            self.config.clone(),
            SecretsChain::from_config(&self.config),
            mailer,
        )
    }
}
