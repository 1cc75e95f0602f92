//! Configuration Loader
//!
//! Layers defaults, an optional TOML file and `REPORT_RUNNER_*` environment
//! variables through the `config` crate.

use config::{Config, Environment, File};
use std::path::PathBuf;
use tracing::debug;

use super::RunnerConfig;
use crate::error::Result;

/// File consulted in the working directory (extension optional)
pub const DEFAULT_CONFIG_FILE: &str = "report-runner";
/// Prefix for environment overrides, e.g. `REPORT_RUNNER_MAX_WORKERS`
pub const ENV_PREFIX: &str = "REPORT_RUNNER";

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_file: PathBuf,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Read the optional file from somewhere other than the working directory
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = path.into();
        self
    }

    /// Use a different environment prefix; mostly for isolated tests
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(&self) -> Result<RunnerConfig> {
        let defaults = Config::try_from(&RunnerConfig::default())?;

        let config: RunnerConfig = Config::builder()
            .add_source(defaults)
            .add_source(File::from(self.config_file.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        debug!(
            config_file = %self.config_file.display(),
            scripts_dir = %config.scripts_dir.display(),
            output_dir = %config.output_dir.display(),
            max_workers = config.max_workers,
            remote_secrets = config.remote_secrets_enabled,
            "Configuration loaded"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new()
            .with_config_file(dir.path().join("absent.toml"))
            .with_env_prefix("REPORT_RUNNER_TEST_ABSENT")
            .load()
            .unwrap();

        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report-runner.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "max_workers = 2").unwrap();
        writeln!(file, "output_dir = \"exports\"").unwrap();
        writeln!(file, "remote_secrets_enabled = false").unwrap();

        let config = ConfigLoader::new()
            .with_config_file(&path)
            .with_env_prefix("REPORT_RUNNER_TEST_FILE")
            .load()
            .unwrap();

        assert_eq!(config.max_workers, 2);
        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert!(!config.remote_secrets_enabled);
        assert_eq!(config.scripts_dir, PathBuf::from("Scripts"));
    }

    #[test]
    fn invalid_file_values_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report-runner.toml");
        std::fs::write(&path, "max_workers = 0\n").unwrap();

        let result = ConfigLoader::new()
            .with_config_file(&path)
            .with_env_prefix("REPORT_RUNNER_TEST_INVALID")
            .load();

        assert!(result.is_err());
    }
}
