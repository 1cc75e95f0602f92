//! # Report Runner
//!
//! Runs every job in the configured job list once and exits with `0` when
//! all of them succeeded, `1` when any job failed and `2` when the run could
//! not start.

use std::process::ExitCode;

use report_runner::constants::system::EXIT_FATAL;
use report_runner::logging::init_structured_logging;
use report_runner::{Orchestrator, RunnerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    init_structured_logging();

    let config = match RunnerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::from(EXIT_FATAL);
        }
    };
    info!(
        job_list = %config.job_list_path.display(),
        workers = config.max_workers,
        "Report runner starting"
    );

    let mut orchestrator = Orchestrator::from_config(config);
    match orchestrator.run().await {
        Ok(summary) => ExitCode::from(summary.exit_code()),
        Err(_) => ExitCode::from(EXIT_FATAL),
    }
}
