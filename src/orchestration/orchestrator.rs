//! Drives a single run from secrets to summary.

use chrono::Local;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info};

use super::summary::{JobReport, RunSummary};
use crate::config::RunnerConfig;
use crate::constants::system::RUN_DATE_FORMAT;
use crate::constants::{stages, RunState};
use crate::error::{Result, RunnerError};
use crate::execution::worker_pool::panic_message;
use crate::execution::{ReportExecutor, WorkerPool, WorkerResult};
use crate::job_list;
use crate::job_logger::JobLogger;
use crate::logging::{log_error, log_job_operation};
use crate::models::{job_id_for, JobDescriptor, JobOutcome};
use crate::notification::{GmailMailer, Mailer, Notifier};
use crate::secrets::{CredentialBundle, SecretsChain};

const RUN_LABEL: &str = "runner";

pub struct Orchestrator {
    config: RunnerConfig,
    secrets: SecretsChain,
    mailer: Arc<dyn Mailer>,
    state: RunState,
}

impl Orchestrator {
    pub fn new(config: RunnerConfig, secrets: SecretsChain, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config,
            secrets,
            mailer,
            state: RunState::Init,
        }
    }

    /// Production wiring: remote then local secrets, Gmail delivery
    pub fn from_config(config: RunnerConfig) -> Self {
        let secrets = SecretsChain::from_config(&config);
        let mailer = Arc::new(GmailMailer::from_config(&config));
        Self::new(config, secrets, mailer)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute every job once and summarize.
    ///
    /// Returns `Err` only for fatal setup problems; individual job failures
    /// are part of the returned [`RunSummary`].
    pub async fn run(&mut self) -> Result<RunSummary> {
        match self.run_inner().await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                log_error(RUN_LABEL, stages::FATAL, &e.to_string(), Some(&self.state.to_string()));
                Err(e)
            }
        }
    }

    async fn run_inner(&mut self) -> Result<RunSummary> {
        log_job_operation(stages::INFO, RUN_LABEL, "starting", Some("Loading secrets"));
        let credentials = self.secrets.fetch().await?;
        self.transition(RunState::SecretsLoaded)?;

        let jobs = job_list::load(&self.config.job_list_path)?;
        log_job_operation(
            stages::INFO,
            RUN_LABEL,
            "loaded",
            Some(&format!("Loaded {} jobs", jobs.len())),
        );
        self.transition(RunState::JobsLoaded)?;

        let run_date = Local::now().format(RUN_DATE_FORMAT).to_string();
        let reports = self.dispatch(jobs, credentials, run_date).await?;
        self.transition(RunState::Dispatched)?;

        let mut summary = RunSummary::default();
        for result in reports {
            match result {
                WorkerResult::Completed(report) => summary.record(&report),
                WorkerResult::Panicked { label, message } => {
                    log_error(&label, stages::THREAD_ERR, &message, None);
                    summary.record_unhandled();
                }
            }
        }

        self.transition(RunState::Summarized)?;
        log_job_operation(stages::SUMMARY, RUN_LABEL, "done", Some(&summary.to_string()));
        Ok(summary)
    }

    async fn dispatch(
        &self,
        jobs: Vec<JobDescriptor>,
        credentials: CredentialBundle,
        run_date: String,
    ) -> Result<Vec<WorkerResult<JobReport>>> {
        if let Some(parent) = self.config.audit_log_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let (logger, logger_task) = JobLogger::spawn(&self.config.audit_log_path);

        let executor = Arc::new(ReportExecutor::from_config(&self.config, run_date));
        let notifier = Notifier::new(Arc::clone(&self.mailer));
        let credentials = Arc::new(credentials);
        let pool = WorkerPool::new(self.config.max_workers);
        debug!(workers = pool.size(), jobs = jobs.len(), "Dispatching jobs");

        let job_logger = logger.clone();
        let results = pool
            .run(jobs, move |descriptor: JobDescriptor| {
                let executor = Arc::clone(&executor);
                let logger = job_logger.clone();
                let notifier = notifier.clone();
                let credentials = Arc::clone(&credentials);
                async move {
                    let execution = executor.run(&descriptor, &credentials);
                    process_job(&descriptor, execution, &logger, &notifier, &credentials).await
                }
            })
            .await;

        drop(logger);
        let rows = logger_task.shutdown().await?;
        info!(rows, path = %self.config.audit_log_path.display(), "Audit log closed");
        Ok(results)
    }

    fn transition(&mut self, next: RunState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(RunnerError::InvalidState {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        debug!(from = %self.state, to = %next, "Run state transition");
        self.state = next;
        Ok(())
    }
}

/// Execute, log, then notify. Each step runs regardless of how the previous
/// one went. A panic during execution becomes a `FAIL` outcome so the job
/// still gets its audit row and failure email.
async fn process_job<F>(
    descriptor: &JobDescriptor,
    execution: F,
    logger: &JobLogger,
    notifier: &Notifier,
    credentials: &CredentialBundle,
) -> JobReport
where
    F: Future<Output = JobOutcome>,
{
    let (outcome, unhandled) = match AssertUnwindSafe(execution).catch_unwind().await {
        Ok(outcome) => (outcome, false),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            let job_id = job_id_for(descriptor);
            log_error(&job_id, stages::THREAD_ERR, &message, None);
            let note = format!("Unhandled error: {message}");
            (JobOutcome::failure(descriptor, job_id, note), true)
        }
    };

    let logged = match logger.record(&outcome).await {
        Ok(()) => true,
        Err(e) => {
            log_error(&outcome.job_id, stages::WARN, &e.to_string(), Some("audit log"));
            false
        }
    };
    let notified = notifier.notify(&outcome, credentials).await.is_ok();

    JobReport {
        outcome,
        unhandled,
        logged,
        notified,
    }
}
