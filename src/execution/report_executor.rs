//! # Report Executor
//!
//! Runs one report end to end: read its query file, open a dedicated
//! connection, stream the result set into `<stem>.csv`, then wrap that CSV into
//! `<stem>.zip`.
//!
//! Every failure inside a job, including database errors, becomes a `FAIL`
//! [`JobOutcome`]; nothing here propagates to the orchestrator. Partial
//! artifacts are removed when a job fails after export started.

use std::path::PathBuf;

use crate::config::RunnerConfig;
use crate::constants::stages;
use crate::database::ReportConnection;
use crate::error::JobError;
use crate::logging::log_job_operation;
use crate::models::{job_id_for, JobDescriptor, JobOutcome, ReportArtifact};
use crate::secrets::CredentialBundle;

use super::artifacts::{compress_to_zip, CsvSink};

#[derive(Debug, Clone)]
pub struct ReportExecutor {
    scripts_dir: PathBuf,
    output_dir: PathBuf,
    /// Fixed once per run so every artifact of the run shares it
    run_date: String,
}

impl ReportExecutor {
    pub fn new(
        scripts_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        run_date: impl Into<String>,
    ) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            output_dir: output_dir.into(),
            run_date: run_date.into(),
        }
    }

    pub fn from_config(config: &RunnerConfig, run_date: impl Into<String>) -> Self {
        Self::new(&config.scripts_dir, &config.output_dir, run_date)
    }

    pub fn run_date(&self) -> &str {
        &self.run_date
    }

    /// Execute one job and produce its outcome
    pub async fn run(&self, descriptor: &JobDescriptor, credentials: &CredentialBundle) -> JobOutcome {
        let job_id = job_id_for(descriptor);
        log_job_operation(stages::JOB_START, &job_id, "started", Some("Starting job..."));

        match self.execute(descriptor, credentials, &job_id).await {
            Ok((row_count, artifact)) => {
                let outcome = JobOutcome::success(descriptor, &job_id, row_count, artifact);
                log_job_operation(stages::JOB_DONE, &job_id, "success", Some(&outcome.note));
                outcome
            }
            Err(e) => {
                let note = e.to_string();
                log_job_operation(stages::JOB_ERROR, &job_id, "fail", Some(&note));
                JobOutcome::failure(descriptor, &job_id, note)
            }
        }
    }

    async fn execute(
        &self,
        descriptor: &JobDescriptor,
        credentials: &CredentialBundle,
        job_id: &str,
    ) -> Result<(u64, ReportArtifact), JobError> {
        let query_path = descriptor.query_path(&self.scripts_dir);
        if !query_path.is_file() {
            return Err(JobError::QueryFileMissing(query_path.display().to_string()));
        }
        let sql = tokio::fs::read_to_string(&query_path).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let artifact = ReportArtifact::for_stem(
            &self.output_dir,
            &descriptor.artifact_stem(&self.run_date),
        );

        let mut connection = ReportConnection::open(&credentials.database_url, job_id).await?;
        let exported = export_csv(&mut connection, &sql, &artifact).await;
        connection.close().await;

        let row_count = match exported {
            Ok(count) => count,
            Err(e) => {
                artifact.remove_files();
                return Err(e);
            }
        };
        log_job_operation(
            stages::FILE_CSV,
            job_id,
            "written",
            Some(&format!("Wrote CSV: {}", artifact.csv_path.display())),
        );

        if let Err(e) = compress_to_zip(&artifact) {
            artifact.remove_files();
            return Err(e);
        }
        log_job_operation(
            stages::FILE_ZIP,
            job_id,
            "written",
            Some(&format!("Created ZIP: {}", artifact.zip_path.display())),
        );

        Ok((row_count, artifact))
    }
}

async fn export_csv(
    connection: &mut ReportConnection,
    sql: &str,
    artifact: &ReportArtifact,
) -> Result<u64, JobError> {
    let mut sink = CsvSink::create(&artifact.csv_path)?;
    let row_count = connection.export_query(sql, &mut sink).await?;
    sink.finish()?;
    Ok(row_count)
}
