use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{JobDescriptor, ReportArtifact};
use crate::constants::{system, JobStatus};

/// JobOutcome is the terminal result of one job
/// Produced exactly once per job and never mutated afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub identifier: String,
    /// `"<identifier> <timestamp>"`, as narrated and logged
    pub job_id: String,
    pub status: JobStatus,
    pub finished_at: DateTime<Local>,
    /// Row count summary on success, error text on failure
    pub note: String,
    pub row_count: Option<u64>,
    pub artifact: Option<ReportArtifact>,
}

impl JobOutcome {
    pub fn success(
        descriptor: &JobDescriptor,
        job_id: impl Into<String>,
        row_count: u64,
        artifact: ReportArtifact,
    ) -> Self {
        let note = format!(
            "Exported {row_count} rows to {}",
            artifact.zip_path.display()
        );
        Self {
            identifier: descriptor.identifier.clone(),
            job_id: job_id.into(),
            status: JobStatus::Success,
            finished_at: Local::now(),
            note,
            row_count: Some(row_count),
            artifact: Some(artifact),
        }
    }

    pub fn failure(
        descriptor: &JobDescriptor,
        job_id: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            identifier: descriptor.identifier.clone(),
            job_id: job_id.into(),
            status: JobStatus::Fail,
            finished_at: Local::now(),
            note: note.into(),
            row_count: None,
            artifact: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Completion time in the audit log format
    pub fn formatted_time(&self) -> String {
        self.finished_at.format(system::TIMESTAMP_FORMAT).to_string()
    }
}

/// Job id for a job starting now
pub fn job_id_for(descriptor: &JobDescriptor) -> String {
    format!(
        "{} {}",
        descriptor.identifier,
        Local::now().format(system::TIMESTAMP_FORMAT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn success_note_mentions_row_count() {
        let job = JobDescriptor::new("a", 0, 1);
        let artifact = ReportArtifact::for_stem(Path::new("Output"), "a_2026-10-16");
        let outcome = JobOutcome::success(&job, "a 16-10-2026 09-00-00", 3, artifact);

        assert!(outcome.is_success());
        assert_eq!(outcome.row_count, Some(3));
        assert!(outcome.note.contains("3 rows"));
        assert!(outcome.artifact.is_some());
    }

    #[test]
    fn failure_carries_note_and_no_artifact() {
        let job = JobDescriptor::new("b", 1, 1);
        let outcome = JobOutcome::failure(&job, "b id", "SQL file not found: Scripts/b");

        assert_eq!(outcome.status, JobStatus::Fail);
        assert!(outcome.artifact.is_none());
        assert!(outcome.row_count.is_none());
        assert_eq!(outcome.note, "SQL file not found: Scripts/b");
    }

    #[test]
    fn job_id_starts_with_identifier() {
        let job = JobDescriptor::new("report.sql", 0, 1);
        let id = job_id_for(&job);
        assert!(id.starts_with("report.sql "));
        assert_eq!(id.len(), "report.sql ".len() + "16-10-2026 09-00-00".len());
    }
}
