//! # Job Logger
//!
//! Append-only CSV audit log with one row per job outcome, columns
//! `status, job, time, notes`. The header is written once, when the file is
//! created (or found empty).
//!
//! All appends go through a single writer running on a blocking thread. Jobs
//! send their outcome over a channel and wait for the writer's acknowledgement,
//! so rows are never interleaved and appear in completion order.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::constants::system::AUDIT_LOG_HEADER;
use crate::error::{Result, RunnerError};
use crate::models::JobOutcome;

/// One audit log row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub status: String,
    pub job: String,
    pub time: String,
    pub notes: String,
}

impl From<&JobOutcome> for LogRecord {
    fn from(outcome: &JobOutcome) -> Self {
        Self {
            status: outcome.status.to_string(),
            job: outcome.job_id.clone(),
            time: outcome.formatted_time(),
            notes: outcome.note.clone(),
        }
    }
}

type AppendRequest = (LogRecord, oneshot::Sender<std::io::Result<()>>);

/// Handle to the single audit log writer. Cheap to clone.
#[derive(Debug, Clone)]
pub struct JobLogger {
    sender: mpsc::UnboundedSender<AppendRequest>,
}

/// Owns the writer thread; [`JobLoggerTask::shutdown`] waits for it to drain
#[derive(Debug)]
pub struct JobLoggerTask {
    handle: JoinHandle<usize>,
}

impl JobLogger {
    /// Start the writer for `path`
    pub fn spawn(path: impl Into<PathBuf>) -> (JobLogger, JobLoggerTask) {
        let path = path.into();
        let (sender, mut receiver) = mpsc::unbounded_channel::<AppendRequest>();

        let handle = tokio::task::spawn_blocking(move || {
            let mut written = 0usize;
            while let Some((record, ack)) = receiver.blocking_recv() {
                let result = append_row(&path, &record);
                match &result {
                    Ok(()) => written += 1,
                    Err(e) => error!(path = %path.display(), error = %e, "Failed to append audit log row"),
                }
                // The job may have stopped waiting; the row is written either way
                let _ = ack.send(result);
            }
            debug!(path = %path.display(), rows = written, "Audit log writer stopped");
            written
        });

        (JobLogger { sender }, JobLoggerTask { handle })
    }

    /// Append one row for `outcome` and wait until it is on disk
    pub async fn record(&self, outcome: &JobOutcome) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.sender
            .send((LogRecord::from(outcome), ack))
            .map_err(|_| RunnerError::AuditLog("audit log writer has stopped".to_string()))?;

        done.await
            .map_err(|_| RunnerError::AuditLog("audit log writer dropped the request".to_string()))?
            .map_err(|e| RunnerError::AuditLog(e.to_string()))
    }
}

impl JobLoggerTask {
    /// Wait for every queued row to be written. Returns rows written this run.
    /// All [`JobLogger`] handles must be dropped first.
    pub async fn shutdown(self) -> Result<usize> {
        self.handle
            .await
            .map_err(|e| RunnerError::AuditLog(format!("audit log writer failed: {e}")))
    }
}

fn append_row(path: &Path, record: &LogRecord) -> std::io::Result<()> {
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    if needs_header {
        writer.write_record(AUDIT_LOG_HEADER)?;
    }
    writer.write_record([&record.status, &record.job, &record.time, &record.notes])?;
    writer.flush()
}
