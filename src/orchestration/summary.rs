//! Aggregate counts for one run and the process exit code they imply

use serde::Serialize;
use std::fmt;

use crate::constants::system::{EXIT_JOB_FAILURE, EXIT_SUCCESS};
use crate::models::JobOutcome;

/// Per-job result as seen by the orchestrator
#[derive(Debug)]
pub struct JobReport {
    pub outcome: JobOutcome,
    /// Execution panicked; `outcome` is the synthesized failure
    pub unhandled: bool,
    /// The audit log row was written
    pub logged: bool,
    /// The email was delivered
    pub notified: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub notification_failures: usize,
    /// Jobs whose audit log row could not be written
    pub audit_failures: usize,
    /// Jobs that panicked
    pub unhandled: usize,
}

impl RunSummary {
    pub fn record(&mut self, report: &JobReport) {
        self.total += 1;
        if report.unhandled {
            self.unhandled += 1;
        } else if report.outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        if !report.logged {
            self.audit_failures += 1;
        }
        if !report.notified {
            self.notification_failures += 1;
        }
    }

    /// A job lost to a panic outside execution, with no outcome at all
    pub fn record_unhandled(&mut self) {
        self.total += 1;
        self.unhandled += 1;
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.unhandled == 0
    }

    /// Notification and audit log failures alone never change the exit code
    pub fn exit_code(&self) -> u8 {
        if self.all_succeeded() {
            EXIT_SUCCESS
        } else {
            EXIT_JOB_FAILURE
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total={} Success={} Fail={} MailErrors={} AuditErrors={} Unhandled={}",
            self.total,
            self.succeeded,
            self.failed,
            self.notification_failures,
            self.audit_failures,
            self.unhandled
        )
    }
}
