#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Report Runner
//!
//! Batch runner for scheduled SQL reports. Each run executes an ordered list
//! of query files against one database, exports every result set to a CSV
//! compressed into a ZIP, emails the result, and appends one row per job to an
//! audit log.
//!
//! ## Architecture
//!
//! Credentials are fetched once, from the remote secrets store with a local
//! file fallback. The job list is read once. Every job is then handed to a
//! fixed-size worker pool where it runs independently:
//!
//! ```text
//! ReportExecutor::run -> JobLogger::record -> Notifier::notify
//! ```
//!
//! A failing query, a missing script or a broken mail transport affects only
//! the job it belongs to. The run ends with a [`RunSummary`] whose
//! [`exit_code`](RunSummary::exit_code) is non-zero when any job failed.
//!
//! ## Module Organization
//!
//! - [`secrets`] - Credential bundle and provider chain
//! - [`job_list`] - Job list parsing
//! - [`database`] - Connection and row streaming
//! - [`execution`] - Report executor, artifacts and worker pool
//! - [`job_logger`] - Append-only CSV audit log
//! - [`notification`] - Email composition and Gmail delivery
//! - [`orchestration`] - Run state machine and summary
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use report_runner::{Orchestrator, RunnerConfig};
//!
//! # async fn example() -> report_runner::Result<()> {
//! let config = RunnerConfig::load()?;
//! let mut orchestrator = Orchestrator::from_config(config);
//! let summary = orchestrator.run().await?;
//! std::process::exit(i32::from(summary.exit_code()));
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod execution;
pub mod job_list;
pub mod job_logger;
pub mod logging;
pub mod models;
pub mod notification;
pub mod orchestration;
pub mod secrets;

pub use config::{ConfigLoader, RunnerConfig};
pub use constants::{stages, system, JobStatus, RunState};
pub use error::{JobError, NotificationError, Result, RunnerError, SecretsError};
pub use execution::{ReportExecutor, WorkerPool, WorkerResult};
pub use job_logger::{JobLogger, JobLoggerTask, LogRecord};
pub use models::{JobDescriptor, JobOutcome, ReportArtifact};
pub use notification::{GmailMailer, Mailer, Notifier, OutgoingEmail};
pub use orchestration::{JobReport, Orchestrator, RunSummary};
pub use secrets::{CredentialBundle, SecretsChain, SecretsProvider};
