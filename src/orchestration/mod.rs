//! # Orchestration
//!
//! One run moves through `INIT → SECRETS_LOADED → JOBS_LOADED → DISPATCHED →
//! SUMMARIZED`. Secrets and the job list are loaded once; each job then runs
//! execute, audit log and notify on the bounded worker pool, independently
//! of its siblings.

pub mod orchestrator;
pub mod summary;

pub use orchestrator::Orchestrator;
pub use summary::{JobReport, RunSummary};
