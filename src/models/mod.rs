pub mod job_descriptor;
pub mod job_outcome;
pub mod report_artifact;

// Re-export models for easy access
pub use job_descriptor::JobDescriptor;
pub use job_outcome::{job_id_for, JobOutcome};
pub use report_artifact::ReportArtifact;
