use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// JobDescriptor names one report to run
/// Created by the job list loader and read-only afterwards
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Report identifier; also the query file name under the scripts directory
    pub identifier: String,
    /// Zero-based position in the job list
    pub position: usize,
    /// 1-based count of this identifier so far in the list
    pub occurrence: usize,
}

impl JobDescriptor {
    pub fn new(identifier: impl Into<String>, position: usize, occurrence: usize) -> Self {
        Self {
            identifier: identifier.into(),
            position,
            occurrence,
        }
    }

    /// Location of the query file for this report
    pub fn query_path(&self, scripts_dir: &Path) -> PathBuf {
        scripts_dir.join(&self.identifier)
    }

    /// Base name for this job's artifacts: `<identifier>_<run-date>`, with an
    /// `_<occurrence>` suffix for repeated identifiers. Path separators in the
    /// identifier become `_` so artifacts stay directly under the output directory.
    pub fn artifact_stem(&self, run_date: &str) -> String {
        let base = self.identifier.replace(['/', '\\'], "_");

        if self.occurrence > 1 {
            format!("{base}_{run_date}_{}", self.occurrence)
        } else {
            format!("{base}_{run_date}")
        }
    }
}

impl fmt::Display for JobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}
