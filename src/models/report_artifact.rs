use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// ReportArtifact is the CSV/ZIP pair written by one successful job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub csv_path: PathBuf,
    pub zip_path: PathBuf,
}

impl ReportArtifact {
    /// Paths for `<stem>.csv` and `<stem>.zip` inside `output_dir`
    pub fn for_stem(output_dir: &Path, stem: &str) -> Self {
        Self {
            csv_path: output_dir.join(format!("{stem}.csv")),
            zip_path: output_dir.join(format!("{stem}.zip")),
        }
    }

    /// Name of the single entry stored in the archive
    pub fn entry_name(&self) -> String {
        self.csv_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Best-effort cleanup of whatever part of the pair exists
    pub fn remove_files(&self) {
        for path in [&self.csv_path, &self.zip_path] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial artifact");
                }
            }
        }
    }
}
