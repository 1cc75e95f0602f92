//! Reads the ordered list of report identifiers for a run.

use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::constants::system::COMMENT_MARKER;
use crate::error::{Result, RunnerError};
use crate::models::JobDescriptor;

/// Load descriptors from a job list file.
///
/// A missing file is [`RunnerError::JobListMissing`]; an empty file is an
/// empty list. Duplicates are kept and numbered by occurrence.
pub fn load(path: &Path) -> Result<Vec<JobDescriptor>> {
    if !path.is_file() {
        return Err(RunnerError::JobListMissing(path.display().to_string()));
    }

    let contents = std::fs::read_to_string(path)?;
    let jobs = parse(&contents);

    debug!(path = %path.display(), jobs = jobs.len(), "Job list loaded");
    Ok(jobs)
}

/// Parse job list text: one identifier per line, blanks and comments skipped
pub fn parse(contents: &str) -> Vec<JobDescriptor> {
    let mut seen: HashMap<&str, usize> = HashMap::new();

    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
        .enumerate()
        .map(|(position, identifier)| {
            let occurrence = seen.entry(identifier).or_insert(0);
            *occurrence += 1;
            JobDescriptor::new(identifier, position, *occurrence)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn skips_blank_and_comment_lines() {
        let jobs = parse("a.sql\n\n   \n# disabled.sql\n  b.sql  \n");
        let ids: Vec<_> = jobs.iter().map(|j| j.identifier.as_str()).collect();
        assert_eq!(ids, ["a.sql", "b.sql"]);
        assert_eq!(jobs[1].position, 1);
    }

    #[test]
    fn keeps_duplicates_in_order() {
        let jobs = parse("a\nb\na\n");
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].occurrence, 1);
        assert_eq!(jobs[1].occurrence, 1);
        assert_eq!(jobs[2].identifier, "a");
        assert_eq!(jobs[2].occurrence, 2);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let jobs = parse("a\r\nb\r\n");
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].identifier, "a");
    }

    #[test]
    fn empty_file_is_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("querymod.txt");
        std::fs::write(&path, "").unwrap();

        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("querymod.txt")).unwrap_err();
        assert!(matches!(err, RunnerError::JobListMissing(_)));
    }

    proptest! {
        #[test]
        fn every_identifier_line_becomes_one_job(
            ids in proptest::collection::vec("[a-z][a-z0-9_]{0,8}(\\.sql)?", 0..20)
        ) {
            let text = ids.join("\n# comment\n\n");
            let jobs = parse(&text);

            prop_assert_eq!(jobs.len(), ids.len());
            for (i, (job, id)) in jobs.iter().zip(ids.iter()).enumerate() {
                prop_assert_eq!(&job.identifier, id);
                prop_assert_eq!(job.position, i);
            }
        }
    }
}
