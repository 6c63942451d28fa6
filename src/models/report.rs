//! Summaries produced by the file processor and the batch coordinator.

use std::path::PathBuf;

use super::Outcome;

/// Per-outcome tallies for one processed input table.
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Total data rows read from the input table.
    pub rows: usize,
    pub matched: usize,
    pub no_match: usize,
    pub empty: usize,
    pub service_errors: usize,
}

impl FileSummary {
    pub fn new(input: PathBuf, output: PathBuf, outcomes: &[Outcome]) -> Self {
        let mut summary = Self {
            input,
            output,
            rows: outcomes.len(),
            matched: 0,
            no_match: 0,
            empty: 0,
            service_errors: 0,
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Matched { .. } => summary.matched += 1,
                Outcome::NoMatch => summary.no_match += 1,
                Outcome::Empty => summary.empty += 1,
                Outcome::ServiceError => summary.service_errors += 1,
            }
        }
        summary
    }
}

/// A file task that ended in a fatal per-file error.
#[derive(Debug, Clone)]
pub struct FailedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Final accounting for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Eligible input files found in the input directory.
    pub discovered: usize,
    /// Files whose output table was written.
    pub completed: usize,
    pub failed: Vec<FailedFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_tallies_outcomes() {
        let outcomes = [
            Outcome::Matched {
                latitude: 1.0,
                longitude: 2.0,
            },
            Outcome::Empty,
            Outcome::NoMatch,
            Outcome::ServiceError,
            Outcome::NoMatch,
        ];
        let summary = FileSummary::new("a.csv".into(), "out/a_geocoded.csv".into(), &outcomes);
        assert_eq!(summary.rows, 5);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.no_match, 2);
        assert_eq!(summary.empty, 1);
        assert_eq!(summary.service_errors, 1);
    }
}
