//! Batch run outcome.
//!
//! A BatchReport records what a single invocation of the driver did.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::mode::RunMode;
use super::record::KeywordRecord;

/// How a batch run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The pending table was absent or empty; nothing was touched
    NoPendingWork,

    /// A batch was selected and the ledger was committed
    Completed,
}

/// A record that could not be assembled or emitted; it stays pending
#[derive(Debug, Clone)]
pub struct FailedRecord {
    pub record: KeywordRecord,
    pub error: String,
}

/// Summary of one batch run
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Unique identifier for this run (log correlation only)
    pub id: Uuid,

    pub mode: RunMode,

    pub outcome: BatchOutcome,

    pub started_at: DateTime<Utc>,

    pub completed_at: Option<DateTime<Utc>>,

    /// Number of records drawn from the pending table
    pub selected: usize,

    /// Records moved to the processed table
    pub processed: Vec<KeywordRecord>,

    /// Records whose assembly or emission failed
    pub failed: Vec<FailedRecord>,

    /// Documents written this run (LIVE only)
    pub written: Vec<PathBuf>,

    /// Records still pending after the commit
    pub remaining: usize,

    /// Whether the snapshot action was invoked
    pub snapshot_attempted: bool,
}

impl BatchReport {
    pub fn new(id: Uuid, mode: RunMode) -> Self {
        Self {
            id,
            mode,
            outcome: BatchOutcome::Completed,
            started_at: Utc::now(),
            completed_at: None,
            selected: 0,
            processed: Vec::new(),
            failed: Vec::new(),
            written: Vec::new(),
            remaining: 0,
            snapshot_attempted: false,
        }
    }

    /// Mark the run finished
    pub fn finish(mut self, outcome: BatchOutcome) -> Self {
        self.outcome = outcome;
        self.completed_at = Some(Utc::now());
        self
    }

    /// One-line human-readable status
    pub fn status_line(&self) -> String {
        match self.outcome {
            BatchOutcome::NoPendingWork => {
                "No new keywords to process in the pending table.".to_string()
            }
            BatchOutcome::Completed => format!(
                "[{}] selected {}, processed {}, failed {}, written {}, remaining {}",
                self.mode,
                self.selected,
                self.processed.len(),
                self.failed.len(),
                self.written.len(),
                self.remaining
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pending_status_line() {
        let report = BatchReport::new(Uuid::new_v4(), RunMode::Test).finish(BatchOutcome::NoPendingWork);
        assert_eq!(report.outcome, BatchOutcome::NoPendingWork);
        assert!(report.completed_at.is_some());
        assert!(report.status_line().contains("No new keywords"));
    }

    #[test]
    fn test_completed_status_line_counts() {
        let mut report = BatchReport::new(Uuid::new_v4(), RunMode::Live);
        report.selected = 2;
        report.processed.push(KeywordRecord::new("a", "A"));
        report.failed.push(FailedRecord {
            record: KeywordRecord::new("b", "B"),
            error: "disk full".to_string(),
        });
        report.remaining = 4;

        let line = report.finish(BatchOutcome::Completed).status_line();
        assert_eq!(
            line,
            "[LIVE] selected 2, processed 1, failed 1, written 0, remaining 4"
        );
    }
}
