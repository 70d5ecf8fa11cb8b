//! Keyword records tracked by the ledger.

use serde::{Deserialize, Serialize};

/// A keyword/title pair from the pending or processed table.
///
/// Two records are equal when both fields match exactly. The ledger never
/// relies on that equality for partitioning; see [`PendingRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeywordRecord {
    /// Search keyword the article targets
    pub keyword: String,

    /// Article title (also the source of the slug)
    pub title: String,
}

impl KeywordRecord {
    /// Create a new record
    pub fn new(keyword: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            title: title.into(),
        }
    }
}

impl std::fmt::Display for KeywordRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title, self.keyword)
    }
}

/// Position of a record in the pending table at load time (zero-based, data rows only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(usize);

impl RecordId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A pending record tagged with a stable identifier for this run.
///
/// Duplicate keyword/title rows get distinct ids, so moving one instance to
/// the processed table never drags its twin along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    pub id: RecordId,
    pub record: KeywordRecord,
}

impl PendingRecord {
    pub fn new(id: RecordId, record: KeywordRecord) -> Self {
        Self { id, record }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_equality_is_by_value() {
        let a = KeywordRecord::new("rust", "Learning Rust");
        let b = KeywordRecord::new("rust", "Learning Rust");
        let c = KeywordRecord::new("rust", "Learning Rust Fast");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_duplicate_pending_records_have_distinct_ids() {
        let record = KeywordRecord::new("rust", "Learning Rust");
        let first = PendingRecord::new(RecordId::new(0), record.clone());
        let second = PendingRecord::new(RecordId::new(1), record);

        assert_eq!(first.record, second.record);
        assert_ne!(first, second);
        assert_eq!(second.id.index(), 1);
    }
}
