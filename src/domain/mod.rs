//! Domain types for the content engine.
//!
//! This module contains the core data structures:
//! - KeywordRecord: Pending/processed ledger rows
//! - Document: Emitted article with front matter and JSON-LD
//! - RunMode / BatchReport: Batch run control and outcome

pub mod document;
pub mod mode;
pub mod record;
pub mod run;

// Re-export commonly used types
pub use document::{AffiliateTag, ArticleSchema, Document, FrontMatter, Publisher};
pub use mode::RunMode;
pub use record::{KeywordRecord, PendingRecord, RecordId};
pub use run::{BatchOutcome, BatchReport, FailedRecord};
