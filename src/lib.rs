//! content-engine - Templated article generator
//!
//! Reads keyword/title pairs from a pending CSV table, assembles
//! randomized articles from text blocks, writes them as Markdown with
//! front matter and JSON-LD, and moves consumed keywords to a processed
//! table.
//!
//! # Architecture
//!
//! A single sequential batch per invocation:
//! - Blocks are loaded once and never fail the run
//! - Pending records get a stable id so duplicates partition cleanly
//! - Ledger tables are replaced atomically at the end of the run
//!
//! # Modules
//!
//! - `adapters`: External collaborators (git snapshot)
//! - `blocks`: Block file loading
//! - `content`: Assembly, slugs, and document emission
//! - `core`: Batch driver
//! - `domain`: Data structures (KeywordRecord, Document, BatchReport)
//! - `ledger`: Pending/processed CSV tables
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Dry run: consume a batch without writing documents
//! content-engine run
//!
//! # Publish
//! SYSTEM_MODE=LIVE content-engine run
//!
//! # Inspect one article
//! content-engine preview --keyword "home solar" --title "Home Solar Basics"
//! ```

pub mod adapters;
pub mod blocks;
pub mod cli;
pub mod config;
pub mod content;
pub mod core;
pub mod domain;
pub mod ledger;

// Re-export main types at crate root for convenience
pub use blocks::{BlockCategory, BlockSet};
pub use config::EngineConfig;
pub use content::{AssembledContent, Assembler, Emitter};
pub use core::BatchDriver;
pub use domain::{BatchOutcome, BatchReport, KeywordRecord, RunMode};
pub use ledger::KeywordLedger;
