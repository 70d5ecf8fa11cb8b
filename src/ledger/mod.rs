//! Flat-file keyword ledger.
//!
//! Two CSV tables with the header `keyword,title`:
//! - the pending table, rewritten (or removed) at the end of every run
//! - the processed table, accumulated across runs
//!
//! Both are replaced atomically: the new contents go to a temp file in the
//! same directory, which is then renamed over the target. The processed
//! table is written before the pending table, so an interrupted commit can
//! leave a record in both tables but never in neither.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::domain::{KeywordRecord, PendingRecord, RecordId};

/// Errors that can occur reading or writing the ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A CSV row as read; either column may be absent
#[derive(Debug, Deserialize)]
struct RawRow {
    keyword: Option<String>,
    title: Option<String>,
}

impl RawRow {
    fn into_record(self) -> Option<KeywordRecord> {
        let keyword = self.keyword?;
        let title = self.title?;
        if keyword.trim().is_empty() || title.trim().is_empty() {
            return None;
        }
        Some(KeywordRecord { keyword, title })
    }
}

/// Result of a ledger commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Rows left in the pending table (0 means the file was removed)
    pub remaining: usize,

    /// Rows appended to the processed table this commit
    pub appended: usize,

    /// Total rows in the processed table after the commit
    pub processed_total: usize,
}

/// Pending/processed keyword tables
#[derive(Debug, Clone)]
pub struct KeywordLedger {
    pending_path: PathBuf,
    processed_path: PathBuf,
}

impl KeywordLedger {
    pub fn new(pending_path: impl Into<PathBuf>, processed_path: impl Into<PathBuf>) -> Self {
        Self {
            pending_path: pending_path.into(),
            processed_path: processed_path.into(),
        }
    }

    pub fn pending_path(&self) -> &Path {
        &self.pending_path
    }

    pub fn processed_path(&self) -> &Path {
        &self.processed_path
    }

    /// Load pending records, tagging each with its row position.
    ///
    /// An absent or zero-length table yields no records. Rows missing either
    /// field are dropped.
    pub async fn load_pending(&self) -> Result<Vec<PendingRecord>, LedgerError> {
        let records = read_table(&self.pending_path).await?;

        Ok(records
            .into_iter()
            .enumerate()
            .map(|(index, record)| PendingRecord::new(RecordId::new(index), record))
            .collect())
    }

    /// Load every record from the processed table
    pub async fn load_processed(&self) -> Result<Vec<KeywordRecord>, LedgerError> {
        read_table(&self.processed_path).await
    }

    /// Persist the outcome of a run.
    ///
    /// `processed` is appended to the processed table first; an unreadable
    /// processed table is treated as empty. Only then does `remaining`
    /// replace the pending table, or remove it when empty, so a failed
    /// processed write leaves the pending table untouched.
    pub async fn commit(
        &self,
        remaining: &[KeywordRecord],
        processed: &[KeywordRecord],
    ) -> Result<CommitSummary, LedgerError> {
        let mut all_processed = match self.load_processed().await {
            Ok(previous) => previous,
            Err(e) => {
                warn!(
                    path = %self.processed_path.display(),
                    error = %e,
                    "Processed table unreadable, starting it over"
                );
                Vec::new()
            }
        };
        all_processed.extend_from_slice(processed);

        if !all_processed.is_empty() {
            write_table(&self.processed_path, &all_processed).await?;
        }

        if remaining.is_empty() {
            match fs::remove_file(&self.pending_path).await {
                Ok(()) => info!(path = %self.pending_path.display(), "Pending table exhausted, removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(LedgerError::Io {
                        path: self.pending_path.clone(),
                        source,
                    })
                }
            }
        } else {
            write_table(&self.pending_path, remaining).await?;
        }

        let summary = CommitSummary {
            remaining: remaining.len(),
            appended: processed.len(),
            processed_total: all_processed.len(),
        };
        debug!(?summary, "Ledger committed");

        Ok(summary)
    }
}

/// Split pending records into (remaining, processed) by id.
///
/// Both outputs keep the original table order.
pub fn partition(
    pending: &[PendingRecord],
    processed_ids: &HashSet<RecordId>,
) -> (Vec<KeywordRecord>, Vec<KeywordRecord>) {
    let (processed, remaining): (Vec<_>, Vec<_>) = pending
        .iter()
        .partition(|p| processed_ids.contains(&p.id));

    (
        remaining.into_iter().map(|p| p.record.clone()).collect(),
        processed.into_iter().map(|p| p.record.clone()).collect(),
    )
}

/// Read a keyword table; absent or empty files yield no records
async fn read_table(path: &Path) -> Result<Vec<KeywordRecord>, LedgerError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LedgerError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let headers = reader.headers()?;
    if !headers.iter().any(|h| h == "keyword") || !headers.iter().any(|h| h == "title") {
        debug!(path = %path.display(), "Table header lacks keyword/title columns");
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<RawRow>() {
        match row?.into_record() {
            Some(record) => records.push(record),
            None => debug!(path = %path.display(), "Dropping row with missing field"),
        }
    }

    Ok(records)
}

/// Atomically replace `path` with a `keyword,title` table
async fn write_table(path: &Path, records: &[KeywordRecord]) -> Result<(), LedgerError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(["keyword", "title"])?;
    for record in records {
        writer.write_record([record.keyword.as_str(), record.title.as_str()])?;
    }
    let bytes = writer.into_inner().map_err(|e| LedgerError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::other(e.to_string()),
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).await.map_err(|source| LedgerError::Io {
        path: dir.clone(),
        source,
    })?;

    let temp_path = tempfile::Builder::new()
        .prefix(".ledger-")
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(|source| LedgerError::Io {
            path: dir.clone(),
            source,
        })?
        .into_temp_path();

    fs::write(&temp_path, &bytes)
        .await
        .map_err(|source| LedgerError::Io {
            path: temp_path.to_path_buf(),
            source,
        })?;

    temp_path.persist(path).map_err(|e| LedgerError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}
