//! Adapter interfaces for external systems.
//!
//! The only external collaborator is the version-control snapshot taken
//! after a LIVE batch. Pushing is left to whoever runs the job.

pub mod git;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

// Re-export the git adapter
pub use git::GitSnapshot;

/// Records a snapshot of the files a batch touched
#[async_trait]
pub trait Snapshot: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Stage `paths` and record them under `message`
    async fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()>;
}

/// Snapshot that does nothing (snapshots disabled)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSnapshot;

#[async_trait]
impl Snapshot for NoopSnapshot {
    fn name(&self) -> &str {
        "noop"
    }

    async fn commit(&self, _paths: &[PathBuf], _message: &str) -> Result<()> {
        Ok(())
    }
}
