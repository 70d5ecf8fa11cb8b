//! Batch driver.
//!
//! One run: load blocks and pending records, select a batch, assemble and
//! emit each record (LIVE) or just consume it (TEST), commit the ledger,
//! then take a snapshot when anything was published.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{GitSnapshot, NoopSnapshot, Snapshot};
use crate::blocks::{BlockCategory, BlockSet};
use crate::config::EngineConfig;
use crate::content::{Assembler, AssemblyOptions, Emitter};
use crate::domain::{
    BatchOutcome, BatchReport, FailedRecord, KeywordRecord, PendingRecord, RunMode,
};
use crate::ledger::{partition, KeywordLedger};

/// Ledger and block health, for the `status` command
#[derive(Debug, Clone)]
pub struct EngineStatus {
    pub pending: usize,
    pub processed: Option<usize>,
    /// Categories that fell back to the placeholder fragment
    pub placeholder_categories: Vec<BlockCategory>,
}

/// Runs one batch against the configured ledger and output directory
pub struct BatchDriver {
    config: EngineConfig,
    snapshot: Box<dyn Snapshot>,
    rng: StdRng,
}

impl BatchDriver {
    /// Create a driver; seeds the RNG from `config.seed` or the OS
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let snapshot: Box<dyn Snapshot> = if config.snapshot_enabled {
            Box::new(GitSnapshot::new(&config.root).with_binary_path(&config.git_binary))
        } else {
            Box::new(NoopSnapshot)
        };

        Self {
            config,
            snapshot,
            rng,
        }
    }

    /// Replace the snapshot adapter
    pub fn with_snapshot(mut self, snapshot: Box<dyn Snapshot>) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Replace the RNG
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> KeywordLedger {
        KeywordLedger::new(&self.config.pending_table, &self.config.processed_table)
    }

    fn assembler(&self) -> Assembler {
        Assembler::new(AssemblyOptions {
            affiliate_probability: self.config.affiliate_probability,
            publisher_name: self.config.publisher.name.clone(),
        })
    }

    fn emitter(&self) -> Emitter {
        Emitter::new(
            &self.config.output_dir,
            self.config.publisher.clone(),
            self.config.publish_offset,
        )
    }

    async fn load_blocks(&self) -> BlockSet {
        BlockSet::load(&self.config.blocks_dir, &self.config.block_sources).await
    }

    /// Execute one batch run
    #[instrument(skip(self), fields(mode = %self.config.mode))]
    pub async fn run(&mut self) -> Result<BatchReport> {
        let run_id = Uuid::new_v4();
        let mode = self.config.mode;
        let mut report = BatchReport::new(run_id, mode);
        info!(%run_id, "Starting batch run");

        let blocks = self.load_blocks().await;
        let ledger = self.ledger();

        let pending = ledger
            .load_pending()
            .await
            .with_context(|| format!("Failed to read pending table: {}", ledger.pending_path().display()))?;

        if pending.is_empty() {
            info!("No new keywords to process");
            return Ok(report.finish(BatchOutcome::NoPendingWork));
        }

        let amount = self.config.batch_size.min(pending.len());
        let selected: Vec<&PendingRecord> = index::sample(&mut self.rng, pending.len(), amount)
            .into_iter()
            .map(|i| &pending[i])
            .collect();
        report.selected = selected.len();
        info!(selected = selected.len(), pending = pending.len(), "Batch selected");

        let mut processed_ids = HashSet::new();

        match mode {
            RunMode::Test => {
                for item in &selected {
                    // Consumed without writing so the next run samples fresh records
                    info!(title = %item.record.title, "TEST mode: record consumed, nothing written");
                    processed_ids.insert(item.id);
                }
            }
            RunMode::Live => {
                let assembler = self.assembler();
                let emitter = self.emitter();

                for (position, item) in selected.iter().enumerate() {
                    let content = assembler.assemble(&item.record, &blocks, &mut self.rng);

                    match emitter.emit(&item.record, &content, &mut self.rng).await {
                        Ok(path) => {
                            info!(path = %path.display(), affiliate = ?content.affiliate_tag, "Article generated");
                            processed_ids.insert(item.id);
                            report.written.push(path);

                            if position + 1 < selected.len() {
                                let delay = self.next_delay();
                                info!(delay_secs = delay.as_secs(), "Delaying before next article");
                                tokio::time::sleep(delay).await;
                            }
                        }
                        Err(e) => {
                            error!(title = %item.record.title, error = %e, "Failed to generate article");
                            report.failed.push(FailedRecord {
                                record: item.record.clone(),
                                error: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        let (remaining, processed) = partition(&pending, &processed_ids);
        let summary = ledger
            .commit(&remaining, &processed)
            .await
            .context("Failed to commit keyword ledger")?;

        report.remaining = summary.remaining;
        report.processed = processed;

        if mode.is_live() {
            if report.processed.is_empty() {
                info!("Nothing new to commit");
            } else {
                report.snapshot_attempted = true;
                self.take_snapshot(report.processed.len()).await;
            }
        }

        let report = report.finish(BatchOutcome::Completed);
        info!(status = %report.status_line(), "Batch run finished");
        Ok(report)
    }

    /// Assemble and render one document without touching ledgers or output
    pub async fn preview(&mut self, record: &KeywordRecord) -> Result<String> {
        let blocks = self.load_blocks().await;
        let emitter = self.emitter();

        let content = self.assembler().assemble(record, &blocks, &mut self.rng);
        let published_at = emitter.publication_time(&mut self.rng);
        let document = emitter.render(record, &content, published_at)?;

        document.render()
    }

    /// Counts for the pending/processed tables and block fallbacks
    pub async fn status(&self) -> Result<EngineStatus> {
        let ledger = self.ledger();
        let pending = ledger
            .load_pending()
            .await
            .context("Failed to read pending table")?
            .len();

        let processed = match ledger.load_processed().await {
            Ok(records) => Some(records.len()),
            Err(e) => {
                warn!(error = %e, "Processed table unreadable");
                None
            }
        };

        let blocks = self.load_blocks().await;
        let placeholder_categories = BlockCategory::ALL
            .into_iter()
            .filter(|c| blocks.is_placeholder(*c))
            .collect();

        Ok(EngineStatus {
            pending,
            processed,
            placeholder_categories,
        })
    }

    fn next_delay(&mut self) -> Duration {
        let bounds = self.config.delay;
        Duration::from_secs(self.rng.random_range(bounds.min_secs..=bounds.max_secs))
    }

    /// Paths staged by the snapshot: ledger directories and the output directory
    fn snapshot_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();
        let candidates = [
            self.config.pending_table.parent().map(|p| p.to_path_buf()),
            self.config.processed_table.parent().map(|p| p.to_path_buf()),
            Some(self.config.output_dir.clone()),
        ];

        for path in candidates.into_iter().flatten() {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    async fn take_snapshot(&self, published: usize) {
        let message = snapshot_message(published);
        let paths = self.snapshot_paths();

        info!(adapter = self.snapshot.name(), %message, "Taking snapshot");
        if let Err(e) = self.snapshot.commit(&paths, &message).await {
            warn!(adapter = self.snapshot.name(), error = %e, "Snapshot failed");
        }
    }
}

/// Commit message for a LIVE batch
pub fn snapshot_message(published: usize) -> String {
    format!(
        "AUTO: Publish {} new articles on {}",
        published,
        Local::now().format("%Y-%m-%d %H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp: &TempDir) -> EngineConfig {
        let mut config = EngineConfig::with_root(temp.path());
        config.delay = crate::config::DelayBounds::none();
        config.snapshot_enabled = false;
        config.seed = Some(11);
        config
    }

    #[test]
    fn test_snapshot_message_format() {
        let message = snapshot_message(3);
        assert!(message.starts_with("AUTO: Publish 3 new articles on "));
        // "YYYY-MM-DD HH:MM"
        let stamp = message.trim_start_matches("AUTO: Publish 3 new articles on ");
        assert_eq!(stamp.len(), 16);
    }

    #[test]
    fn test_snapshot_paths_are_deduplicated() {
        let temp = TempDir::new().unwrap();
        let driver = BatchDriver::new(test_config(&temp));

        let paths = driver.snapshot_paths();
        assert_eq!(
            paths,
            vec![
                temp.path().join("content-engine"),
                temp.path().join("knowledge-hub/content/posts"),
            ]
        );
    }

    #[tokio::test]
    async fn test_snapshot_uses_configured_git_binary() {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(&temp);
        config.mode = RunMode::Live;
        config.snapshot_enabled = true;
        config.git_binary = temp.path().join("missing-git").display().to_string();
        tokio::fs::create_dir_all(config.pending_table.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&config.pending_table, "keyword,title\nx,Hello\n")
            .await
            .unwrap();

        let mut driver = BatchDriver::new(config);
        assert_eq!(driver.snapshot.name(), "git");

        // The snapshot fails to spawn but the run still succeeds
        let report = driver.run().await.unwrap();
        assert!(report.snapshot_attempted);
        assert_eq!(report.processed.len(), 1);
    }

    #[tokio::test]
    async fn test_preview_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut driver = BatchDriver::new(test_config(&temp));

        let rendered = driver
            .preview(&KeywordRecord::new("compost", "Composting at Home"))
            .await
            .unwrap();

        assert!(rendered.contains("slug: composting-at-home"));
        assert!(rendered.contains("## Introduction: An Overview"));
        assert!(!temp.path().join("knowledge-hub").exists());
    }

    #[tokio::test]
    async fn test_status_reports_placeholders() {
        let temp = TempDir::new().unwrap();
        let config = test_config(&temp);
        tokio::fs::create_dir_all(&config.blocks_dir).await.unwrap();
        tokio::fs::write(config.blocks_dir.join("intros.txt"), "Hello {keyword}")
            .await
            .unwrap();

        let driver = BatchDriver::new(config);
        let status = driver.status().await.unwrap();

        assert_eq!(status.pending, 0);
        assert_eq!(status.processed, Some(0));
        assert_eq!(status.placeholder_categories.len(), 6);
        assert!(!status.placeholder_categories.contains(&BlockCategory::Intro));
    }
}
