//! Command-line interface for content-engine.
//!
//! Provides commands for running a batch, checking ledger status,
//! previewing a single article, and showing resolved configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{EngineConfig, ENV_MODE};
use crate::core::BatchDriver;
use crate::domain::{BatchOutcome, KeywordRecord, RunMode};

/// content-engine - Templated article generator
#[derive(Parser, Debug)]
#[command(name = "content-engine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one batch of articles from the pending table
    Run {
        /// Run mode: TEST consumes the batch without writing, LIVE publishes
        #[arg(short, long, env = ENV_MODE)]
        mode: Option<RunMode>,

        /// Maximum number of articles this run
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Seed the random source for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the git snapshot after a LIVE run
        #[arg(long)]
        no_snapshot: bool,
    },

    /// Show pending/processed counts and block file health
    Status,

    /// Print one rendered article to stdout without writing anything
    Preview {
        /// Target keyword
        #[arg(short, long)]
        keyword: String,

        /// Article title
        #[arg(short, long)]
        title: String,

        /// Seed the random source for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                mode,
                batch_size,
                seed,
                no_snapshot,
            } => run_batch(mode, batch_size, seed, no_snapshot).await,
            Commands::Status => show_status().await,
            Commands::Preview {
                keyword,
                title,
                seed,
            } => preview(keyword, title, seed).await,
            Commands::Config => show_config(),
        }
    }
}

/// Run one batch and print the outcome
async fn run_batch(
    mode: Option<RunMode>,
    batch_size: Option<usize>,
    seed: Option<u64>,
    no_snapshot: bool,
) -> Result<()> {
    let mut config = EngineConfig::load()?;
    if let Some(mode) = mode {
        config.mode = mode;
    }
    if let Some(batch_size) = batch_size {
        config.batch_size = batch_size;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    if no_snapshot {
        config.snapshot_enabled = false;
    }
    config.validate()?;

    let mut driver = BatchDriver::new(config);
    let report = driver.run().await?;

    println!("{}", report.status_line());

    if report.outcome == BatchOutcome::Completed {
        for path in &report.written {
            println!("  + {}", path.display());
        }
        for failed in &report.failed {
            println!("  ! {}: {}", failed.record.title, failed.error);
        }
        if report.snapshot_attempted {
            println!("Snapshot recorded; pushing is left to the workflow.");
        }
    }

    Ok(())
}

/// Show ledger and block status
async fn show_status() -> Result<()> {
    let config = EngineConfig::load()?;
    let driver = BatchDriver::new(config);
    let status = driver.status().await?;

    println!();
    println!("Content Engine Status");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    println!("Pending table:    {}", driver.config().pending_table.display());
    println!("Processed table:  {}", driver.config().processed_table.display());
    println!("Output directory: {}", driver.config().output_dir.display());
    println!();
    println!("Pending:    {}", status.pending);
    match status.processed {
        Some(count) => println!("Processed:  {}", count),
        None => println!("Processed:  (unreadable)"),
    }
    println!();

    if status.placeholder_categories.is_empty() {
        println!("Blocks: all categories loaded");
    } else {
        let names: Vec<String> = status
            .placeholder_categories
            .iter()
            .map(|c| c.to_string())
            .collect();
        println!("Blocks using placeholder: {}", names.join(", "));
    }

    Ok(())
}

/// Render one article to stdout
async fn preview(keyword: String, title: String, seed: Option<u64>) -> Result<()> {
    let mut config = EngineConfig::load()?;
    if seed.is_some() {
        config.seed = seed;
    }

    let mut driver = BatchDriver::new(config);
    let rendered = driver.preview(&KeywordRecord::new(keyword, title)).await?;
    println!("{}", rendered);

    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = EngineConfig::load()?;

    println!("Content Engine Configuration");
    println!("============================");
    println!();
    match &config.config_file {
        Some(path) => println!("Config file:      {}", path.display()),
        None => println!("Config file:      (none, using defaults)"),
    }
    println!("Root:             {}", config.root.display());
    println!("Pending table:    {}", config.pending_table.display());
    println!("Processed table:  {}", config.processed_table.display());
    println!("Blocks directory: {}", config.blocks_dir.display());
    println!("Output directory: {}", config.output_dir.display());
    println!();
    println!("Mode:             {}", config.mode);
    println!("Batch size:       {}", config.batch_size);
    println!("Affiliate chance: {}", config.affiliate_probability);
    println!(
        "Delay:            {}-{}s",
        config.delay.min_secs, config.delay.max_secs
    );
    println!(
        "Publish offset:   {}-{}m",
        config.publish_offset.min_minutes, config.publish_offset.max_minutes
    );
    println!("Snapshot:         {}", config.snapshot_enabled);
    println!("Git binary:       {}", config.git_binary);
    println!("Publisher:        {}", config.publisher.name);
    println!();
    println!("Block sources:");
    for (category, file) in &config.block_sources {
        println!("  {:<12} {}", category.to_string(), file);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "content-engine",
            "run",
            "--mode",
            "live",
            "--batch-size",
            "2",
            "--seed",
            "9",
            "--no-snapshot",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                mode,
                batch_size,
                seed,
                no_snapshot,
            } => {
                assert_eq!(mode, Some(RunMode::Live));
                assert_eq!(batch_size, Some(2));
                assert_eq!(seed, Some(9));
                assert!(no_snapshot);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_preview_requires_keyword_and_title() {
        assert!(Cli::try_parse_from(["content-engine", "preview", "--keyword", "k"]).is_err());
        assert!(Cli::try_parse_from([
            "content-engine",
            "preview",
            "--keyword",
            "k",
            "--title",
            "T"
        ])
        .is_ok());
    }
}
