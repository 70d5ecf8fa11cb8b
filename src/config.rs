//! Configuration for content-engine.
//!
//! Configuration sources (highest priority first):
//! 1. CLI flags (applied by the caller)
//! 2. Environment variables (CONTENT_ENGINE_ROOT, SYSTEM_MODE)
//! 3. Config file (.content-engine/config.yaml)
//! 4. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .content-engine/config.yaml
//! - Paths in the config file are relative to the project root, the
//!   directory that contains .content-engine/

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::blocks::BlockCategory;
use crate::content::PublishOffset;
use crate::domain::{Publisher, RunMode};

pub const CONFIG_DIR: &str = ".content-engine";
pub const CONFIG_FILE: &str = "config.yaml";

pub const ENV_ROOT: &str = "CONTENT_ENGINE_ROOT";
pub const ENV_MODE: &str = "SYSTEM_MODE";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub publishing: Option<PublishingConfig>,
    #[serde(default)]
    pub publisher: Option<PublisherConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Pending keyword table (relative to project root)
    pub pending_table: Option<String>,
    /// Processed keyword table (relative to project root)
    pub processed_table: Option<String>,
    /// Directory holding block files
    pub blocks_dir: Option<String>,
    /// Directory documents are written to
    pub output_dir: Option<String>,
    /// Block category to file name overrides
    #[serde(default)]
    pub block_files: HashMap<BlockCategory, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    pub batch_size: Option<usize>,
    pub affiliate_probability: Option<f64>,
    pub min_delay_secs: Option<u64>,
    pub max_delay_secs: Option<u64>,
    pub min_offset_minutes: Option<u32>,
    pub max_offset_minutes: Option<u32>,
    pub snapshot: Option<bool>,
    /// Git executable used for snapshots
    pub git_binary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublisherConfig {
    pub name: Option<String>,
    pub author: Option<String>,
    pub logo_url: Option<String>,
}

/// Invalid configuration values
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Batch size must be at least 1")]
    ZeroBatchSize,

    #[error("Affiliate probability must be within [0, 1], got {0}")]
    Probability(f64),

    #[error("Delay bounds inverted: min {min}s > max {max}s")]
    DelayBounds { min: u64, max: u64 },

    #[error("Publish offset bounds inverted: min {min}m > max {max}m")]
    OffsetBounds { min: u32, max: u32 },
}

/// Bounds for the pause between two emitted documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayBounds {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for DelayBounds {
    fn default() -> Self {
        Self {
            min_secs: 30,
            max_secs: 120,
        }
    }
}

impl DelayBounds {
    /// No delay at all (tests, previews)
    pub fn none() -> Self {
        Self {
            min_secs: 0,
            max_secs: 0,
        }
    }
}

/// Resolved configuration handed to the batch driver
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Project root; relative paths resolve against it
    pub root: PathBuf,
    pub pending_table: PathBuf,
    pub processed_table: PathBuf,
    pub blocks_dir: PathBuf,
    pub block_sources: BTreeMap<BlockCategory, String>,
    pub output_dir: PathBuf,
    /// Maximum records per run (default: 5)
    pub batch_size: usize,
    /// Chance an article carries an affiliate tag (default: 0.6)
    pub affiliate_probability: f64,
    pub delay: DelayBounds,
    pub publish_offset: PublishOffset,
    pub publisher: Publisher,
    pub mode: RunMode,
    /// Take a git snapshot after LIVE runs
    pub snapshot_enabled: bool,
    /// Git executable used for snapshots (default: "git")
    pub git_binary: String,
    /// Fixed RNG seed; None seeds from the OS
    pub seed: Option<u64>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl EngineConfig {
    /// Defaults laid out under `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            pending_table: root.join("content-engine").join("new_keywords.csv"),
            processed_table: root.join("content-engine").join("processed_keywords.csv"),
            blocks_dir: root.join("content-engine").join("blocks"),
            block_sources: BlockCategory::default_sources(),
            output_dir: root.join("knowledge-hub").join("content").join("posts"),
            batch_size: 5,
            affiliate_probability: 0.6,
            delay: DelayBounds::default(),
            publish_offset: PublishOffset::default(),
            publisher: Publisher::default(),
            mode: RunMode::Test,
            snapshot_enabled: true,
            git_binary: "git".to_string(),
            seed: None,
            config_file: None,
            root,
        }
    }

    /// Load configuration starting discovery from the current directory
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Self::resolve(&cwd, &EnvOverrides::from_env())
    }

    /// Resolve configuration from `start_dir` with explicit environment values
    pub fn resolve(start_dir: &Path, env: &EnvOverrides) -> Result<Self> {
        let config_file = find_config_file(start_dir);

        let root = if let Some(ref env_root) = env.root {
            PathBuf::from(env_root)
        } else if let Some(ref path) = config_file {
            // Project root is the parent of .content-engine/
            path.parent()
                .and_then(|p| p.parent())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf())
        } else {
            start_dir.to_path_buf()
        };

        let mut config = Self::with_root(&root);

        if let Some(ref path) = config_file {
            let file = load_config_file(path)?;
            config.apply_file(file);
            config.config_file = Some(path.clone());
        }

        if let Some(ref mode) = env.mode {
            config.mode = mode
                .parse()
                .with_context(|| format!("Invalid {} value", ENV_MODE))?;
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        let paths = file.paths;
        if let Some(p) = paths.pending_table {
            self.pending_table = resolve_path(&self.root, &p);
        }
        if let Some(p) = paths.processed_table {
            self.processed_table = resolve_path(&self.root, &p);
        }
        if let Some(p) = paths.blocks_dir {
            self.blocks_dir = resolve_path(&self.root, &p);
        }
        if let Some(p) = paths.output_dir {
            self.output_dir = resolve_path(&self.root, &p);
        }
        self.block_sources.extend(paths.block_files);

        if let Some(publishing) = file.publishing {
            self.batch_size = publishing.batch_size.unwrap_or(self.batch_size);
            self.affiliate_probability = publishing
                .affiliate_probability
                .unwrap_or(self.affiliate_probability);
            self.delay.min_secs = publishing.min_delay_secs.unwrap_or(self.delay.min_secs);
            self.delay.max_secs = publishing.max_delay_secs.unwrap_or(self.delay.max_secs);
            self.publish_offset.min_minutes = publishing
                .min_offset_minutes
                .unwrap_or(self.publish_offset.min_minutes);
            self.publish_offset.max_minutes = publishing
                .max_offset_minutes
                .unwrap_or(self.publish_offset.max_minutes);
            self.snapshot_enabled = publishing.snapshot.unwrap_or(self.snapshot_enabled);
            if let Some(git_binary) = publishing.git_binary {
                self.git_binary = git_binary;
            }
        }

        if let Some(publisher) = file.publisher {
            if let Some(name) = publisher.name {
                self.publisher.name = name;
            }
            if let Some(author) = publisher.author {
                self.publisher.author = author;
            }
            if let Some(logo_url) = publisher.logo_url {
                self.publisher.logo_url = logo_url;
            }
        }
    }

    /// Reject values the driver cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if !(0.0..=1.0).contains(&self.affiliate_probability) {
            return Err(ConfigError::Probability(self.affiliate_probability));
        }
        if self.delay.min_secs > self.delay.max_secs {
            return Err(ConfigError::DelayBounds {
                min: self.delay.min_secs,
                max: self.delay.max_secs,
            });
        }
        if self.publish_offset.min_minutes > self.publish_offset.max_minutes {
            return Err(ConfigError::OffsetBounds {
                min: self.publish_offset.min_minutes,
                max: self.publish_offset.max_minutes,
            });
        }
        Ok(())
    }
}

/// Environment values that feed configuration
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub root: Option<String>,
    pub mode: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            root: std::env::var(ENV_ROOT).ok(),
            mode: std::env::var(ENV_MODE).ok(),
        }
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
