//! Git snapshot adapter.
//!
//! Runs `git add` and `git commit` as subprocesses in the project root.
//! Never pushes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::Snapshot;

/// Git adapter using subprocess mode
#[derive(Debug, Clone)]
pub struct GitSnapshot {
    /// Working tree the commands run in
    repo_root: PathBuf,

    /// Path to the git binary (default: "git")
    binary_path: String,
}

impl GitSnapshot {
    /// Create a git adapter for `repo_root` with the default binary
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            binary_path: "git".to_string(),
        }
    }

    /// Use a custom git binary path (`publishing.git_binary`)
    pub fn with_binary_path(mut self, binary_path: impl Into<String>) -> Self {
        self.binary_path = binary_path.into();
        self
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Run a git subcommand, failing on non-zero exit
    async fn run_git(&self, args: &[&str], paths: &[PathBuf]) -> Result<String> {
        let output = Command::new(&self.binary_path)
            .args(args)
            .args(paths)
            .current_dir(&self.repo_root)
            .output()
            .await
            .with_context(|| format!("Failed to spawn {} {}", self.binary_path, args.join(" ")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "git {} failed with exit code {}: {}",
                args.first().unwrap_or(&""),
                exit_code,
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Express `path` relative to the repo root when possible
    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.repo_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[async_trait]
impl Snapshot for GitSnapshot {
    fn name(&self) -> &str {
        "git"
    }

    async fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()> {
        let targets: Vec<PathBuf> = paths.iter().map(|p| self.relative(p)).collect();
        debug!(?targets, "Staging snapshot paths");

        // -A so removal of an exhausted pending table is staged too
        self.run_git(&["add", "-A", "--"], &targets).await?;

        let stdout = self.run_git(&["commit", "-m", message], &[]).await?;
        info!(summary = %stdout.lines().next().unwrap_or_default(), "Snapshot committed");

        Ok(())
    }
}
