//! Text block loading.
//!
//! Fragments are grouped by category, one file per category, one fragment
//! per non-blank line:
//!
//! ```text
//! blocks/
//! ├── intros.txt        # {keyword} and {title} placeholders
//! ├── explanations.txt
//! ├── pros.txt          # {keyword}
//! ├── cons.txt
//! ├── steps.txt
//! ├── tips.txt
//! └── cta.txt           # {keyword} and [CTA_LINK]
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

/// Fragment substituted for a category whose source is missing or empty
pub const PLACEHOLDER_FRAGMENT: &str = "[Placeholder block content - please fill this file]";

/// Category of text fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    Intro,
    Explanation,
    Pros,
    Cons,
    Steps,
    Tips,
    Cta,
}

impl BlockCategory {
    /// Every category, in load order
    pub const ALL: [BlockCategory; 7] = [
        BlockCategory::Intro,
        BlockCategory::Explanation,
        BlockCategory::Pros,
        BlockCategory::Cons,
        BlockCategory::Steps,
        BlockCategory::Tips,
        BlockCategory::Cta,
    ];

    /// Default source file name within the blocks directory
    pub fn default_file_name(&self) -> &'static str {
        match self {
            BlockCategory::Intro => "intros.txt",
            BlockCategory::Explanation => "explanations.txt",
            BlockCategory::Pros => "pros.txt",
            BlockCategory::Cons => "cons.txt",
            BlockCategory::Steps => "steps.txt",
            BlockCategory::Tips => "tips.txt",
            BlockCategory::Cta => "cta.txt",
        }
    }

    /// Default category → file name mapping
    pub fn default_sources() -> BTreeMap<BlockCategory, String> {
        Self::ALL
            .iter()
            .map(|c| (*c, c.default_file_name().to_string()))
            .collect()
    }
}

impl std::fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BlockCategory::Intro => "intro",
            BlockCategory::Explanation => "explanation",
            BlockCategory::Pros => "pros",
            BlockCategory::Cons => "cons",
            BlockCategory::Steps => "steps",
            BlockCategory::Tips => "tips",
            BlockCategory::Cta => "cta",
        };
        write!(f, "{}", name)
    }
}

/// Loaded fragments for every category.
///
/// Every category holds at least one fragment once loaded.
#[derive(Debug, Clone)]
pub struct BlockSet {
    fragments: HashMap<BlockCategory, Vec<String>>,
}

impl BlockSet {
    /// Load every category from `blocks_dir`.
    ///
    /// Categories missing from `sources` use their default file name. A
    /// missing, unreadable, or blank source yields the placeholder fragment.
    pub async fn load(blocks_dir: &Path, sources: &BTreeMap<BlockCategory, String>) -> Self {
        let mut fragments = HashMap::new();

        for category in BlockCategory::ALL {
            let file_name = sources
                .get(&category)
                .map(String::as_str)
                .unwrap_or_else(|| category.default_file_name());
            let path = blocks_dir.join(file_name);

            let lines = match fs::read_to_string(&path).await {
                Ok(content) => parse_fragments(&content),
                Err(e) => {
                    warn!(%category, path = %path.display(), error = %e, "Block file not readable, using placeholder");
                    Vec::new()
                }
            };

            let lines = if lines.is_empty() {
                if path.exists() {
                    warn!(%category, path = %path.display(), "Block file has no fragments, using placeholder");
                }
                vec![PLACEHOLDER_FRAGMENT.to_string()]
            } else {
                debug!(%category, count = lines.len(), "Loaded block fragments");
                lines
            };

            fragments.insert(category, lines);
        }

        Self { fragments }
    }

    /// Build a block set from in-memory fragments (empty categories get the placeholder)
    pub fn from_fragments<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (BlockCategory, Vec<S>)>,
        S: Into<String>,
    {
        let mut fragments: HashMap<BlockCategory, Vec<String>> = entries
            .into_iter()
            .map(|(c, lines)| (c, lines.into_iter().map(Into::into).collect::<Vec<String>>()))
            .filter(|(_, lines)| !lines.is_empty())
            .collect();

        for category in BlockCategory::ALL {
            fragments
                .entry(category)
                .or_insert_with(|| vec![PLACEHOLDER_FRAGMENT.to_string()]);
        }

        Self { fragments }
    }

    /// Fragments for a category (never empty)
    pub fn fragments(&self, category: BlockCategory) -> &[String] {
        self.fragments
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a category fell back to the placeholder
    pub fn is_placeholder(&self, category: BlockCategory) -> bool {
        let fragments = self.fragments(category);
        fragments.len() == 1 && fragments[0] == PLACEHOLDER_FRAGMENT
    }
}

/// Split a block file into trimmed, non-blank fragments
fn parse_fragments(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_fragments_skips_blank_lines() {
        let content = "  first line  \n\n   \nsecond line\r\n";
        assert_eq!(parse_fragments(content), vec!["first line", "second line"]);
    }

    #[tokio::test]
    async fn test_load_reads_existing_and_substitutes_missing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("intros.txt"), "Intro about {keyword}\nAnother intro\n")
            .await
            .unwrap();
        fs::write(temp.path().join("tips.txt"), "\n\n").await.unwrap();

        let blocks = BlockSet::load(temp.path(), &BlockCategory::default_sources()).await;

        assert_eq!(blocks.fragments(BlockCategory::Intro).len(), 2);
        assert!(!blocks.is_placeholder(BlockCategory::Intro));

        // Blank file and missing file both fall back
        assert!(blocks.is_placeholder(BlockCategory::Tips));
        assert!(blocks.is_placeholder(BlockCategory::Cta));
        assert_eq!(blocks.fragments(BlockCategory::Cta), [PLACEHOLDER_FRAGMENT]);
    }

    #[tokio::test]
    async fn test_load_honours_custom_source_names() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("closing.txt"), "Act now on {keyword}. [CTA_LINK]")
            .await
            .unwrap();

        let mut sources = BlockCategory::default_sources();
        sources.insert(BlockCategory::Cta, "closing.txt".to_string());

        let blocks = BlockSet::load(temp.path(), &sources).await;
        assert_eq!(
            blocks.fragments(BlockCategory::Cta),
            ["Act now on {keyword}. [CTA_LINK]"]
        );
    }

    #[test]
    fn test_every_category_is_non_empty() {
        let blocks = BlockSet::from_fragments([(BlockCategory::Pros, vec!["Good"])]);
        for category in BlockCategory::ALL {
            assert!(!blocks.fragments(category).is_empty(), "{} empty", category);
        }
        assert!(!blocks.is_placeholder(BlockCategory::Pros));
    }
}
