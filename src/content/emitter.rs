//! Document emission.
//!
//! Wraps an assembled body with front matter and JSON-LD and writes it to
//! `{output_dir}/{slug}.md`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, FixedOffset, Local, SubsecRound};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use super::assembler::AssembledContent;
use super::slug::slugify;
use crate::domain::{ArticleSchema, Document, FrontMatter, KeywordRecord, Publisher};

/// Maximum number of title characters carried into the description
const DESCRIPTION_TITLE_LEN: usize = 140;

/// Errors that can occur emitting a document
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Title produces an empty slug: {0:?}")]
    EmptySlug(String),

    #[error("Failed to render document: {0}")]
    Render(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Bounds for back-dating the publication timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOffset {
    pub min_minutes: u32,
    pub max_minutes: u32,
}

impl Default for PublishOffset {
    fn default() -> Self {
        Self {
            min_minutes: 1,
            max_minutes: 10,
        }
    }
}

/// Writes rendered documents into the output directory
#[derive(Debug, Clone)]
pub struct Emitter {
    output_dir: PathBuf,
    publisher: Publisher,
    publish_offset: PublishOffset,
}

impl Emitter {
    pub fn new(output_dir: impl Into<PathBuf>, publisher: Publisher, publish_offset: PublishOffset) -> Self {
        Self {
            output_dir: output_dir.into(),
            publisher,
            publish_offset,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Publication time: now minus a random offset within the configured bounds
    pub fn publication_time<R: Rng + ?Sized>(&self, rng: &mut R) -> DateTime<FixedOffset> {
        let minutes = rng.random_range(self.publish_offset.min_minutes..=self.publish_offset.max_minutes);
        let now: DateTime<FixedOffset> = Local::now().into();
        now.trunc_subsecs(0) - Duration::minutes(i64::from(minutes))
    }

    /// Build the document without touching the filesystem
    pub fn render(
        &self,
        record: &KeywordRecord,
        content: &AssembledContent,
        published_at: DateTime<FixedOffset>,
    ) -> Result<Document, EmitError> {
        let slug = slugify(&record.title);
        if slug.is_empty() {
            return Err(EmitError::EmptySlug(record.title.clone()));
        }

        let canonical = format!("/posts/{}/", slug);
        let short_title: String = record.title.chars().take(DESCRIPTION_TITLE_LEN).collect();

        let front_matter = FrontMatter {
            title: record.title.clone(),
            date: published_at,
            description: format!(
                "{} - A deep dive into {} and its key applications.",
                short_title.trim(),
                record.keyword
            ),
            slug,
            affiliate_key: content
                .affiliate_tag
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_default(),
            canonical: canonical.clone(),
        };

        let schema = ArticleSchema::new(&record.title, published_at, canonical, &self.publisher);

        Ok(Document {
            front_matter,
            schema,
            body: content.body.clone(),
        })
    }

    /// Render and write one document, returning the path written
    pub async fn emit<R: Rng + ?Sized>(
        &self,
        record: &KeywordRecord,
        content: &AssembledContent,
        rng: &mut R,
    ) -> Result<PathBuf, EmitError> {
        let document = self.render(record, content, self.publication_time(rng))?;
        let rendered = document
            .render()
            .map_err(|e| EmitError::Render(e.to_string()))?;

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| EmitError::Io {
                path: self.output_dir.clone(),
                source,
            })?;

        let path = self.output_dir.join(document.file_name());
        fs::write(&path, rendered)
            .await
            .map_err(|source| EmitError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "Document written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::assembler::SectionTopic;
    use crate::domain::AffiliateTag;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn content(tag: Option<AffiliateTag>) -> AssembledContent {
        AssembledContent {
            body: "## Introduction: An Overview\n\nBody text".to_string(),
            affiliate_tag: tag,
            topics: vec![SectionTopic::Tips],
        }
    }

    fn fixed_time() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-18T12:00:00+02:00").unwrap()
    }

    #[test]
    fn test_render_metadata() {
        let emitter = Emitter::new("/unused", Publisher::default(), PublishOffset::default());
        let record = KeywordRecord::new("home solar", "Home Solar: A Practical Guide");

        let doc = emitter
            .render(&record, &content(Some(AffiliateTag::from_code(321))), fixed_time())
            .unwrap();

        let fm = &doc.front_matter;
        assert_eq!(fm.slug, "home-solar-a-practical-guide");
        assert_eq!(fm.canonical, "/posts/home-solar-a-practical-guide/");
        assert_eq!(fm.affiliate_key, "OFFER_321");
        assert_eq!(
            fm.description,
            "Home Solar: A Practical Guide - A deep dive into home solar and its key applications."
        );
        assert_eq!(doc.schema.main_entity_of_page, fm.canonical);
        assert_eq!(doc.schema.publisher.name, "Knowledge Hub");
    }

    #[test]
    fn test_render_without_affiliate_and_long_title() {
        let emitter = Emitter::new("/unused", Publisher::default(), PublishOffset::default());
        let title = format!("{} end", "word ".repeat(40));
        let record = KeywordRecord::new("words", title);

        let doc = emitter.render(&record, &content(None), fixed_time()).unwrap();

        assert_eq!(doc.front_matter.affiliate_key, "");
        assert!(doc.front_matter.slug.chars().count() <= 60);
        assert!(doc
            .front_matter
            .description
            .starts_with("word ".repeat(28).trim_end()));
        assert!(!doc.front_matter.description.contains("end -"));
    }

    #[test]
    fn test_empty_slug_is_rejected() {
        let emitter = Emitter::new("/unused", Publisher::default(), PublishOffset::default());
        let record = KeywordRecord::new("dots", "...");
        let result = emitter.render(&record, &content(None), fixed_time());
        assert!(matches!(result, Err(EmitError::EmptySlug(_))));
    }

    #[test]
    fn test_publication_time_is_back_dated() {
        let emitter = Emitter::new("/unused", Publisher::default(), PublishOffset::default());
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..20 {
            let now: DateTime<FixedOffset> = Local::now().into();
            let published = emitter.publication_time(&mut rng);
            let behind = now - published;
            assert!(behind >= Duration::seconds(59), "only {:?} behind", behind);
            assert!(behind <= Duration::minutes(11));
        }
    }

    #[tokio::test]
    async fn test_emit_creates_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("content").join("posts");
        let emitter = Emitter::new(&out, Publisher::default(), PublishOffset::default());
        let record = KeywordRecord::new("rust", r#"Rust "Ownership" Explained"#);

        let path = emitter
            .emit(&record, &content(None), &mut StdRng::seed_from_u64(9))
            .await
            .unwrap();

        assert_eq!(path, out.join("rust-\"ownership\"-explained.md"));
        let written = fs::read_to_string(&path).await.unwrap();
        assert!(written.contains(r#""headline": "Rust \"Ownership\" Explained""#));
        assert!(written.ends_with("Body text"));
    }

    #[tokio::test]
    async fn test_emit_into_unwritable_location_fails() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        fs::write(&blocker, "file").await.unwrap();

        let emitter = Emitter::new(blocker.join("posts"), Publisher::default(), PublishOffset::default());
        let result = emitter
            .emit(&KeywordRecord::new("k", "Title"), &content(None), &mut StdRng::seed_from_u64(1))
            .await;

        assert!(matches!(result, Err(EmitError::Io { .. })));
    }
}
