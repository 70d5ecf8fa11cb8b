//! Emitted documents: front matter, JSON-LD annotation, and body.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Synthetic offer identifier for monetized variants (`OFFER_123`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffiliateTag(String);

impl AffiliateTag {
    /// Build a tag from its numeric offer code
    pub fn from_code(code: u16) -> Self {
        Self(format!("OFFER_{}", code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AffiliateTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed publisher/author identity stamped into every document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    /// Organization name (also used in the editorial disclosure)
    pub name: String,

    /// Author display name
    pub author: String,

    /// Absolute URL of the organization logo
    pub logo_url: String,
}

impl Default for Publisher {
    fn default() -> Self {
        Self {
            name: "Knowledge Hub".to_string(),
            author: "Knowledge Hub AI".to_string(),
            logo_url: "https://knowledgehubs.github.io/knowledge-hub/images/logo.png".to_string(),
        }
    }
}

/// YAML front matter block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub date: DateTime<FixedOffset>,
    pub description: String,
    pub slug: String,
    /// Affiliate tag, or an empty string when the document is not monetized
    pub affiliate_key: String,
    pub canonical: String,
}

/// schema.org `Article` structured data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSchema {
    #[serde(rename = "@context")]
    pub context: String,

    #[serde(rename = "@type")]
    pub kind: String,

    pub headline: String,

    #[serde(rename = "datePublished")]
    pub date_published: DateTime<FixedOffset>,

    #[serde(rename = "mainEntityOfPage")]
    pub main_entity_of_page: String,

    pub publisher: OrganizationSchema,

    pub author: PersonSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSchema {
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub logo: ImageObjectSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageObjectSchema {
    #[serde(rename = "@type")]
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonSchema {
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
}

impl ArticleSchema {
    pub fn new(
        headline: impl Into<String>,
        date_published: DateTime<FixedOffset>,
        canonical: impl Into<String>,
        publisher: &Publisher,
    ) -> Self {
        Self {
            context: "https://schema.org".to_string(),
            kind: "Article".to_string(),
            headline: headline.into(),
            date_published,
            main_entity_of_page: canonical.into(),
            publisher: OrganizationSchema {
                kind: "Organization".to_string(),
                name: publisher.name.clone(),
                logo: ImageObjectSchema {
                    kind: "ImageObject".to_string(),
                    url: publisher.logo_url.clone(),
                },
            },
            author: PersonSchema {
                kind: "Person".to_string(),
                name: publisher.author.clone(),
            },
        }
    }
}

/// A fully rendered article, ready to be written once
#[derive(Debug, Clone)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub schema: ArticleSchema,
    pub body: String,
}

impl Document {
    /// File name for this document (`{slug}.md`)
    pub fn file_name(&self) -> String {
        format!("{}.md", self.front_matter.slug)
    }

    /// Render front matter, JSON-LD script block, and body into Markdown
    pub fn render(&self) -> anyhow::Result<String> {
        let yaml = serde_yaml::to_string(&self.front_matter)?;
        let json_ld = serde_json::to_string_pretty(&self.schema)?;

        Ok(format!(
            "---\n{}---\n\n<script type=\"application/ld+json\">\n{}\n</script>\n\n{}",
            yaml, json_ld, self.body
        ))
    }
}
