//! Randomized article assembly.
//!
//! An article is always: introduction, 3–4 body sections drawn without
//! replacement from [`SectionTopic::ALL`], a call-to-action conclusion, and
//! the editorial disclosure. All randomness comes from the caller's RNG, so a
//! seeded RNG reproduces the same article.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::blocks::{BlockCategory, BlockSet, PLACEHOLDER_FRAGMENT};
use crate::domain::{AffiliateTag, KeywordRecord};

pub const INTRO_HEADING: &str = "Introduction: An Overview";
pub const CONCLUSION_HEADING: &str = "Conclusion: Final Thoughts and Next Steps";

/// Token in CTA fragments replaced by the affiliate directive or fallback
pub const CTA_LINK_TOKEN: &str = "[CTA_LINK]";
pub const CTA_FALLBACK: &str = "Visit a highly recommended resource here.";

const SECTION_SEPARATOR: &str = "\n\n";

/// Body section topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionTopic {
    Benefits,
    Challenges,
    Steps,
    Tips,
}

impl SectionTopic {
    pub const ALL: [SectionTopic; 4] = [
        SectionTopic::Benefits,
        SectionTopic::Challenges,
        SectionTopic::Steps,
        SectionTopic::Tips,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SectionTopic::Benefits => "Benefits-and-Advantages",
            SectionTopic::Challenges => "Key-Challenges",
            SectionTopic::Steps => "Practical-Steps-to-Implement",
            SectionTopic::Tips => "Expert-Tips-and-Insights",
        }
    }

    /// Block category the section body is drawn from
    pub fn category(&self) -> BlockCategory {
        match self {
            SectionTopic::Benefits => BlockCategory::Pros,
            SectionTopic::Challenges => BlockCategory::Cons,
            SectionTopic::Steps => BlockCategory::Steps,
            SectionTopic::Tips => BlockCategory::Tips,
        }
    }

    /// Heading text: hyphens become spaces, each word capitalized
    pub fn heading(&self) -> String {
        self.label()
            .split('-')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Assembly knobs taken from configuration
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Probability that an article carries an affiliate tag
    pub affiliate_probability: f64,

    /// Name used in the editorial disclosure
    pub publisher_name: String,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            affiliate_probability: 0.6,
            publisher_name: "Knowledge Hub".to_string(),
        }
    }
}

/// Assembled article body
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContent {
    pub body: String,
    pub affiliate_tag: Option<AffiliateTag>,
    /// Body topics in the order they appear
    pub topics: Vec<SectionTopic>,
}

/// Builds article bodies from a block set
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    options: AssemblyOptions,
}

impl Assembler {
    pub fn new(options: AssemblyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Assemble one article for `record`
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        record: &KeywordRecord,
        blocks: &BlockSet,
        rng: &mut R,
    ) -> AssembledContent {
        let keyword = record.keyword.as_str();

        let affiliate_tag = if rng.random_bool(self.options.affiliate_probability) {
            Some(AffiliateTag::from_code(rng.random_range(100..=999)))
        } else {
            None
        };

        let mut sections = Vec::with_capacity(7);

        let intro = pick(blocks, BlockCategory::Intro, rng)
            .replace("{keyword}", keyword)
            .replace("{title}", &record.title);
        sections.push(section(INTRO_HEADING, &intro));

        let count = rng.random_range(3..=4);
        let mut topics = SectionTopic::ALL.to_vec();
        topics.shuffle(rng);
        topics.truncate(count);

        for topic in &topics {
            let body = pick(blocks, topic.category(), rng).replace("{keyword}", keyword);
            sections.push(section(&topic.heading(), &body));
        }

        let link = match &affiliate_tag {
            Some(tag) => affiliate_directive(tag),
            None => CTA_FALLBACK.to_string(),
        };
        let cta = pick(blocks, BlockCategory::Cta, rng)
            .replace(CTA_LINK_TOKEN, &link)
            .replace("{keyword}", keyword);
        sections.push(section(CONCLUSION_HEADING, &cta));

        sections.push(editorial_note(&self.options.publisher_name, keyword));

        AssembledContent {
            body: sections.join(SECTION_SEPARATOR),
            affiliate_tag,
            topics,
        }
    }
}

/// Shortcode rendered by the publishing site for monetized CTAs
pub fn affiliate_directive(tag: &AffiliateTag) -> String {
    format!(
        "{{{{< affiliate_link key=\"{}\" text=\"Click Here to Start\" >}}}}",
        tag
    )
}

/// Closing disclosure appended to every article
pub fn editorial_note(publisher_name: &str, keyword: &str) -> String {
    format!(
        "\n---\n\n*Editor's Note: This guide was constructed by the {} engine to provide concise and deep insights into {}. We hope it has been a valuable addition to your knowledge base.*\n",
        publisher_name, keyword
    )
}

fn section(heading: &str, body: &str) -> String {
    format!("## {}\n\n{}", heading, body)
}

fn pick<'a, R: Rng + ?Sized>(blocks: &'a BlockSet, category: BlockCategory, rng: &mut R) -> &'a str {
    blocks
        .fragments(category)
        .choose(rng)
        .map(String::as_str)
        .unwrap_or(PLACEHOLDER_FRAGMENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_blocks() -> BlockSet {
        BlockSet::from_fragments([
            (BlockCategory::Intro, vec!["Welcome to {title}, all about {keyword}."]),
            (BlockCategory::Pros, vec!["{keyword} saves time.", "{keyword} scales."]),
            (BlockCategory::Cons, vec!["{keyword} has a learning curve."]),
            (BlockCategory::Steps, vec!["Start small with {keyword}."]),
            (BlockCategory::Tips, vec!["Measure {keyword} results."]),
            (BlockCategory::Cta, vec!["Ready for {keyword}? [CTA_LINK]"]),
        ])
    }

    fn record() -> KeywordRecord {
        KeywordRecord::new("cloud backup", "Cloud Backup Basics")
    }

    #[test]
    fn test_headings_are_title_cased() {
        assert_eq!(SectionTopic::Benefits.heading(), "Benefits And Advantages");
        assert_eq!(SectionTopic::Challenges.heading(), "Key Challenges");
        assert_eq!(SectionTopic::Steps.heading(), "Practical Steps To Implement");
        assert_eq!(SectionTopic::Tips.heading(), "Expert Tips And Insights");
    }

    #[test]
    fn test_same_seed_same_article() {
        let assembler = Assembler::default();
        let blocks = sample_blocks();

        let a = assembler.assemble(&record(), &blocks, &mut StdRng::seed_from_u64(42));
        let b = assembler.assemble(&record(), &blocks, &mut StdRng::seed_from_u64(42));

        assert_eq!(a, b);
    }

    #[test]
    fn test_article_structure() {
        let assembler = Assembler::default();
        let blocks = sample_blocks();

        for seed in 0..50 {
            let content = assembler.assemble(&record(), &blocks, &mut StdRng::seed_from_u64(seed));

            assert!(content.topics.len() == 3 || content.topics.len() == 4);
            let distinct: HashSet<_> = content.topics.iter().collect();
            assert_eq!(distinct.len(), content.topics.len());

            assert!(content.body.starts_with("## Introduction: An Overview\n\nWelcome to Cloud Backup Basics, all about cloud backup."));
            for topic in &content.topics {
                assert!(content.body.contains(&format!("## {}\n\n", topic.heading())));
            }
            assert_eq!(content.body.matches(CONCLUSION_HEADING).count(), 1);
            assert!(content
                .body
                .contains("deep insights into cloud backup. We hope"));
            assert!(!content.body.contains("{keyword}"));
            assert!(!content.body.contains(CTA_LINK_TOKEN));
        }
    }

    #[test]
    fn test_affiliate_tag_matches_cta() {
        let assembler = Assembler::default();
        let blocks = sample_blocks();

        let mut seen_tagged = false;
        let mut seen_untagged = false;
        for seed in 0..100 {
            let content = assembler.assemble(&record(), &blocks, &mut StdRng::seed_from_u64(seed));
            match &content.affiliate_tag {
                Some(tag) => {
                    seen_tagged = true;
                    assert!(content.body.contains(&affiliate_directive(tag)));
                    assert!(!content.body.contains(CTA_FALLBACK));
                    let code: u16 = tag.as_str().trim_start_matches("OFFER_").parse().unwrap();
                    assert!((100..=999).contains(&code));
                }
                None => {
                    seen_untagged = true;
                    assert!(content.body.contains(CTA_FALLBACK));
                    assert!(!content.body.contains("affiliate_link"));
                }
            }
        }
        assert!(seen_tagged && seen_untagged);
    }

    #[test]
    fn test_probability_bounds() {
        let blocks = sample_blocks();
        let never = Assembler::new(AssemblyOptions {
            affiliate_probability: 0.0,
            ..Default::default()
        });
        let always = Assembler::new(AssemblyOptions {
            affiliate_probability: 1.0,
            ..Default::default()
        });

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert!(never.assemble(&record(), &blocks, &mut rng).affiliate_tag.is_none());
            assert!(always.assemble(&record(), &blocks, &mut rng).affiliate_tag.is_some());
        }
    }

    #[test]
    fn test_missing_cta_uses_placeholder() {
        let blocks = BlockSet::from_fragments([(BlockCategory::Intro, vec!["Hi {keyword}"])]);
        let content = Assembler::default().assemble(&record(), &blocks, &mut StdRng::seed_from_u64(1));

        let conclusion = content.body.split(CONCLUSION_HEADING).nth(1).unwrap();
        assert!(conclusion.contains(PLACEHOLDER_FRAGMENT));
    }

    #[test]
    fn test_editorial_note_uses_publisher() {
        let note = editorial_note("Acme Press", "gardening");
        assert!(note.starts_with("\n---\n\n*Editor's Note: This guide was constructed by the Acme Press engine"));
        assert!(note.contains("insights into gardening."));
    }
}
