// Core data structures for the siebwerk pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whitespace-split word count of a text unit.
///
/// This is the token count persisted with every canonical record and used by
/// the export threshold filter.
pub fn token_count(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

/// Ingested news article
///
/// All text fields are nullable; scraped archives are ragged. The five
/// columns consumed by the cleaning pipeline are `headline`, `pretitle`,
/// `lead_paragraph`, `description` and `body` (paragraphs separated by a
/// blank line).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Article {
    pub source: String,
    pub article_id: Option<String>,
    pub url: Option<String>,
    pub section: Option<String>,
    #[serde(default)]
    pub premium: bool,
    pub date_published: Option<String>,
    pub description: Option<String>,
    pub headline: Option<String>,
    pub pretitle: Option<String>,
    pub lead_paragraph: Option<String>,
    pub body: Option<String>,
    pub author: Option<String>,
    pub ingested_at: DateTime<Utc>,
}

/// One article record as it appears in an ingest file (JSON Lines)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ArticleInput {
    pub source: Option<String>,
    pub article_id: Option<String>,
    pub url: Option<String>,
    pub section: Option<String>,
    pub premium: Option<bool>,
    pub date_published: Option<String>,
    pub description: Option<String>,
    pub headline: Option<String>,
    pub pretitle: Option<String>,
    pub lead_paragraph: Option<String>,
    pub body: Option<String>,
    pub author: Option<String>,
}

impl Article {
    /// Build an article from an ingest record, stamping the ingest time
    pub fn from_input(input: ArticleInput, fallback_source: &str) -> Self {
        Self {
            source: input
                .source
                .unwrap_or_else(|| fallback_source.to_string()),
            article_id: input.article_id,
            url: input.url,
            section: input.section,
            premium: input.premium.unwrap_or(false),
            date_published: input.date_published,
            description: input.description,
            headline: input.headline,
            pretitle: input.pretitle,
            lead_paragraph: input.lead_paragraph,
            body: input.body,
            author: input.author,
            ingested_at: Utc::now(),
        }
    }

    /// Key under which this article is deduplicated at ingest.
    ///
    /// Prefers the URL; falls back to `source:article_id`. Articles without
    /// either cannot be deduplicated and are rejected by the ingest step.
    pub fn dedup_key(&self) -> Option<String> {
        if let Some(url) = self.url.as_deref() {
            if !url.is_empty() {
                return Some(url.to_string());
            }
        }
        self.article_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("{}:{}", self.source, id))
    }

    /// Paragraph-granularity units of this article, in document order.
    ///
    /// The headline unit concatenates pretitle and headline the way the
    /// cleaning pipeline expects them: `pretitle ?? " "`, one space, then
    /// `headline ?? ""`. The body is split on blank lines.
    pub fn units(&self) -> Vec<RawUnit> {
        let mut units = Vec::new();

        if self.headline.is_some() || self.pretitle.is_some() {
            let text = format!(
                "{} {}",
                self.pretitle.as_deref().unwrap_or(" "),
                self.headline.as_deref().unwrap_or("")
            );
            units.push(RawUnit::new(UnitKind::Headline, text));
        }
        if let Some(lead) = self.lead_paragraph.as_deref() {
            units.push(RawUnit::new(UnitKind::LeadParagraph, lead.to_string()));
        }
        if let Some(description) = self.description.as_deref() {
            units.push(RawUnit::new(
                UnitKind::Description,
                description.to_string(),
            ));
        }
        if let Some(body) = self.body.as_deref() {
            for paragraph in body.split("\n\n") {
                if !paragraph.trim().is_empty() {
                    units.push(RawUnit::new(
                        UnitKind::BodyParagraph,
                        paragraph.to_string(),
                    ));
                }
            }
        }
        units
    }

    /// Headline-level strings observed verbatim by the raw-sentence layer:
    /// the headline, the pretitle, and their concatenation when both exist.
    pub fn raw_sentence_seeds(&self) -> Vec<String> {
        let mut seeds = Vec::new();
        if let Some(headline) = self.headline.as_deref() {
            seeds.push(headline.to_string());
        }
        if let Some(pretitle) = self.pretitle.as_deref() {
            seeds.push(pretitle.to_string());
        }
        if let (Some(pretitle), Some(headline)) =
            (self.pretitle.as_deref(), self.headline.as_deref())
        {
            seeds.push(format!("{pretitle} {headline}"));
        }
        seeds
    }

    /// Fields the sentence splitter runs over
    pub fn splittable_fields(&self) -> Vec<&str> {
        [
            self.lead_paragraph.as_deref(),
            self.description.as_deref(),
            self.body.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Mutable access to every text column, for the encoding repair pass
    pub fn text_fields_mut(&mut self) -> [&mut Option<String>; 5] {
        [
            &mut self.headline,
            &mut self.description,
            &mut self.pretitle,
            &mut self.lead_paragraph,
            &mut self.body,
        ]
    }

    /// Read access to every text column, for the corpus-level mojibake scan
    pub fn text_fields(&self) -> [Option<&str>; 5] {
        [
            self.headline.as_deref(),
            self.description.as_deref(),
            self.pretitle.as_deref(),
            self.lead_paragraph.as_deref(),
            self.body.as_deref(),
        ]
    }
}

/// Source position a raw unit was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Headline,
    LeadParagraph,
    Description,
    BodyParagraph,
    Sentence,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Headline => "headline",
            Self::LeadParagraph => "lead_paragraph",
            Self::Description => "description",
            Self::BodyParagraph => "body_paragraph",
            Self::Sentence => "sentence",
        }
    }
}

/// A unit of source text before cleaning.
///
/// Not persisted itself; consumed once by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUnit {
    pub kind: UnitKind,
    pub text: String,
}

impl RawUnit {
    pub fn new(kind: UnitKind, text: String) -> Self {
        Self { kind, text }
    }
}

/// Dedup record of an unnormalized sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSentenceRecord {
    pub fingerprint: String,
    pub text: String,
    pub count: u64,
}

/// Dedup record of a normalized text unit; the row exported to the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTextRecord {
    pub fingerprint: String,
    pub text: String,
    pub token_count: u32,
    pub count: u64,
}

/// Row counts and observation sums across the store
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StoreStats {
    pub articles: u64,
    pub raw_sentences: u64,
    pub raw_observations: u64,
    pub canonical_units: u64,
    pub canonical_observations: u64,
}

/// Outcome of one corpus export run
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub lines_written: u64,
    pub batches: u64,
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article {
            source: "diepresse".to_string(),
            url: Some("https://example.at/a/1".to_string()),
            headline: Some("Wahl entschieden".to_string()),
            pretitle: Some("Politik".to_string()),
            lead_paragraph: Some("Der erste Absatz.".to_string()),
            description: Some("Kurzbeschreibung.".to_string()),
            body: Some("Absatz eins.\n\nAbsatz zwei.\n\n\n\nAbsatz drei.".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_token_count() {
        assert_eq!(token_count(""), 0);
        assert_eq!(token_count("ein"), 1);
        assert_eq!(token_count("  zwei   Wörter  "), 2);
        assert_eq!(token_count("a b c d e"), 5);
    }

    #[test]
    fn test_units_in_document_order() {
        let units = article().units();
        let kinds: Vec<UnitKind> = units.iter().map(|u| u.kind).collect();
        assert_eq!(
            kinds,
            vec![
                UnitKind::Headline,
                UnitKind::LeadParagraph,
                UnitKind::Description,
                UnitKind::BodyParagraph,
                UnitKind::BodyParagraph,
                UnitKind::BodyParagraph,
            ]
        );
        assert_eq!(units[0].text, "Politik Wahl entschieden");
        assert_eq!(units[3].text, "Absatz eins.");
        assert_eq!(units[5].text, "Absatz drei.");
    }

    #[test]
    fn test_headline_unit_with_missing_pretitle() {
        let mut a = article();
        a.pretitle = None;
        let units = a.units();
        assert_eq!(units[0].kind, UnitKind::Headline);
        assert_eq!(units[0].text, "  Wahl entschieden");
    }

    #[test]
    fn test_no_headline_unit_when_both_missing() {
        let mut a = article();
        a.pretitle = None;
        a.headline = None;
        assert!(a.units().iter().all(|u| u.kind != UnitKind::Headline));
    }

    #[test]
    fn test_raw_sentence_seeds() {
        let seeds = article().raw_sentence_seeds();
        assert_eq!(
            seeds,
            vec![
                "Wahl entschieden".to_string(),
                "Politik".to_string(),
                "Politik Wahl entschieden".to_string(),
            ]
        );

        let mut a = article();
        a.pretitle = None;
        assert_eq!(a.raw_sentence_seeds(), vec!["Wahl entschieden".to_string()]);
    }

    #[test]
    fn test_dedup_key_prefers_url() {
        let a = article();
        assert_eq!(a.dedup_key().as_deref(), Some("https://example.at/a/1"));

        let mut b = article();
        b.url = None;
        b.article_id = Some("4711".to_string());
        assert_eq!(b.dedup_key().as_deref(), Some("diepresse:4711"));

        let mut c = article();
        c.url = None;
        c.article_id = None;
        assert_eq!(c.dedup_key(), None);
    }

    #[test]
    fn test_empty_body_paragraphs_dropped() {
        let mut a = article();
        a.body = Some("\n\n  \n\nEchter Text.\n\n".to_string());
        let units = a.units();
        let paragraphs: Vec<&RawUnit> = units
            .iter()
            .filter(|u| u.kind == UnitKind::BodyParagraph)
            .collect();
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text, "Echter Text.");
    }
}
