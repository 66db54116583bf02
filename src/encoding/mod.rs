//! Mojibake detection and repair.
//!
//! The scraped archives occasionally ship UTF-8 text that was decoded as
//! Windows-1252 somewhere upstream, turning umlauts and the German quote and
//! dash glyphs into two- and three-character artifacts. Corruption of this
//! kind is uniform per source file, so detection is a corpus-level decision:
//! if any text column of any row in a load shows an indicator, the whole
//! load is treated as miscoded and every text column gets a repair pass.
//!
//! Repair is best-effort per value: re-encode the code points as
//! Windows-1252 bytes and re-decode those bytes as UTF-8. A value that fails
//! the round trip becomes null rather than raising.

use encoding_rs::WINDOWS_1252;

use crate::models::Article;

/// Degraded forms of the German umlauts and quote/dash markers read under
/// Windows-1252. One hit anywhere in a load flags the whole load.
pub const MOJIBAKE_INDICATORS: [&str; 5] = ["â€ž", "Ã¶", "Ã¼", "Ã¤", "â€"];

// Lead sequences that justify round-tripping an individual value. Values
// without one pass through unchanged even in a flagged load.
const SUSPICIOUS_LEADS: [&str; 4] = ["Ã", "Â", "â€", "Å"];

// Double-encoded text can be nested more than one level deep.
const MAX_REPAIR_ROUNDS: usize = 3;

/// Check a single string for a known mojibake indicator.
pub fn has_mojibake(text: &str) -> bool {
    MOJIBAKE_INDICATORS.iter().any(|m| text.contains(m))
}

fn is_suspicious(text: &str) -> bool {
    SUSPICIOUS_LEADS.iter().any(|m| text.contains(m))
}

/// Corpus-level decision: does any text column of any article in this load
/// show a mojibake indicator?
pub fn load_is_miscoded(articles: &[Article]) -> bool {
    articles
        .iter()
        .flat_map(|a| a.text_fields())
        .flatten()
        .any(has_mojibake)
}

/// Repair one value by round-tripping it through Windows-1252.
///
/// Clean values pass through unchanged. Suspicious values are re-encoded as
/// Windows-1252 bytes and re-decoded as UTF-8, iterating while indicators
/// remain (bounded). Returns `None` when the round trip fails, in which case
/// the caller drops the value.
///
/// # Examples
///
/// ```
/// use siebwerk::encoding::repair_value;
///
/// assert_eq!(repair_value("FuÃŸball").as_deref(), Some("Fußball"));
/// assert_eq!(repair_value("Fußball").as_deref(), Some("Fußball"));
/// ```
pub fn repair_value(text: &str) -> Option<String> {
    if !is_suspicious(text) {
        return Some(text.to_string());
    }
    let mut current = text.to_string();
    for _ in 0..MAX_REPAIR_ROUNDS {
        let (bytes, _, had_errors) = WINDOWS_1252.encode(&current);
        if had_errors {
            return None;
        }
        match String::from_utf8(bytes.into_owned()) {
            Ok(decoded) => current = decoded,
            Err(_) => return None,
        }
        if !is_suspicious(&current) {
            break;
        }
    }
    Some(current)
}

/// Run the repair pass over every text column of an article.
///
/// Values that fail the round trip are nulled. Returns the number of values
/// dropped, so the caller can log per-unit failures with context.
pub fn repair_article(article: &mut Article) -> usize {
    let mut dropped = 0;
    for field in article.text_fields_mut() {
        if let Some(value) = field.as_deref() {
            match repair_value(value) {
                Some(repaired) => *field = Some(repaired),
                None => {
                    *field = None;
                    dropped += 1;
                }
            }
        }
    }
    dropped
}
