//! Structural scrubbing steps: markup, invisible characters, Unicode folding,
//! links, emails, symbol ranges, foreign scripts, currency and emoji.
//!
//! These are the early normalizer stages. They run before any punctuation or
//! token-level handling, so later stages can assume plain, valid, Latin-script
//! text with ordinary spaces.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

// Pre-compiled regex patterns for performance
static HTML_FRAGMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:<(?:a|br|p|span|bold) .*?>)|(?:</(?:a|br|p|span|bold)>)").unwrap()
});

static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:https?://|www\.|pic\.)(?:[\w-]+\.)*[\w-]+\.[a-z]{2,3}/?(?:\w+?)?\b")
        .unwrap()
});

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+").unwrap());

// Arrows, math operators, box drawing, block elements, geometric shapes,
// and the loose bullet characters that show up in scraped article bodies.
static SYMBOL_RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\u{2190}-\u{21FF}\u{2200}-\u{22FF}\u{2500}-\u{259F}\u{25A0}-\u{25FF}\u{2022}\u{2023}\u{2043}]+",
    )
    .unwrap()
});

// Cyrillic (incl. supplement), Hebrew, Arabic (incl. supplement), the CJK
// blocks from radicals through the unified ideographs, Hangul syllables and
// the compatibility ideographs. These corpora target Latin-script content.
static FOREIGN_SCRIPT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\u{0400}-\u{052F}\u{0590}-\u{05FF}\u{0600}-\u{06FF}\u{0750}-\u{077F}\u{2E80}-\u{9FFF}\u{AC00}-\u{D7AF}\u{F900}-\u{FAFF}]+",
    )
    .unwrap()
});

static EMOJI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{1F000}-\u{1FAFF}\u{2600}-\u{27BF}\u{2B00}-\u{2BFF}\u{FE0F}\u{20E3}]+")
        .unwrap()
});

/// Strip known inline HTML tag fragments.
///
/// Removes attribute-bearing opening tags and all closing tags for `a`,
/// `br`, `p`, `span` and `bold`, each replaced by a single space. Scraped
/// article bodies carry exactly these fragments; anything else angled is
/// left for the punctuation stage.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::scrub::strip_html_fragments;
///
/// let text = r#"Die <a href="http://x.at" target="_blank">Tripadvisor</a>-Community"#;
/// assert_eq!(strip_html_fragments(text), "Die  Tripadvisor -Community");
/// ```
pub fn strip_html_fragments(text: &str) -> String {
    HTML_FRAGMENT_REGEX.replace_all(text, " ").into_owned()
}

/// Replace unusual whitespace code points with a plain space and strip the
/// invisible joiners entirely.
///
/// Replaced by a space: NBSP, Ogham space mark, the en/em/thin space block
/// (U+2000–200A), narrow NBSP, medium mathematical space, ideographic space.
///
/// Removed without a replacement: soft hyphen, non-breaking hyphen,
/// zero-width characters and directional marks (U+200B–200F), word joiner,
/// BOM.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::scrub::replace_invisible_whitespace;
///
/// assert_eq!(replace_invisible_whitespace("ein\u{00A0}Wort"), "ein Wort");
/// assert_eq!(replace_invisible_whitespace("Zei\u{00AD}tung"), "Zeitung");
/// ```
pub fn replace_invisible_whitespace(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}'
            | '\u{3000}' => Some(' '),
            '\u{00AD}' | '\u{2011}' | '\u{200B}'..='\u{200F}' | '\u{2060}' | '\u{FEFF}' => None,
            _ => Some(c),
        })
        .collect()
}

/// Apply Unicode NFKC normalization, folding visually-equivalent code points
/// (ligatures, fullwidth forms, superscripts) into their canonical
/// compatibility representation.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::scrub::apply_nfkc;
///
/// assert_eq!(apply_nfkc("ﬁnden"), "finden");
/// assert_eq!(apply_nfkc("x²"), "x2");
/// ```
pub fn apply_nfkc(text: &str) -> String {
    text.nfkc().collect()
}

/// Strip URL-like tokens, each replaced by a single space.
///
/// A URL is a word-boundary-delimited run prefixed by `http://`, `https://`,
/// `www.` or `pic.`, followed by dot-separated labels, a 2–3 letter
/// top-level suffix and optionally one path segment.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::scrub::strip_links;
///
/// assert_eq!(
///     strip_links("Siehe www.example.at für mehr"),
///     "Siehe   für mehr"
/// );
/// assert_eq!(
///     strip_links("determined https://t.co/gocokspAv6 now"),
///     "determined   now"
/// );
/// ```
pub fn strip_links(text: &str) -> String {
    LINK_REGEX.replace_all(text, " ").into_owned()
}

/// Strip email-like tokens (`\S+@\S+`), each replaced by a single space.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::scrub::strip_emails;
///
/// assert_eq!(strip_emails("Kontakt presse@example.at bitte"), "Kontakt   bitte");
/// ```
pub fn strip_emails(text: &str) -> String {
    EMAIL_REGEX.replace_all(text, " ").into_owned()
}

/// Replace runs of "weird symbol" code points (arrows, math operators, box
/// drawing, block elements, geometric shapes, bullets) with a space.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::scrub::strip_symbol_ranges;
///
/// assert_eq!(strip_symbol_ranges("Re∙Cycle"), "Re Cycle");
/// assert_eq!(strip_symbol_ranges("links → rechts"), "links   rechts");
/// ```
pub fn strip_symbol_ranges(text: &str) -> String {
    SYMBOL_RANGE_REGEX.replace_all(text, " ").into_owned()
}

/// Replace runs of Cyrillic, CJK, Arabic and Hebrew script code points with
/// a single space per run.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::scrub::strip_foreign_scripts;
///
/// assert_eq!(strip_foreign_scripts("abcМОСКВАdef"), "abc def");
/// ```
pub fn strip_foreign_scripts(text: &str) -> String {
    FOREIGN_SCRIPT_REGEX.replace_all(text, " ").into_owned()
}

/// Replace currency glyphs with their German word: `€` becomes `Euro`,
/// `$` becomes `Dollar`. Literal substitution, not space-padded.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::scrub::replace_currency;
///
/// assert_eq!(replace_currency("99€"), "99Euro");
/// assert_eq!(replace_currency("$5"), "Dollar5");
/// ```
pub fn replace_currency(text: &str) -> String {
    text.replace('€', "Euro").replace('$', "Dollar")
}

/// Replace emoji runs with a space.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::scrub::strip_emojis;
///
/// assert_eq!(strip_emojis("Toll 🎉!"), "Toll  !");
/// ```
pub fn strip_emojis(text: &str) -> String {
    EMOJI_REGEX.replace_all(text, " ").into_owned()
}
