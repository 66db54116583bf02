//! Hyphenation repair, word-boundary repair and final whitespace collapsing.
//!
//! German news text is dense with hyphenated compounds. A compound joining a
//! word of two or more letters to a suffix becomes two tokens (`EU-Beitritt`
//! → `EU Beitritt`), while single-letter prefixes keep their hyphen as part
//! of the word (`E-Mail`, `U-Ausschuss`). Everything else hyphen-shaped is
//! noise and gets stripped.

use regex::Regex;
use std::sync::LazyLock;

static COMPOUND_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w{2,})-(\w+)").unwrap());

static LEADING_HYPHEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)-+").unwrap());

static TRAILING_HYPHEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+(\s|$)").unwrap());

static ISOLATED_HYPHEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\W)-+(\W)").unwrap());

static START_HYPHEN_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-+").unwrap());

static AFTER_NONWORD_HYPHEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\W)-+").unwrap());

// Two or more lowercase letters directly followed by a capitalized lowercase
// continuation signals a missed word boundary. Acronym runs (attopFIT) do
// not match and stay glued.
static SEPARATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zäöüß]{2,})([A-ZÄÖÜ][a-zäöüß])").unwrap());

static LINE_BREAK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]").unwrap());

static WHITESPACE_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Run the fixed hyphenation-repair sequence.
///
/// Pass order: compound split, leading-hyphen strip, trailing-hyphen strip,
/// isolated-hyphen collapse, then the compound split twice more (chained
/// compounds like `BVT-U-Ausschuss` expose a new join each round), then a
/// catch-all for leftover hyphen runs at the string start or after a
/// non-word character.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::hyphens::repair_hyphenation;
///
/// assert_eq!(repair_hyphenation("EU-Beitritt und E-Mail"), "EU Beitritt und E-Mail");
/// assert_eq!(repair_hyphenation("BVT-U-Ausschuss"), "BVT U-Ausschuss");
/// assert_eq!(repair_hyphenation("Nord-Süd-Verbindung"), "Nord Süd Verbindung");
/// ```
pub fn repair_hyphenation(text: &str) -> String {
    let mut out = COMPOUND_REGEX.replace_all(text, "$1 $2").into_owned();
    out = LEADING_HYPHEN_REGEX.replace_all(&out, "$1").into_owned();
    out = TRAILING_HYPHEN_REGEX.replace_all(&out, "$1").into_owned();
    out = ISOLATED_HYPHEN_REGEX.replace_all(&out, "$1 $2").into_owned();
    out = COMPOUND_REGEX.replace_all(&out, "$1 $2").into_owned();
    out = COMPOUND_REGEX.replace_all(&out, "$1 $2").into_owned();
    out = START_HYPHEN_RUN_REGEX.replace_all(&out, "").into_owned();
    AFTER_NONWORD_HYPHEN_REGEX
        .replace_all(&out, "$1")
        .into_owned()
}

/// Insert a space at a lowercase-to-uppercase transition inside a word,
/// repairing text that lost a space between two words.
///
/// Only meaningful on mixed-case input; the caller skips this pass when the
/// text has been lowercased.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::hyphens::repair_separation;
///
/// assert_eq!(repair_separation("anAragon"), "an Aragon");
/// assert_eq!(repair_separation("berichtete,Wien"), "berichtete,Wien");
/// ```
pub fn repair_separation(text: &str) -> String {
    SEPARATION_REGEX.replace_all(text, "$1 $2").into_owned()
}

/// Collapse line breaks to spaces, collapse whitespace runs to a single
/// space, and trim.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::hyphens::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  ein\n\nWort   mehr "), "ein Wort mehr");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    let no_breaks = LINE_BREAK_REGEX.replace_all(text, " ");
    WHITESPACE_RUN_REGEX
        .replace_all(&no_breaks, " ")
        .trim()
        .to_string()
}
