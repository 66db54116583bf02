//! Gender-inclusive marker preservation, punctuation and quotation handling.
//!
//! The marker pass must run before any punctuation pass: punctuation stripping
//! would otherwise delete the `*` and `:` separators this pass needs to read.

use regex::{Captures, Regex};
use std::sync::LazyLock;

// Stem, separator, then the inclusive plural suffix. The suffix is matched
// case-insensitively so markers survive a prior lowercasing pass.
static SEPARATOR_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)[*:_]([Ii]nnen\w*)").unwrap());

// Bare capitalized form without a separator: a stem ending in a lowercase
// letter directly followed by `Innen`. Only detectable on mixed-case input.
static BARE_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zäöüß])Innen(\w*)").unwrap());

static STRAY_SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*:]").unwrap());

static LEADING_UNDERSCORE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)_+").unwrap());

// The fasttext-style punctuation inventory. Both modes leave the ASCII
// hyphen to the hyphenation-repair stage, which needs the short-compound
// evidence intact.
static PUNCT_REMOVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[!"\#$%&'()*+,.…/:;<=>?@\[\\\]^_`{|–}∙—~]"#).unwrap()
});

static PUNCT_REMOVE_GENDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[!"\#$%&'()+,.…/;<=>?@\[\\\]^`{|–}∙—~]"#).unwrap()
});

static PUNCT_PAD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([!"\#$%&'()*+,.…/:;<=>?@\[\\\]^_`{|–}∙—~])"#).unwrap()
});

static PUNCT_PAD_GENDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([!"\#$%&'()+,.…/;<=>?@\[\\\]^`{|–}∙—~])"#).unwrap()
});

// Directional, CJK, angle and low-9 quotation glyphs. Fullwidth forms are
// already folded to their ASCII counterparts by the NFKC stage.
static QUOTATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(["“”«»„‹›❝❞〝〞〟‚‛‟〈〉《》「」『』【】〔〕〖〗〘〙〚〛<>])"#,
    )
    .unwrap()
});

/// Rewrite gender-inclusive plural markers with an underscore separator.
///
/// Handles the separator forms (`Demokrat*innen`, `Lehrer:innen`,
/// `Schüler_innen`) and the bare capitalized form (`LehrerInnen`). The suffix
/// is lowercased so all variants collapse to one token shape.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::markers::preserve_gender_markers;
///
/// assert_eq!(preserve_gender_markers("Demokrat*innen"), "Demokrat_innen");
/// assert_eq!(preserve_gender_markers("Lehrer:innen"), "Lehrer_innen");
/// assert_eq!(preserve_gender_markers("LehrerInnen"), "Lehrer_innen");
/// ```
pub fn preserve_gender_markers(text: &str) -> String {
    let rewritten = SEPARATOR_MARKER_REGEX.replace_all(text, |caps: &Captures| {
        format!("{}_{}", &caps[1], caps[2].to_lowercase())
    });
    BARE_MARKER_REGEX
        .replace_all(&rewritten, "${1}_innen${2}")
        .into_owned()
}

/// Delete punctuation characters, each replaced by a space. The ASCII hyphen
/// is never deleted here; its handling belongs to the hyphenation-repair
/// stage.
///
/// When `genderstar` is set the set excludes `*`, `:` and `_`, which the
/// marker pass has already claimed; leftovers are cleaned up separately by
/// [`strip_stray_separators`].
pub fn strip_punctuation(text: &str, genderstar: bool) -> String {
    let re = if genderstar {
        &PUNCT_REMOVE_GENDER_REGEX
    } else {
        &PUNCT_REMOVE_REGEX
    };
    re.replace_all(text, " ").into_owned()
}

/// Pad each punctuation character with surrounding spaces so it survives as
/// its own token. The ASCII hyphen is never padded here; its handling belongs
/// to the hyphenation-repair stage.
pub fn pad_punctuation(text: &str, genderstar: bool) -> String {
    let re = if genderstar {
        &PUNCT_PAD_GENDER_REGEX
    } else {
        &PUNCT_PAD_REGEX
    };
    re.replace_all(text, " $1 ").into_owned()
}

/// Delete every recognized quotation glyph, replaced by a space.
pub fn strip_quotation_marks(text: &str) -> String {
    QUOTATION_REGEX.replace_all(text, " ").into_owned()
}

/// Replace every recognized quotation glyph with a padded straight double
/// quote, normalizing all quote styles to one token.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::markers::normalize_quotation_marks;
///
/// assert_eq!(normalize_quotation_marks("„zitiert“"), " \" zitiert \" ");
/// ```
pub fn normalize_quotation_marks(text: &str) -> String {
    QUOTATION_REGEX.replace_all(text, " \" ").into_owned()
}

/// Remove stray `*`/`:` characters and word-initial underscore runs that were
/// not part of a recognized gender marker. Runs only in genderstar mode,
/// after punctuation handling.
pub fn strip_stray_separators(text: &str) -> String {
    let no_stars = STRAY_SEPARATOR_REGEX.replace_all(text, " ");
    LEADING_UNDERSCORE_REGEX
        .replace_all(&no_stars, "$1")
        .into_owned()
}
