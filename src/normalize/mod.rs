//! The lexical normalizer: one raw text unit in, exactly one canonical
//! string out.
//!
//! The pipeline is an ordered sequence of pure string transforms. The order
//! is a contract, not an implementation detail: gender-marker detection must
//! precede punctuation stripping (it reads the `*`/`:` separators punctuation
//! would delete), currency substitution must precede lowercasing (so the
//! substituted words get lowercased too), and hyphenation repair must come
//! after punctuation (pad mode deliberately leaves the hyphen alone so the
//! short-compound evidence survives).
//!
//! Normalization is deterministic: the same input and options always yield
//! the same output, which is what makes the canonical string immutable under
//! its fingerprint.

pub mod hyphens;
pub mod markers;
pub mod numbers;
pub mod scrub;

use serde::{Deserialize, Serialize};

/// Normalization toggles, all independent booleans.
///
/// `replace_numbers` takes precedence over `remove_numbers` when both are
/// set: replacement is the information-preserving option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub lowercase: bool,
    pub remove_links: bool,
    pub remove_emails: bool,
    pub remove_emojis: bool,
    pub remove_punctuation: bool,
    pub remove_numbers: bool,
    pub replace_numbers: bool,
    pub remove_quotations: bool,
    /// Preserve gender-inclusive markers as underscore-joined tokens.
    pub genderstar: bool,
    /// Repair words glued together at a lowercase-to-uppercase boundary.
    pub repair_separation: bool,
}

impl NormalizeOptions {
    /// Options used to build the published training corpora: strip
    /// everything non-lexical, preserve gender markers.
    pub fn corpus_defaults() -> Self {
        Self {
            remove_links: true,
            remove_emails: true,
            remove_emojis: true,
            remove_punctuation: true,
            remove_quotations: true,
            genderstar: true,
            ..Self::default()
        }
    }
}

/// Turn one raw text unit into its canonical form.
///
/// Empty input yields an empty string immediately, before any regex work.
/// The transform is a projection: already-canonical text maps to itself.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::{normalize, NormalizeOptions};
///
/// let opts = NormalizeOptions {
///     remove_links: true,
///     ..Default::default()
/// };
/// assert_eq!(
///     normalize("Siehe www.example.at für mehr", &opts),
///     "Siehe für mehr"
/// );
/// ```
pub fn normalize(text: &str, opts: &NormalizeOptions) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = scrub::strip_html_fragments(text);
    out = scrub::replace_invisible_whitespace(&out);
    out = scrub::apply_nfkc(&out);
    if opts.remove_links {
        out = scrub::strip_links(&out);
    }
    if opts.remove_emails {
        out = scrub::strip_emails(&out);
    }
    out = scrub::strip_symbol_ranges(&out);
    out = scrub::strip_foreign_scripts(&out);
    out = scrub::replace_currency(&out);
    if opts.lowercase {
        out = out.to_lowercase();
    }
    if opts.genderstar {
        out = markers::preserve_gender_markers(&out);
    }
    if opts.remove_emojis {
        out = scrub::strip_emojis(&out);
    }
    if opts.remove_punctuation {
        out = markers::strip_punctuation(&out, opts.genderstar);
    } else {
        out = markers::pad_punctuation(&out, opts.genderstar);
    }
    if opts.remove_quotations {
        out = markers::strip_quotation_marks(&out);
    } else {
        out = markers::normalize_quotation_marks(&out);
    }
    if opts.replace_numbers {
        out = numbers::replace_digit_runs(&out);
    } else if opts.remove_numbers {
        out = numbers::strip_digit_runs(&out);
    }
    if opts.genderstar {
        out = markers::strip_stray_separators(&out);
    }
    out = hyphens::repair_hyphenation(&out);
    if opts.repair_separation && !opts.lowercase {
        out = hyphens::repair_separation(&out);
    }
    hyphens::collapse_whitespace(&out)
}
