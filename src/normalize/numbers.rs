//! Digit-run handling: removal, or replacement with German number words.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static DIGIT_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

const ONES: [&str; 20] = [
    "null", "eins", "zwei", "drei", "vier", "fünf", "sechs", "sieben", "acht", "neun", "zehn",
    "elf", "zwölf", "dreizehn", "vierzehn", "fünfzehn", "sechzehn", "siebzehn", "achtzehn",
    "neunzehn",
];

const TENS: [&str; 10] = [
    "", "", "zwanzig", "dreißig", "vierzig", "fünfzig", "sechzig", "siebzig", "achtzig",
    "neunzig",
];

// Large scales are separate (capitalized) words in German, with singular and
// plural forms. Everything below a million is one compound word.
const SCALES: [(u64, &str, &str); 5] = [
    (1_000_000_000_000_000_000, "Trillion", "Trillionen"),
    (1_000_000_000_000_000, "Billiarde", "Billiarden"),
    (1_000_000_000_000, "Billion", "Billionen"),
    (1_000_000_000, "Milliarde", "Milliarden"),
    (1_000_000, "Million", "Millionen"),
];

// "eins" only in the absolute final position; "ein" inside compounds
// (einundzwanzig, einhundert, eintausend).
fn under_thousand(n: u64, is_final: bool) -> String {
    debug_assert!(n > 0 && n < 1000);
    let mut out = String::new();
    let hundreds = n / 100;
    let rest = n % 100;
    if hundreds > 0 {
        out.push_str(if hundreds == 1 { "ein" } else { ONES[hundreds as usize] });
        out.push_str("hundert");
    }
    if rest == 0 {
        return out;
    }
    if rest < 20 {
        out.push_str(if rest == 1 {
            if is_final {
                "eins"
            } else {
                "ein"
            }
        } else {
            ONES[rest as usize]
        });
    } else {
        let unit = rest % 10;
        if unit > 0 {
            out.push_str(if unit == 1 { "ein" } else { ONES[unit as usize] });
            out.push_str("und");
        }
        out.push_str(TENS[(rest / 10) as usize]);
    }
    out
}

fn under_million(n: u64, is_final: bool) -> String {
    debug_assert!(n > 0 && n < 1_000_000);
    let mut out = String::new();
    let thousands = n / 1000;
    let rest = n % 1000;
    if thousands > 0 {
        out.push_str(&under_thousand(thousands, false));
        out.push_str("tausend");
    }
    if rest > 0 {
        out.push_str(&under_thousand(rest, is_final));
    }
    out
}

/// Convert a number to its German word form.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::numbers::german_number_words;
///
/// assert_eq!(german_number_words(1), "eins");
/// assert_eq!(german_number_words(21), "einundzwanzig");
/// assert_eq!(german_number_words(1234), "eintausendzweihundertvierunddreißig");
/// ```
pub fn german_number_words(n: u64) -> String {
    if n == 0 {
        return "null".to_string();
    }
    let mut remainder = n;
    let mut parts: Vec<String> = Vec::new();
    for (value, singular, plural) in SCALES {
        let quotient = remainder / value;
        if quotient > 0 {
            if quotient == 1 {
                parts.push(format!("eine {singular}"));
            } else {
                parts.push(format!("{} {plural}", under_million(quotient, false)));
            }
            remainder %= value;
        }
    }
    if remainder > 0 {
        parts.push(under_million(remainder, true));
    }
    parts.join(" ")
}

/// Replace each maximal digit run with its German word form.
///
/// Runs too long to fit a `u64` are converted digit by digit, space-joined,
/// which keeps the transform deterministic and bounded.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::numbers::replace_digit_runs;
///
/// assert_eq!(replace_digit_runs("vom 1-m-Brett"), "vom eins-m-Brett");
/// assert_eq!(replace_digit_runs("Kapitel 42"), "Kapitel zweiundvierzig");
/// ```
pub fn replace_digit_runs(text: &str) -> String {
    DIGIT_RUN_REGEX
        .replace_all(text, |caps: &Captures| {
            let run = &caps[0];
            match run.parse::<u64>() {
                Ok(n) => german_number_words(n),
                Err(_) => run
                    .chars()
                    .map(|d| ONES[d.to_digit(10).unwrap_or(0) as usize])
                    .collect::<Vec<_>>()
                    .join(" "),
            }
        })
        .into_owned()
}

/// Delete each maximal digit run, replaced by a space.
///
/// # Examples
///
/// ```
/// use siebwerk::normalize::numbers::strip_digit_runs;
///
/// assert_eq!(strip_digit_runs("Tel. 0463/435"), "Tel.  / ");
/// ```
pub fn strip_digit_runs(text: &str) -> String {
    DIGIT_RUN_REGEX.replace_all(text, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_numbers() {
        assert_eq!(german_number_words(0), "null");
        assert_eq!(german_number_words(7), "sieben");
        assert_eq!(german_number_words(11), "elf");
        assert_eq!(german_number_words(16), "sechzehn");
        assert_eq!(german_number_words(20), "zwanzig");
        assert_eq!(german_number_words(31), "einunddreißig");
        assert_eq!(german_number_words(99), "neunundneunzig");
    }

    #[test]
    fn test_hundreds_and_thousands() {
        assert_eq!(german_number_words(100), "einhundert");
        assert_eq!(german_number_words(101), "einhunderteins");
        assert_eq!(german_number_words(215), "zweihundertfünfzehn");
        assert_eq!(german_number_words(1000), "eintausend");
        assert_eq!(german_number_words(2023), "zweitausenddreiundzwanzig");
        assert_eq!(
            german_number_words(1001),
            "eintausendeins"
        );
        assert_eq!(
            german_number_words(21_000),
            "einundzwanzigtausend"
        );
    }

    #[test]
    fn test_large_scales() {
        assert_eq!(german_number_words(1_000_000), "eine Million");
        assert_eq!(
            german_number_words(3_500_000),
            "drei Millionen fünfhunderttausend"
        );
        assert_eq!(german_number_words(1_000_000_000), "eine Milliarde");
        assert_eq!(
            german_number_words(2_000_000_001),
            "zwei Milliarden eins"
        );
    }

    #[test]
    fn test_final_eins_vs_compound_ein() {
        assert_eq!(german_number_words(1), "eins");
        assert_eq!(german_number_words(21), "einundzwanzig");
        assert_eq!(german_number_words(100_001), "einhunderttausendeins");
    }

    #[test]
    fn test_replace_runs_inline() {
        assert_eq!(replace_digit_runs("99Euro"), "neunundneunzigEuro");
        assert_eq!(replace_digit_runs("ohne Ziffern"), "ohne Ziffern");
    }

    #[test]
    fn test_overflow_run_digit_by_digit() {
        let run = "99999999999999999999"; // > u64::MAX
        let converted = replace_digit_runs(run);
        assert_eq!(converted.split(' ').count(), 20);
        assert!(converted.split(' ').all(|w| w == "neun"));
    }

    #[test]
    fn test_strip_runs() {
        assert_eq!(strip_digit_runs("0 42 82/20 43"), "     /   ");
        assert_eq!(strip_digit_runs("keine"), "keine");
    }
}
