//! Sentence splitting for the raw-sentence dedup layer.
//!
//! The splitter runs over uncleaned article text, so its boundaries are the
//! ones the raw-sentence table preserves. It is a trait so a model-backed
//! splitter can be swapped in; the default is rule-based: a terminator
//! followed by an uppercase-initial word ends a sentence, unless the word in
//! front of the terminator is a known German abbreviation, a single-letter
//! initial, or an ordinal number. Newlines are hard boundaries.

use regex::Regex;
use std::sync::LazyLock;

/// Language-aware sentence boundary detection over one text field.
pub trait SentenceSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<String>;
}

// Abbreviations common in Austrian/German news text. Matched against the
// word directly in front of a period, without the period itself.
static ABBREVIATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:Abs|Art|Bez|Bsp|bspw|bzw|ca|Dipl|Dr|etc|evtl|Fr|geb|gest|ggf|Hr|Ing|inkl|Jh|Mag|Mio|Mrd|Nr|Prof|rd|sog|St|Str|Tel|usw|vgl|zB)$",
    )
    .unwrap()
});

const TERMINATORS: [char; 3] = ['.', '!', '?'];
const TRAILING_QUOTES: [char; 5] = ['"', '“', '”', '«', '»'];

/// Rule-based default splitter.
#[derive(Debug, Default)]
pub struct RuleSplitter;

impl RuleSplitter {
    pub fn new() -> Self {
        Self
    }

    // Word in front of the terminator, used to suppress false boundaries.
    fn suppresses_boundary(sentence_so_far: &str) -> bool {
        let trimmed = sentence_so_far
            .trim_end_matches(|c: char| TERMINATORS.contains(&c) || TRAILING_QUOTES.contains(&c));
        let Some(word) = trimmed.split_whitespace().next_back() else {
            return true;
        };
        // Ordinals: "am 3. Oktober", "am 24. Dezember".
        if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
        let mut chars = word.chars();
        let first = chars.next();
        // Single-letter initials such as "J." in names.
        if chars.next().is_none() {
            return first.is_some_and(|c| c.is_alphabetic());
        }
        ABBREVIATION_REGEX.is_match(word)
    }
}

impl SentenceSplitter for RuleSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut i = 0;

        let mut flush = |current: &mut String, sentences: &mut Vec<String>| {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        };

        while i < chars.len() {
            let c = chars[i];
            if c == '\n' {
                flush(&mut current, &mut sentences);
                i += 1;
                continue;
            }
            current.push(c);
            if TERMINATORS.contains(&c) {
                // Pull trailing terminators and closing quotes into this
                // sentence ("...", "?!", "Zitat.").
                let mut j = i + 1;
                while j < chars.len()
                    && (TERMINATORS.contains(&chars[j]) || TRAILING_QUOTES.contains(&chars[j]))
                {
                    current.push(chars[j]);
                    j += 1;
                }
                let mut k = j;
                while k < chars.len() && chars[k] == ' ' {
                    k += 1;
                }
                let at_end = k >= chars.len();
                let next_is_upper = !at_end && chars[k].is_uppercase();
                let boundary = if at_end {
                    true
                } else if next_is_upper {
                    c != '.' || !Self::suppresses_boundary(&current)
                } else {
                    false
                };
                if boundary {
                    flush(&mut current, &mut sentences);
                }
                i = j;
                continue;
            }
            i += 1;
        }
        flush(&mut current, &mut sentences);
        sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<String> {
        RuleSplitter::new().split(text)
    }

    #[test]
    fn test_basic_boundaries() {
        assert_eq!(
            split("Der Rat tagte. Die Entscheidung fiel am Abend."),
            vec![
                "Der Rat tagte.".to_string(),
                "Die Entscheidung fiel am Abend.".to_string(),
            ]
        );
    }

    #[test]
    fn test_exclamation_and_question() {
        assert_eq!(
            split("Wirklich? Ja! Ganz sicher."),
            vec!["Wirklich?", "Ja!", "Ganz sicher."]
        );
    }

    #[test]
    fn test_abbreviation_suppresses_boundary() {
        assert_eq!(
            split("Laut Dr. Maier ist alles offen."),
            vec!["Laut Dr. Maier ist alles offen."]
        );
        assert_eq!(
            split("Es kamen ca. Tausend Besucher."),
            vec!["Es kamen ca. Tausend Besucher."]
        );
    }

    #[test]
    fn test_single_letter_initial() {
        assert_eq!(
            split("Der Autor J. Roth schrieb weiter."),
            vec!["Der Autor J. Roth schrieb weiter."]
        );
    }

    #[test]
    fn test_ordinal_suppresses_boundary() {
        assert_eq!(
            split("Am 3. Oktober beginnt der Herbst. Danach wird es kalt."),
            vec![
                "Am 3. Oktober beginnt der Herbst.".to_string(),
                "Danach wird es kalt.".to_string(),
            ]
        );
        assert_eq!(
            split("Am 24. Dezember ist Heiligabend."),
            vec!["Am 24. Dezember ist Heiligabend."]
        );
    }

    #[test]
    fn test_lowercase_continuation_is_no_boundary() {
        assert_eq!(
            split("Das Werk wurde ca. 1890 errichtet und steht noch."),
            vec!["Das Werk wurde ca. 1890 errichtet und steht noch."]
        );
    }

    #[test]
    fn test_newline_is_hard_boundary() {
        assert_eq!(
            split("Erster Teil ohne Punkt\nzweiter Teil"),
            vec!["Erster Teil ohne Punkt", "zweiter Teil"]
        );
    }

    #[test]
    fn test_trailing_quote_stays_attached() {
        assert_eq!(
            split("Er sagte: „Genug.“ Dann ging er."),
            vec!["Er sagte: „Genug.“", "Dann ging er."]
        );
    }

    #[test]
    fn test_ellipsis_consumed_as_one_terminator_run() {
        assert_eq!(
            split("Er zögerte... Dann sprang er."),
            vec!["Er zögerte...", "Dann sprang er."]
        );
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(split("").is_empty());
        assert!(split("  \n ").is_empty());
    }
}
