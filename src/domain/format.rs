//! Formatting rules applied to rendered names and tag values

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Words kept lowercase by [`word_case`] unless they open the text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LowercaseWords(HashSet<String>);

impl LowercaseWords {
    /// Parses a comma separated list such as `a,and,the`
    pub fn from_list(list: &str) -> Self {
        Self(
            list.split(',')
                .map(|word| word.trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(&word.to_lowercase())
    }
}

/// Keeps the lowest-order `width` digits of `value` and left-pads them with zeros.
///
/// A width of zero means "no padding" and returns `value` untouched.
pub fn zero_pad(value: &str, width: usize) -> String {
    if width == 0 {
        return value.to_string();
    }

    let len = value.chars().count();
    let tail: String = value.chars().skip(len.saturating_sub(width)).collect();
    format!("{tail:0>width$}")
}

/// Capitalizes every word of `text`, except words listed in `lowercase`,
/// which are forced lowercase. The first word is always capitalized.
pub fn word_case(text: &str, lowercase: &LowercaseWords) -> String {
    WHITESPACE
        .split(text)
        .enumerate()
        .map(|(i, word)| {
            if i > 0 && lowercase.contains(word) {
                word.to_lowercase()
            } else {
                upper_first(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> LowercaseWords {
        LowercaseWords::from_list("a,and,but,for,in,of,on,the,to")
    }

    #[test]
    fn zero_pad_fills_to_width() {
        assert_eq!(zero_pad("7", 2), "07");
        assert_eq!(zero_pad("12", 2), "12");
        assert_eq!(zero_pad("", 2), "00");
        assert_eq!(zero_pad("1994", 4), "1994");
    }

    #[test]
    fn zero_pad_keeps_lowest_order_digits() {
        assert_eq!(zero_pad("1994", 2), "94");
        assert_eq!(zero_pad("123", 1), "3");
    }

    #[test]
    fn zero_pad_without_width_is_identity() {
        assert_eq!(zero_pad("7", 0), "7");
        assert_eq!(zero_pad("", 0), "");
    }

    #[test]
    fn zero_pad_length_matches_width() {
        for value in ["", "1", "42", "123", "98765"] {
            for width in 1..6 {
                assert_eq!(zero_pad(value, width).len(), width, "{value} / {width}");
            }
        }
    }

    #[test]
    fn word_case_capitalizes_words() {
        assert_eq!(
            word_case("revolted masses", &defaults()),
            "Revolted Masses"
        );
    }

    #[test]
    fn word_case_lowercases_listed_words() {
        assert_eq!(
            word_case("LORD OF THE RINGS", &defaults()),
            "LORD of the RINGS"
        );
        assert_eq!(
            word_case("war and peace", &defaults()),
            "War and Peace"
        );
    }

    #[test]
    fn word_case_always_capitalizes_first_word() {
        assert_eq!(word_case("the end", &defaults()), "The End");
        assert_eq!(word_case("a", &defaults()), "A");
    }

    #[test]
    fn word_case_collapses_whitespace() {
        assert_eq!(word_case("in  the\tmood", &defaults()), "In the Mood");
    }

    #[test]
    fn word_case_handles_empty_input() {
        assert_eq!(word_case("", &defaults()), "");
        assert_eq!(word_case("", &LowercaseWords::default()), "");
    }

    #[test]
    fn word_case_is_idempotent() {
        let lowercase = defaults();
        for text in [
            "the lord of the rings",
            "ÉCOLE in THE sky",
            "  leading space",
            "01 intro",
            "",
        ] {
            let once = word_case(text, &lowercase);
            assert_eq!(word_case(&once, &lowercase), once, "{text:?}");
        }
    }

    #[test]
    fn lowercase_list_ignores_blanks_and_case() {
        let words = LowercaseWords::from_list(" The, ,OF ");
        assert!(words.contains("the"));
        assert!(words.contains("Of"));
        assert!(!words.contains(""));
    }
}
