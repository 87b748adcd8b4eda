//! Restaurant name normalization.
//!
//! Produces a comparison key (lowercase, ASCII-folded, punctuation-free, with
//! borough/city noise and locational qualifiers removed) plus a cleaned-up
//! display name. Both functions are total: every input, including the empty
//! string, yields a value.

use crate::domain::model::NormalizedKey;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const NOISE_TOKENS: &[&str] = &[
    "the", "nyc", "ny", "manhattan", "brooklyn", "queens", "bronx",
];

/// Multi-word noise, longest first.
const NOISE_PHRASES: &[&[&str]] = &[
    &["new", "york", "city"],
    &["new", "york"],
    &["staten", "island"],
];

/// Anything after one of these is a neighborhood or branch qualifier.
const QUALIFIER_SEPARATORS: &[&str] = &[" \u{2014} ", " \u{2013} ", " - ", " | ", "\u{2014}", "\u{2013}"];

/// Leading list numbering ("12. ", "3)", "1.Kabawa"). Shared with the heading rules.
pub(crate) static LIST_NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*[.)]\s*").expect("valid numbering pattern"));

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid parenthetical pattern"));

/// Map a raw name to its comparison key.
pub fn normalize(raw_name: &str) -> NormalizedKey {
    let base = strip_qualifiers(raw_name);
    let tokens = tokenize(&base);
    let filtered = remove_noise(&tokens);

    // A name made only of noise ("Manhattan") keeps its tokens rather than vanishing.
    let kept = if filtered.is_empty() { tokens } else { filtered };
    NormalizedKey::new(kept.join(" "))
}

/// Human-readable name: numbering and locational qualifiers removed, spacing tidied.
pub fn display_name(raw_name: &str) -> String {
    let stripped = collapse_whitespace(&strip_qualifiers(raw_name));
    if stripped.is_empty() {
        collapse_whitespace(raw_name)
    } else {
        stripped
    }
}

/// Drop list numbering, then parentheticals, then the first qualifier suffix.
fn strip_qualifiers(raw_name: &str) -> String {
    let unnumbered = LIST_NUMBERING.replace(raw_name, "");
    let without_parens = PARENTHETICAL.replace_all(&unnumbered, " ");

    let cut = QUALIFIER_SEPARATORS
        .iter()
        .filter_map(|sep| without_parens.find(sep))
        .filter(|&idx| !without_parens[..idx].trim().is_empty())
        .min();

    match cut {
        Some(idx) => without_parens[..idx].to_string(),
        None => without_parens.into_owned(),
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !matches!(c, '\'' | '\u{2019}' | '\u{2018}'))
        .flat_map(|c| {
            let mapped = if c == '&' {
                " and ".to_string()
            } else if c.is_alphanumeric() {
                c.to_lowercase().collect()
            } else {
                " ".to_string()
            };
            mapped.chars().collect::<Vec<_>>()
        })
        .collect();

    folded.split_whitespace().map(str::to_string).collect()
}

fn remove_noise(tokens: &[String]) -> Vec<String> {
    let mut kept = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let phrase = NOISE_PHRASES.iter().find(|phrase| {
            tokens.len() - i >= phrase.len()
                && phrase.iter().zip(&tokens[i..]).all(|(p, t)| *p == t.as_str())
        });
        if let Some(phrase) = phrase {
            i += phrase.len();
            continue;
        }
        if !NOISE_TOKENS.contains(&tokens[i].as_str()) {
            kept.push(tokens[i].clone());
        }
        i += 1;
    }
    kept
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_qualifier_variants_share_a_key() {
        let plain = normalize("Carbone");
        assert_eq!(plain.as_str(), "carbone");
        assert_eq!(normalize("CARBONE \u{2014} Greenwich Village"), plain);
        assert_eq!(normalize("carbone"), plain);
        assert_eq!(normalize("Carbone NYC"), plain);
        assert_eq!(normalize("Carbone (Greenwich Village)"), plain);
    }

    #[test]
    fn test_is_referentially_transparent() {
        for raw in ["Le Bernardin", "", "  ", "Dhamaka \u{2014} LES", "\u{1F525}\u{1F525}"] {
            assert_eq!(normalize(raw), normalize(raw));
        }
    }

    #[test]
    fn test_empty_and_symbol_only_inputs_give_empty_key() {
        assert!(normalize("").is_empty());
        assert!(normalize("   ").is_empty());
        assert!(normalize("!!! \u{2014} ???").is_empty());
    }

    #[test]
    fn test_strips_diacritics_and_punctuation() {
        assert_eq!(normalize("Café Mogador").as_str(), "cafe mogador");
        assert_eq!(normalize("L'Artusi").as_str(), "lartusi");
        assert_eq!(normalize("Lucali\u{2019}s").as_str(), "lucalis");
        assert_eq!(normalize("Frenchette  Bakery!").as_str(), "frenchette bakery");
    }

    #[test]
    fn test_removes_city_and_borough_noise() {
        assert_eq!(normalize("The Four Horsemen Brooklyn").as_str(), "four horsemen");
        assert_eq!(normalize("Rezdôra New York City").as_str(), "rezdora");
        assert_eq!(normalize("Joe's Pizza, New York").as_str(), "joes pizza");
    }

    #[test]
    fn test_numbering_is_removed_but_numeric_names_survive() {
        assert_eq!(normalize("12. Via Carota").as_str(), "via carota");
        assert_eq!(normalize("4 Charles Prime Rib").as_str(), "4 charles prime rib");
    }

    #[test]
    fn test_unspaced_numbering_is_removed() {
        assert_eq!(normalize("1.Kabawa"), normalize("Kabawa"));
        assert_eq!(normalize("7)Tatiana"), normalize("Tatiana"));
        assert_eq!(display_name("1.Kabawa"), "Kabawa");
        assert_eq!(display_name("2 ) Dhamaka"), "Dhamaka");
    }

    #[test]
    fn test_noise_only_name_keeps_its_tokens() {
        assert_eq!(normalize("Manhattan").as_str(), "manhattan");
    }

    #[test]
    fn test_ampersand_reads_as_and() {
        assert_eq!(normalize("Sushi & Co"), normalize("Sushi and Co"));
    }

    #[test]
    fn test_display_name_keeps_casing() {
        assert_eq!(display_name("3. Carbone \u{2014} Greenwich Village"), "Carbone");
        assert_eq!(display_name("  Kabawa   "), "Kabawa");
        assert_eq!(display_name("\u{2014} Soho"), "\u{2014} Soho");
        assert_eq!(display_name(""), "");
    }
}
