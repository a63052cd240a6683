//! Lexical correctness metrics.
//!
//! All functions here are pure and deterministic; each returns a score in
//! `[0, 1]`.

use crate::normalize::normalize;
use std::collections::HashSet;

/// Words ignored when deriving keywords from a reference.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Derived keywords must be longer than this many characters.
const MIN_KEYWORD_CHARS: usize = 2;

/// 1.0 if prediction and reference match, else 0.0.
///
/// With `normalize` the comparison runs on [`normalize`]d text; without it
/// only surrounding whitespace is ignored.
pub fn exact_match(prediction: &str, reference: &str, normalize_text: bool) -> f64 {
    let matches = if normalize_text {
        normalize(prediction) == normalize(reference)
    } else {
        prediction.trim() == reference.trim()
    };

    if matches {
        1.0
    } else {
        0.0
    }
}

/// Edit-distance similarity of the normalized texts, thresholded to 0.0/1.0.
///
/// `similarity = 1 - levenshtein / max(len)` with lengths in characters. An
/// empty normalized reference scores 1.0 only against an empty normalized
/// prediction, regardless of `threshold`.
pub fn fuzzy_match(prediction: &str, reference: &str, threshold: f64) -> f64 {
    let pred_norm = normalize(prediction);
    let ref_norm = normalize(reference);

    if ref_norm.is_empty() {
        return if pred_norm.is_empty() { 1.0 } else { 0.0 };
    }

    if fuzzy_similarity(&pred_norm, &ref_norm) >= threshold {
        1.0
    } else {
        0.0
    }
}

/// Unthresholded similarity used by [`fuzzy_match`]; inputs are compared as-is.
pub fn fuzzy_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Fraction of keywords found in the lowercased prediction.
///
/// When `required_keywords` is `None` the keywords are derived from the
/// reference with [`extract_keywords`]. An empty keyword list is vacuously
/// satisfied (1.0).
///
/// Matching is substring containment, not token equality: the keyword `art`
/// is found inside `start`.
pub fn keyword_match(
    prediction: &str,
    reference: &str,
    required_keywords: Option<&[String]>,
) -> f64 {
    let derived;
    let keywords: &[String] = match required_keywords {
        Some(keywords) => keywords,
        None => {
            derived = extract_keywords(reference);
            &derived
        }
    };

    if keywords.is_empty() {
        return 1.0;
    }

    let pred_lower = prediction.to_lowercase();
    let matches = keywords
        .iter()
        .filter(|keyword| pred_lower.contains(keyword.as_str()))
        .count();

    matches as f64 / keywords.len() as f64
}

/// Unique lowercase whitespace tokens of `reference` that are not stop words
/// and are longer than two characters, in first-seen order.
///
/// Punctuation is not stripped, so `france.` stays `france.`.
pub fn extract_keywords(reference: &str) -> Vec<String> {
    let lowered = reference.to_lowercase();
    let mut seen = HashSet::new();

    lowered
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .filter(|word| word.chars().count() > MIN_KEYWORD_CHARS)
        .filter(|word| seen.insert(*word))
        .map(str::to_string)
        .collect()
}

/// Levenshtein distance over Unicode scalar values with unit costs.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[rstest]
    #[case("", "", 0)]
    #[case("abc", "", 3)]
    #[case("", "abc", 3)]
    #[case("kitten", "sitting", 3)]
    #[case("flaw", "lawn", 2)]
    #[case("same", "same", 0)]
    #[case("h₂o", "h2o", 1)]
    #[case("naïve", "naive", 1)]
    fn test_levenshtein(#[case] a: &str, #[case] b: &str, #[case] expected: usize) {
        assert_eq!(levenshtein(a, b), expected);
        assert_eq!(levenshtein(b, a), expected);
    }

    #[rstest]
    #[case("Paris", "paris", true, 1.0)]
    #[case("Paris", "paris", false, 0.0)]
    #[case("  Paris ", "Paris", false, 1.0)]
    #[case("The capital is Paris.", "the capital is paris", true, 1.0)]
    #[case("Paris", "London", true, 0.0)]
    #[case("H₂O", "HO", true, 0.0)]
    #[case("H₂O", "h₂o", true, 1.0)]
    fn test_exact_match(
        #[case] prediction: &str,
        #[case] reference: &str,
        #[case] normalize_text: bool,
        #[case] expected: f64,
    ) {
        assert_eq!(exact_match(prediction, reference, normalize_text), expected);
    }

    #[rstest]
    #[case("")]
    #[case("anything at all")]
    #[case("  MiXeD, punctuation!  ")]
    fn test_exact_match_reflexive(#[case] text: &str) {
        assert_eq!(exact_match(text, text, true), 1.0);
    }

    #[test]
    fn test_fuzzy_match_threshold() {
        // "kitten" vs "sitting": d = 3, max len 7, similarity = 4/7 ~ 0.571
        assert_eq!(fuzzy_match("kitten", "sitting", 0.5), 1.0);
        assert_eq!(fuzzy_match("kitten", "sitting", 0.6), 0.0);
    }

    #[test]
    fn test_fuzzy_match_normalizes_first() {
        assert_eq!(fuzzy_match("HELLO, World!", "hello world", 1.0), 1.0);
    }

    #[test]
    fn test_fuzzy_similarity_boundary_is_inclusive() {
        // d = 1 over 4 chars -> exactly 0.75
        assert_eq!(fuzzy_match("abcd", "abce", 0.75), 1.0);
    }

    #[rstest]
    #[case("", 0.0, 1.0)]
    #[case("...", 0.7, 1.0)]
    #[case("x", 0.0, 0.0)]
    #[case("something", 0.7, 0.0)]
    fn test_fuzzy_match_empty_reference(
        #[case] prediction: &str,
        #[case] threshold: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(fuzzy_match(prediction, "", threshold), expected);
        assert_eq!(fuzzy_match(prediction, "?!", threshold), expected);
    }

    #[test]
    fn test_extract_keywords() {
        let keywords = extract_keywords("The Moon is composed of rock and the dust");
        assert_eq!(keywords, kw(&["moon", "composed", "rock", "dust"]));
    }

    #[test]
    fn test_extract_keywords_keeps_punctuation() {
        assert_eq!(extract_keywords("Paris, France."), kw(&["paris,", "france."]));
    }

    #[test]
    fn test_keyword_match_derived() {
        // keywords: paris, capital, france.
        let score = keyword_match(
            "The capital of France is Paris",
            "Paris is the capital of France.",
            None,
        );
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_keyword_match_supplied() {
        let keywords = kw(&["paris", "london"]);
        assert_eq!(keyword_match("Paris!", "unused", Some(&keywords)), 0.5);
    }

    #[rstest]
    #[case("anything", "whatever reference")]
    #[case("", "")]
    fn test_keyword_match_explicit_empty_list(#[case] prediction: &str, #[case] reference: &str) {
        assert_eq!(keyword_match(prediction, reference, Some(&[])), 1.0);
    }

    #[test]
    fn test_keyword_match_no_derivable_keywords() {
        assert_eq!(keyword_match("xyz", "it is of the", None), 1.0);
    }

    #[test]
    fn test_keyword_match_substring_quirk() {
        // Known lexical-boundary quirk: containment, not token equality.
        let keywords = kw(&["art"]);
        assert_eq!(keyword_match("we start now", "", Some(&keywords)), 1.0);
    }
}
