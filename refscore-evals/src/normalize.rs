//! Text normalization for lexical comparison.

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_\s]").expect("valid punctuation pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Canonicalize text: lowercase, drop everything that is neither a word
/// character nor whitespace, collapse whitespace runs to one space, trim.
///
/// Kept characters are letters and numbers of any script plus `_`, so
/// accented letters, `₂` and `⁸` survive. Combining marks are dropped.
///
/// # Examples
///
/// ```
/// use refscore_evals::normalize;
///
/// assert_eq!(normalize("  The Capital,   of FRANCE! "), "the capital of france");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}
