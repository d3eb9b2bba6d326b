//! Text Normalizer — collapses whitespace and re-joins sentence-segmented
//! text into a canonical block suitable for prompting.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Produces the canonical text block for a raw extraction: whitespace
/// collapsed, sentence order preserved, single spaces between sentences.
///
/// Empty input returns an empty string, not an error — downstream stages
/// treat empty normalized text as insufficient content and skip scoring.
pub fn normalize(raw: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(raw.trim(), " ");
    if collapsed.is_empty() {
        return String::new();
    }
    split_sentences(&collapsed).join(" ")
}

/// Segments collapsed text into sentences on `.`, `!` or `?` followed by a
/// space and an uppercase letter or digit. Deliberately simple: resumes are
/// fragmentary, and the normalizer only has to preserve semantic order.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    for window in chars.windows(3) {
        let (i, c) = window[0];
        let (_, next) = window[1];
        let (j, after) = window[2];
        if matches!(c, '.' | '!' | '?')
            && next == ' '
            && (after.is_uppercase() || after.is_ascii_digit())
        {
            let sentence = text[start..=i].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = j;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}
