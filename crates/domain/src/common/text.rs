//! Text and score utilities shared by the validators and the comparator.

use std::collections::BTreeSet;

/// Words that carry no signal for overlap measures.
const STOPWORDS: &[&str] = &[
    "about", "after", "against", "also", "been", "before", "being", "between", "could", "does",
    "each", "from", "have", "into", "more", "most", "only", "other", "over", "some", "than",
    "that", "their", "them", "then", "there", "these", "they", "this", "those", "through",
    "under", "until", "very", "were", "what", "when", "where", "which", "while", "will", "with",
    "would", "your",
];

/// Clamp a score into `[0, 1]`. NaN collapses to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Lowercased content words of at least four letters.
///
/// # Examples
///
/// ```
/// use branchwright_domain::common::tokenize;
///
/// let words = tokenize("The Queen's betrayal shatters the alliance.");
/// assert!(words.contains("betrayal"));
/// assert!(words.contains("alliance"));
/// assert!(!words.contains("the"));
/// ```
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .map(|w| w.strip_suffix("'s").map(str::to_string).unwrap_or(w))
        .filter(|w| w.chars().count() >= 4 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Jaccard overlap of two sets. Two empty sets are identical.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

/// Jaccard overlap of two lists of labels, compared case-insensitively.
pub fn label_overlap(a: &[String], b: &[String]) -> f64 {
    let left: BTreeSet<String> = a.iter().map(|s| s.trim().to_lowercase()).collect();
    let right: BTreeSet<String> = b.iter().map(|s| s.trim().to_lowercase()).collect();
    jaccard(&left, &right)
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Sentences of `text`, split on terminal punctuation, trimmed, non-empty.
pub fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Case-insensitive containment check.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(1.4), 1.0);
        assert_eq!(clamp_score(-0.2), 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(0.42), 0.42);
    }

    #[test]
    fn test_jaccard_of_empty_sets_is_one() {
        let empty: BTreeSet<String> = BTreeSet::new();
        assert_eq!(jaccard(&empty, &empty), 1.0);
    }

    #[test]
    fn test_jaccard_is_symmetric() {
        let a = tokenize("crown falls to the rebel army");
        let b = tokenize("rebel army seizes the crown and the treasury");
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
        assert!(jaccard(&a, &b) > 0.0);
    }

    #[test]
    fn test_label_overlap_ignores_case() {
        let a = vec!["Trust".to_string(), "Loyalty".to_string()];
        let b = vec!["trust".to_string()];
        assert_eq!(label_overlap(&a, &b), 0.5);
    }

    #[test]
    fn test_sentences_split() {
        let parts: Vec<_> = sentences("One. Two!  Three?").collect();
        assert_eq!(parts, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[0.5, 1.0]), Some(0.75));
    }
}
