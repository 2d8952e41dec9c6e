//! TF-IDF cosine similarity between a resume and a listing.
//!
//! Mirrors the usual vectorizer defaults: tokens of two or more word
//! characters, English stop words removed, smooth IDF, L2-normalised rows,
//! vocabulary limited to the most frequent terms across both documents.

use std::collections::{BTreeMap, HashMap};

const MAX_FEATURES: usize = 100;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "could", "did", "do", "does", "doing", "down", "during", "each", "etc", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how",
    "ie", "if", "in", "into", "is", "it", "its", "itself", "me", "more", "most", "must", "my",
    "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out",
    "over", "own", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
    "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "within", "would", "you",
    "your", "yours",
];

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2 && !ENGLISH_STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

fn term_counts(tokens: &[String]) -> HashMap<&str, f64> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine similarity of the two texts' TF-IDF vectors, on a 0–100 scale.
/// Either text being blank (or all stop words) yields 0.
pub fn cosine_similarity(left: &str, right: &str) -> f64 {
    let left_tokens = tokenize(left);
    let right_tokens = tokenize(right);
    if left_tokens.is_empty() || right_tokens.is_empty() {
        return 0.0;
    }
    let left_counts = term_counts(&left_tokens);
    let right_counts = term_counts(&right_tokens);

    // Corpus frequency per term; BTreeMap keeps ties in alphabetical order.
    let mut corpus: BTreeMap<&str, f64> = BTreeMap::new();
    for (term, count) in left_counts.iter().chain(right_counts.iter()) {
        *corpus.entry(*term).or_insert(0.0) += count;
    }
    let mut vocabulary: Vec<(&str, f64)> = corpus.into_iter().collect();
    vocabulary.sort_by(|a, b| b.1.total_cmp(&a.1));
    vocabulary.truncate(MAX_FEATURES);

    let documents = 2.0_f64;
    let weights: Vec<(f64, f64)> = vocabulary
        .iter()
        .map(|(term, _)| {
            let l = left_counts.get(term).copied().unwrap_or(0.0);
            let r = right_counts.get(term).copied().unwrap_or(0.0);
            let df = f64::from(u8::from(l > 0.0) + u8::from(r > 0.0));
            let idf = ((1.0 + documents) / (1.0 + df)).ln() + 1.0;
            (l * idf, r * idf)
        })
        .collect();

    let dot: f64 = weights.iter().map(|(l, r)| l * r).sum();
    let left_norm: f64 = weights.iter().map(|(l, _)| l * l).sum::<f64>().sqrt();
    let right_norm: f64 = weights.iter().map(|(_, r)| r * r).sum::<f64>().sqrt();
    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    (dot / (left_norm * right_norm) * 100.0).clamp(0.0, 100.0)
}
