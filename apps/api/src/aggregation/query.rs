//! Deterministic keyword preparation and cache-key derivation.

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::sources::location::sanitize_location;

/// Keywords handed to the sources for one recommendation run.
pub const MAX_SEARCH_KEYWORDS: usize = 12;
/// Keywords that participate in the cache key.
const CACHE_KEY_KEYWORDS: usize = 16;
const MAX_KEYWORD_TOKENS: usize = 4;

pub const DEFAULT_FALLBACK_KEYWORDS: &[&str] = &["software engineer", "developer", "intern"];

/// Whole-phrase keywords too generic to search for.
const GENERIC_KEYWORDS: &[&str] = &[
    "job",
    "jobs",
    "role",
    "roles",
    "fresher",
    "entry",
    "entry level",
    "full time",
    "part time",
    "work from home",
    "remote",
    "onsite",
    "hybrid",
    "intern",
    "internship",
    "company",
    "management",
    "question",
    "mapping",
    "creation",
];

/// Filler tokens dropped from inside a keyword phrase.
const TOKEN_STOP_WORDS: &[&str] = &[
    "and", "or", "with", "for", "the", "a", "an", "to", "in", "on", "of", "at", "by", "from",
    "user", "users", "based",
];

/// Tokens that mark a keyword as a mis-extracted resume fragment.
const RESUME_NOISE_TERMS: &[&str] = &[
    "implemented",
    "feedback",
    "rating",
    "mechanisms",
    "notifications",
    "authentication",
    "tokenbased",
    "laravel",
    "frontend",
    "typescript",
    "interactive",
    "responsive",
    "university",
    "bachelor",
    "technology",
    "batch",
    "cgpa",
    "board",
    "hsc",
    "ssc",
];

/// Lowercases, collapses whitespace, maps `_`/`-` to spaces and strips
/// everything except word characters, whitespace, `+`, `#` and `.`.
pub fn normalize_keyword(raw: &str) -> String {
    let lowered = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '+' | '#' | '.'))
        .collect();
    cleaned.trim().to_string()
}

/// Builds a stable, de-duplicated keyword list in first-seen order.
/// Falls back to `fallback` when no candidate survives filtering.
pub fn prepare_search_keywords<S: AsRef<str>>(
    keywords: &[S],
    fallback: &[&str],
    max_items: usize,
) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::new();

    for raw in keywords {
        if ordered.len() >= max_items {
            break;
        }
        let key = normalize_keyword(raw.as_ref());
        let length = key.chars().count();
        if !(2..=64).contains(&length) || key.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let tokens: Vec<&str> = key
            .split_whitespace()
            .filter(|token| !TOKEN_STOP_WORDS.contains(token))
            .collect();
        if tokens.is_empty() || tokens.len() > MAX_KEYWORD_TOKENS {
            continue;
        }
        if tokens.iter().any(|token| RESUME_NOISE_TERMS.contains(token)) {
            continue;
        }

        let phrase = tokens.join(" ");
        if GENERIC_KEYWORDS.contains(&phrase.as_str()) || ordered.contains(&phrase) {
            continue;
        }
        ordered.push(phrase);
    }

    if ordered.is_empty() {
        for raw in fallback {
            let key = normalize_keyword(raw);
            if !key.is_empty() && !ordered.contains(&key) {
                ordered.push(key);
            }
            if ordered.len() >= max_items {
                break;
            }
        }
    }

    ordered
}

/// A normalized query: prepared keywords plus a sanitized location.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub keywords: Vec<String>,
    pub location: String,
}

impl SearchQuery {
    pub fn new<S: AsRef<str>>(keywords: &[S], location: &str, default_location: &str) -> Self {
        Self {
            keywords: prepare_search_keywords(keywords, DEFAULT_FALLBACK_KEYWORDS, MAX_SEARCH_KEYWORDS),
            location: sanitize_location(location, default_location),
        }
    }

    /// Hex SHA-256 over the lowercased location and the first deduplicated keywords.
    pub fn cache_key(&self) -> String {
        let mut keywords: Vec<String> = Vec::new();
        for keyword in &self.keywords {
            let token = keyword.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
            if !token.is_empty() && !keywords.contains(&token) {
                keywords.push(token);
            }
        }
        keywords.truncate(CACHE_KEY_KEYWORDS);

        let payload = json!({
            "keywords": keywords,
            "location": self.location.to_lowercase(),
        });
        hex::encode(Sha256::digest(payload.to_string().as_bytes()))
    }
}
