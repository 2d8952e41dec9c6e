//! Location sanitization. Resume extraction frequently puts education or
//! project fragments into the location field; those must never reach a
//! scraping backend or a cache key.

pub const DEFAULT_LOCATION: &str = "India";

const MAX_LOCATION_CHARS: usize = 80;
const MAX_LOCATION_TOKENS: usize = 8;

/// Terms that never appear in a real place name but often leak in from resumes.
const LOCATION_NOISE_TERMS: &[&str] = &[
    "implemented",
    "feedback",
    "rating",
    "mechanism",
    "notification",
    "authentication",
    "laravel",
    "typescript",
    "university",
    "bachelor",
    "batch",
    "board",
    "cgpa",
    "hsc",
    "ssc",
    "skills",
    "project",
];

/// Returns a short, safe location string, or `default` when the input looks like noise.
pub fn sanitize_location(raw: &str, default: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = collapsed.trim_matches(|c: char| c == ' ' || c == ',' || c == ';');

    if cleaned.is_empty() || cleaned.chars().count() > MAX_LOCATION_CHARS {
        return default.to_string();
    }

    let lowered = cleaned.to_lowercase();
    if lowered.contains("http://") || lowered.contains("https://") {
        return default.to_string();
    }
    if LOCATION_NOISE_TERMS.iter().any(|term| lowered.contains(term)) {
        return default.to_string();
    }

    let token_count = lowered
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .count();
    if token_count > MAX_LOCATION_TOKENS {
        return default.to_string();
    }

    cleaned.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_location_passes_through_collapsed() {
        assert_eq!(
            sanitize_location("  Bengaluru,   Karnataka ", DEFAULT_LOCATION),
            "Bengaluru, Karnataka"
        );
    }

    #[test]
    fn test_trailing_separators_are_trimmed() {
        assert_eq!(sanitize_location("Pune;, ", DEFAULT_LOCATION), "Pune");
    }

    #[test]
    fn test_empty_location_uses_default() {
        assert_eq!(sanitize_location("   ", DEFAULT_LOCATION), "India");
        assert_eq!(sanitize_location(" ,; ", "Remote"), "Remote");
    }

    #[test]
    fn test_resume_fragment_is_rejected() {
        assert_eq!(
            sanitize_location("Mumbai University CGPA 8.9", DEFAULT_LOCATION),
            "India"
        );
        assert_eq!(
            sanitize_location("Implemented JWT authentication", DEFAULT_LOCATION),
            "India"
        );
    }

    #[test]
    fn test_token_dense_location_is_rejected() {
        let noisy = "a b c d e f g h i";
        assert_eq!(sanitize_location(noisy, DEFAULT_LOCATION), "India");
        assert_eq!(sanitize_location("a b c d e f g h", DEFAULT_LOCATION), "a b c d e f g h");
    }

    #[test]
    fn test_overlong_location_is_rejected() {
        let long = "x".repeat(81);
        assert_eq!(sanitize_location(&long, DEFAULT_LOCATION), "India");
    }

    #[test]
    fn test_url_is_rejected() {
        assert_eq!(
            sanitize_location("https://linkedin.com/in/someone", DEFAULT_LOCATION),
            "India"
        );
    }
}
