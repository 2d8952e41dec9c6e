//! URL recovery for scraped records.
//!
//! Actors disagree on where they put the posting link: a dozen top-level field
//! names, nested metadata objects, lists of links, HTML-escaped query strings,
//! scheme-relative or bare-domain forms. Everything here converges on one rule:
//! a listing leaves the adapter with an absolute HTTP(S) URL, synthesized from
//! the platform's search page when nothing usable was scraped.

use serde_json::{Map, Value};

use crate::models::Platform;
use crate::sources::location::DEFAULT_LOCATION;

/// Keys searched inside a nested link object (`{"url": ...}`, `{"href": ...}`).
const NESTED_LINK_KEYS: &[&str] = &["url", "link", "href", "applyUrl", "jobUrl", "application_url"];

/// Metadata containers some actors use to wrap the posting link.
const NESTED_METADATA_KEYS: &[&str] = &["job", "jobData", "meta", "metadata", "details"];

/// Normalizes URL-like text to an absolute HTTP(S) URL.
pub fn normalize_url_text(raw: &str) -> Option<String> {
    let unescaped = unescape_html(raw.trim());
    // Multiply-escaped ampersands survive one decoding pass in some actor outputs.
    let mut repaired = unescaped.replace("?amp;", "?");
    while repaired.contains("&amp;") {
        repaired = repaired.replace("&amp;", "&");
    }
    let text = repaired.trim();
    if text.is_empty() {
        return None;
    }

    let lower = text.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(text.to_string())
    } else if text.starts_with("//") {
        Some(format!("https:{text}"))
    } else if lower.starts_with("www.") {
        Some(format!("https://{text}"))
    } else {
        None
    }
}

/// Normalizes a JSON value that may be a string, a link object, or a list of either.
pub fn normalize_url_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => normalize_url_text(s),
        Value::Object(map) => NESTED_LINK_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(normalize_url_value),
        Value::Array(items) => items.iter().find_map(normalize_url_value),
        _ => None,
    }
}

/// Searches a raw record for a usable link: candidate keys in priority order,
/// platform-relative paths, then nested metadata objects.
pub fn extract_item_url(
    item: &Map<String, Value>,
    candidate_keys: &[&str],
    platform: Platform,
) -> Option<String> {
    for key in candidate_keys {
        let Some(value) = item.get(*key) else {
            continue;
        };
        if let Some(url) = normalize_url_value(value) {
            return Some(url);
        }
        if let (Value::String(raw), Some(origin)) = (value, platform.origin()) {
            let path = unescape_html(raw.trim());
            if path.starts_with('/') && !path.starts_with("//") {
                return Some(format!("{origin}{path}"));
            }
        }
    }

    NESTED_METADATA_KEYS
        .iter()
        .filter_map(|key| item.get(*key))
        .find_map(normalize_url_value)
}

/// Builds a platform search-page URL for a listing whose link could not be recovered.
pub fn synthesize_search_url(platform: Platform, title: &str, location: &str) -> String {
    let title = match title.trim() {
        "" => "software engineer",
        t => t,
    };
    let location = match location.trim() {
        "" => DEFAULT_LOCATION,
        l => l,
    };
    let title_q = quote_plus(title);
    let location_q = quote_plus(location);

    match platform {
        Platform::Linkedin => format!(
            "https://www.linkedin.com/jobs/search/?keywords={title_q}&location={location_q}"
        ),
        Platform::Naukri => format!(
            "https://www.naukri.com/{}-jobs-in-{}",
            slugify(title, "software-engineer"),
            slugify(location, "india")
        ),
        Platform::Internshala => {
            format!("https://internshala.com/internships/keywords-{title_q}/")
        }
        Platform::Internal | Platform::External => {
            format!("https://www.google.com/search?q={title_q}+jobs+{location_q}")
        }
    }
}

/// Form-style query encoding (spaces as `+`).
pub fn quote_plus(text: &str) -> String {
    urlencoding::encode(text).replace("%20", "+")
}

/// Lowercases and collapses every run of non-alphanumerics into a single dash.
pub fn slugify(text: &str, fallback: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// Decodes the HTML entities scrapers leave in links (`&amp;`, `&#x2F;`, ...).
pub fn unescape_html(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = tail
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}
