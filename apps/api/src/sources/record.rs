//! Raw record → `JobListing` mapping, driven by a per-platform field schema.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{JobListing, Platform};
use crate::sources::urls::{extract_item_url, synthesize_search_url};

/// A single raw record that cannot become a listing. Dropped, never fatal to the batch.
#[derive(Debug, Error, PartialEq)]
pub enum MalformedRecord {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no title")]
    MissingTitle,
}

/// Where each canonical field lives in one platform's actor output.
/// Keys are tried in order; the first non-empty value wins.
pub struct RecordSchema {
    pub platform: Platform,
    pub title_keys: &'static [&'static str],
    pub company_keys: &'static [&'static str],
    pub location_keys: &'static [&'static str],
    pub description_keys: &'static [&'static str],
    pub url_keys: &'static [&'static str],
    pub salary_keys: &'static [&'static str],
    pub posted_keys: &'static [&'static str],
    pub deadline_keys: &'static [&'static str],
    pub applicant_keys: &'static [&'static str],
    pub duration_keys: &'static [&'static str],
    /// Location used for search-URL synthesis when the actor takes no location input.
    pub synthesis_location: Option<&'static str>,
    /// Builds the actor input from the joined search query and sanitized location.
    pub build_input: fn(&str, &str) -> Value,
}

/// A mapped listing plus whether its URL had to be synthesized.
#[derive(Debug)]
pub struct MappedRecord {
    pub listing: JobListing,
    pub synthesized_url: bool,
}

impl RecordSchema {
    pub fn map_record(
        &self,
        item: &Value,
        search_location: &str,
    ) -> Result<MappedRecord, MalformedRecord> {
        let item = item.as_object().ok_or(MalformedRecord::NotAnObject)?;
        let title = first_text(item, self.title_keys).ok_or(MalformedRecord::MissingTitle)?;

        let company = company_name(item, self.company_keys).unwrap_or_default();

        // The company keeps same-title postings apart once they share a search URL.
        let url_location = self.synthesis_location.unwrap_or(search_location);
        let (url, synthesized_url) = match extract_item_url(item, self.url_keys, self.platform) {
            Some(url) => (url, false),
            None => {
                let terms = match company.as_str() {
                    "" => title.clone(),
                    company => format!("{title} {company}"),
                };
                (synthesize_search_url(self.platform, &terms, url_location), true)
            }
        };

        let listing = JobListing {
            id: None,
            company,
            location: first_text(item, self.location_keys)
                .unwrap_or_else(|| search_location.to_string()),
            description: first_text(item, self.description_keys).unwrap_or_default(),
            url,
            source: self.platform,
            salary: Some(
                first_text(item, self.salary_keys).unwrap_or_else(|| "Not specified".to_string()),
            ),
            posted_at: first_text(item, self.posted_keys),
            deadline: first_text(item, self.deadline_keys),
            applicants: Some(
                first_text(item, self.applicant_keys).unwrap_or_else(|| "N/A".to_string()),
            ),
            duration: first_text(item, self.duration_keys),
            required_skills: Vec::new(),
            is_search: false,
            title,
        };

        Ok(MappedRecord {
            listing,
            synthesized_url,
        })
    }
}

/// First non-empty scalar under any of `keys`, rendered as text.
pub fn first_text(item: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|key| item.get(*key)).find_map(scalar_text)
}

/// Company may be a plain string or an object like `{"name": ..., "logo": ...}`.
fn company_name(item: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find_map(|value| match value {
            Value::Object(obj) => obj.get("name").and_then(scalar_text),
            other => scalar_text(other),
        })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
