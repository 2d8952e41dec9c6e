use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::listing::JobListing;

/// Candidate profile supplied by the resume extractor.
///
/// The extractor is an external collaborator, so list fields are coerced rather
/// than validated: a bare string becomes a one-item list, anything else that is
/// not a list becomes empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeProfile {
    #[serde(default, deserialize_with = "lenient_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub experience_years: f64,
    #[serde(default, alias = "professional_summary", deserialize_with = "lenient_text")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub recommended_roles: Vec<String>,
}

/// A listing scored against a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub listing: JobListing,
    pub match_score: u32, // 0 – 100
    pub match_reason: String,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_text_list(&value))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let years = match &value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if years.is_finite() { years.max(0.0) } else { 0.0 })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Coerces an arbitrary JSON value into a list of non-empty strings.
pub fn coerce_text_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
