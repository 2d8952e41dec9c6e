//! LinkedIn actor schema (`bebity/linkedin-jobs-scraper` and compatible actors).

use serde_json::{json, Value};

use crate::models::Platform;
use crate::sources::record::RecordSchema;

pub const DEFAULT_ACTOR_ID: &str = "bebity/linkedin-jobs-scraper";

pub const SCHEMA: RecordSchema = RecordSchema {
    platform: Platform::Linkedin,
    title_keys: &["jobTitle", "title", "positionName"],
    company_keys: &["companyName", "company"],
    location_keys: &["location", "jobLocation"],
    description_keys: &["description", "jobDescription"],
    url_keys: &[
        "link",
        "url",
        "jobLink",
        "URL",
        "linkedinUrl",
        "applyUrl",
        "jobUrl",
        "externalApplyLink",
        "applyLink",
        "href",
        "job_url",
        "apply_url",
        "job_link",
        "apply_link",
    ],
    salary_keys: &["salary", "salaryRange"],
    posted_keys: &["publishedAt", "postedDate", "postedOn"],
    deadline_keys: &["expiresAt", "closingDate", "applicationDeadline", "validThrough"],
    applicant_keys: &["applicationsCount", "applicants"],
    duration_keys: &[],
    synthesis_location: None,
    build_input,
};

fn build_input(query: &str, location: &str) -> Value {
    json!({
        "keyword": query,
        "location": location,
        "rows": 100,
        "maxItems": 100,
    })
}
