//! Naukri actor schema. Naukri scrapers disagree on input names, so the query
//! and limit are sent under every common alias.

use serde_json::{json, Value};

use crate::models::Platform;
use crate::sources::record::RecordSchema;

pub const SCHEMA: RecordSchema = RecordSchema {
    platform: Platform::Naukri,
    title_keys: &["jobTitle", "title", "role"],
    company_keys: &["companyName", "company"],
    location_keys: &["location", "jobLocation"],
    description_keys: &["description", "jobDescription"],
    url_keys: &[
        "jobUrl",
        "url",
        "jobLink",
        "link",
        "applyLink",
        "jobHref",
        "applyUrl",
        "jobDetailUrl",
        "detailsUrl",
        "redirectUrl",
        "job_url",
        "apply_url",
        "job_link",
        "apply_link",
        "details_url",
        "redirect_url",
    ],
    salary_keys: &["salary", "salaryRange", "ctc"],
    posted_keys: &["postedDate", "createdOn"],
    deadline_keys: &["expiresAt", "closingDate", "applicationDeadline"],
    applicant_keys: &["applicationsCount", "applicants"],
    duration_keys: &[],
    synthesis_location: None,
    build_input,
};

fn build_input(query: &str, location: &str) -> Value {
    json!({
        "keyword": query,
        "searchKeyword": query,
        "query": query,
        "location": location,
        "locations": location,
        "count": 100,
        "limit": 100,
        "maxResults": 100,
        "maxItems": 100,
        "rows": 100,
    })
}
