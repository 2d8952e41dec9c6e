//! Internshala actor schema. The actor takes no location input, so synthesized
//! search links are always country-wide.

use serde_json::{json, Value};

use crate::models::Platform;
use crate::sources::location::DEFAULT_LOCATION;
use crate::sources::record::RecordSchema;

pub const SCHEMA: RecordSchema = RecordSchema {
    platform: Platform::Internshala,
    title_keys: &["title", "jobTitle", "profile"],
    company_keys: &["companyName", "company"],
    location_keys: &["location", "jobLocation"],
    description_keys: &["description", "aboutInternship"],
    url_keys: &[
        "url",
        "URL",
        "link",
        "jobUrl",
        "applyLink",
        "applyUrl",
        "internshipUrl",
        "href",
        "detailsUrl",
        "internship_link",
        "job_url",
        "apply_url",
        "internship_url",
        "apply_link",
        "details_url",
    ],
    salary_keys: &["stipend", "salary", "salaryRange", "ctc"],
    posted_keys: &["postedDate", "startDate"],
    deadline_keys: &["lastDate", "applicationDeadline", "expiresAt", "closingDate"],
    applicant_keys: &["applicationsCount", "applicants"],
    duration_keys: &["duration"],
    synthesis_location: Some(DEFAULT_LOCATION),
    build_input,
};

fn build_input(query: &str, _location: &str) -> Value {
    json!({
        "keyword": query,
        "searchKeyword": query,
        "query": query,
        "category": query,
        "count": 100,
        "limit": 100,
        "maxResults": 100,
        "maxItems": 100,
        "rows": 100,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_omits_location() {
        let input = (SCHEMA.build_input)("react", "Mumbai");
        assert_eq!(input["category"], "react");
        assert!(input.get("location").is_none());
    }

    #[test]
    fn test_maps_internship_with_stipend_and_duration() {
        let item = json!({
            "profile": "Web Development Intern",
            "companyName": "Epsilon Labs",
            "stipend": "10,000 /month",
            "duration": "3 Months",
            "lastDate": "30 Jun' 24"
        });
        let mapped = SCHEMA.map_record(&item, "Mumbai").unwrap();
        let listing = mapped.listing;
        assert!(mapped.synthesized_url);
        assert_eq!(
            listing.url,
            "https://internshala.com/internships/keywords-Web+Development+Intern/"
        );
        assert_eq!(listing.salary.as_deref(), Some("10,000 /month"));
        assert_eq!(listing.duration.as_deref(), Some("3 Months"));
        assert_eq!(listing.deadline.as_deref(), Some("30 Jun' 24"));
    }
}
