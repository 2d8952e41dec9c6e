use serde::{Deserialize, Serialize};

/// Canonical platform tag attached to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Linkedin,
    Naukri,
    Internshala,
    Internal,
    External,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linkedin => "linkedin",
            Platform::Naukri => "naukri",
            Platform::Internshala => "internshala",
            Platform::Internal => "internal",
            Platform::External => "external",
        }
    }

    /// Infers the platform from the URL host.
    pub fn from_url(url: &str) -> Self {
        let url = url.to_lowercase();
        if url.contains("linkedin.com") {
            Platform::Linkedin
        } else if url.contains("naukri.com") {
            Platform::Naukri
        } else if url.contains("internshala.com") {
            Platform::Internshala
        } else {
            Platform::External
        }
    }

    /// Origin used to promote platform-relative paths ("/jobs/view/1") to absolute URLs.
    pub fn origin(&self) -> Option<&'static str> {
        match self {
            Platform::Linkedin => Some("https://www.linkedin.com"),
            Platform::Naukri => Some("https://www.naukri.com"),
            Platform::Internshala => Some("https://internshala.com"),
            Platform::Internal | Platform::External => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job or internship listing in canonical shape, regardless of which backend produced it.
///
/// `url` is always an absolute HTTP(S) address for external listings; internal
/// catalog listings point at the in-app opportunity page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub source: Platform,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub applicants: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    /// Explicit skill requirements. Empty for scraped listings; derived at ranking time.
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// True for synthesized search-page cards rather than concrete postings.
    #[serde(default)]
    pub is_search: bool,
}

impl JobListing {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        url: impl Into<String>,
        source: Platform,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            company: company.into(),
            location: location.into(),
            description: String::new(),
            url: url.into(),
            source,
            salary: None,
            posted_at: None,
            deadline: None,
            applicants: None,
            duration: None,
            required_skills: Vec::new(),
            is_search: false,
        }
    }
}
