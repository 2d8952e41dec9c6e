use std::collections::HashSet;

use crate::models::{JobListing, Platform};
use crate::sources::urls::normalize_url_text;

/// Identity of a listing for de-duplication across sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListingKey {
    Url(String),
    Composite {
        title: String,
        company: String,
        source: Platform,
    },
}

impl ListingKey {
    /// URL-first: a normalized, lowercased URL identifies the listing. Without one,
    /// fall back to (title, company, source).
    pub fn of(listing: &JobListing) -> Self {
        match normalize_url_text(&listing.url) {
            Some(url) => ListingKey::Url(url.to_lowercase()),
            None => ListingKey::Composite {
                title: listing.title.trim().to_lowercase(),
                company: listing.company.trim().to_lowercase(),
                source: listing.source,
            },
        }
    }
}

/// Merges listings keeping the first occurrence of each key.
pub fn merge_listings<I>(listings: I) -> Vec<JobListing>
where
    I: IntoIterator<Item = JobListing>,
{
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| seen.insert(ListingKey::of(listing)))
        .collect()
}
