//! Recommendation run: gather candidate listings, then rank them against the profile.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregation::query::SearchQuery;
use crate::aggregation::LiveSearch;
use crate::matching::{rank_listings, MatchScorer};
use crate::models::{JobListing, MatchResult, ResumeProfile};
use crate::recommendation::catalog::OpportunityCatalog;
use crate::recommendation::fallback::{
    external_search_cards, naukri_skill_cards, normalize_apply_target,
};
use crate::sources::location::sanitize_location;

fn default_true() -> bool {
    true
}

fn default_top_n() -> usize {
    200
}

/// Inputs to one recommendation run. `top_n == 0` returns every ranked listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default, alias = "resume_analysis")]
    pub profile: ResumeProfile,
    #[serde(default = "default_true", alias = "use_apify")]
    pub use_live_sources: bool,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub location: String,
}

impl RecommendationRequest {
    pub fn new(profile: ResumeProfile) -> Self {
        Self {
            profile,
            use_live_sources: true,
            top_n: default_top_n(),
            location: String::new(),
        }
    }

    /// Trims every text field and drops blank list entries, so equivalent
    /// submissions hash identically.
    pub fn normalized(mut self) -> Self {
        fn tidy(items: &mut Vec<String>) {
            *items = items
                .iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
        }

        tidy(&mut self.profile.skills);
        tidy(&mut self.profile.keywords);
        tidy(&mut self.profile.recommended_roles);
        self.profile.summary = self.profile.summary.trim().to_string();
        self.location = self.location.trim().to_string();
        self
    }
}

/// Capability the job queue runs in its workers.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<MatchResult>>;
}

pub struct RecommendationEngine {
    search: LiveSearch,
    catalog: Arc<dyn OpportunityCatalog>,
    scorer: Arc<dyn MatchScorer>,
    default_location: String,
    app_base_url: Option<String>,
}

impl RecommendationEngine {
    pub fn new(
        search: LiveSearch,
        catalog: Arc<dyn OpportunityCatalog>,
        scorer: Arc<dyn MatchScorer>,
        default_location: impl Into<String>,
    ) -> Self {
        Self {
            search,
            catalog,
            scorer,
            default_location: default_location.into(),
            app_base_url: None,
        }
    }

    /// Makes internal apply links absolute under the given app origin.
    pub fn with_app_base_url(mut self, app_base_url: Option<String>) -> Self {
        self.app_base_url = app_base_url;
        self
    }

    fn apply_target(&self, listing: JobListing, location: &str) -> JobListing {
        normalize_apply_target(listing, location, self.app_base_url.as_deref())
    }

    /// Candidate listings for a query, every one with a usable apply target.
    ///
    /// Live mode: cached or live aggregation; when that is empty, internal
    /// catalog listings plus external search cards. Catalog mode: the catalog,
    /// or Naukri skill-search cards when the catalog is empty.
    pub async fn job_sources(
        &self,
        use_live_sources: bool,
        query: &SearchQuery,
        resume_skills: &[String],
    ) -> Result<Vec<JobListing>> {
        if !use_live_sources {
            return self.catalog_listings(query, resume_skills).await;
        }

        let live = self.search.search(query).await;
        if !live.is_empty() {
            info!("Fetched {} live jobs", live.len());
            return Ok(live
                .into_iter()
                .map(|listing| self.apply_target(listing, &query.location))
                .collect());
        }

        warn!("Live sources returned 0 jobs, combining internal jobs + external search fallbacks");
        let mut jobs = match self.catalog_listings(query, resume_skills).await {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!("Internal catalog unavailable: {e:#}");
                Vec::new()
            }
        };
        jobs.extend(
            external_search_cards(&query.keywords, &query.location)
                .into_iter()
                .map(|listing| self.apply_target(listing, &query.location)),
        );
        Ok(jobs)
    }

    async fn catalog_listings(
        &self,
        query: &SearchQuery,
        resume_skills: &[String],
    ) -> Result<Vec<JobListing>> {
        let mut jobs = self.catalog.active_listings().await?;
        if jobs.is_empty() && !resume_skills.is_empty() {
            warn!("No catalog opportunities found; generating skill-based search links");
            jobs = naukri_skill_cards(resume_skills, &query.location);
        }
        Ok(jobs
            .into_iter()
            .map(|listing| self.apply_target(listing, &query.location))
            .collect())
    }
}

#[async_trait]
impl Recommender for RecommendationEngine {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<MatchResult>> {
        let profile = &request.profile;
        let location = sanitize_location(&request.location, &self.default_location);

        // Hard skills first, then role titles, then generic keywords.
        let candidates: Vec<&String> = profile
            .skills
            .iter()
            .chain(&profile.recommended_roles)
            .chain(&profile.keywords)
            .collect();
        let query = SearchQuery::new(&candidates, &location, &self.default_location);

        let resume_skills = if profile.skills.is_empty() {
            query.keywords.clone()
        } else {
            profile.skills.clone()
        };

        let jobs = self
            .job_sources(request.use_live_sources, &query, &resume_skills)
            .await?;
        let ranked = rank_listings(self.scorer.as_ref(), profile, &jobs, request.top_n);
        info!(
            "Ranked {} of {} candidate listings for {:?}",
            ranked.len(),
            jobs.len(),
            query.keywords
        );
        Ok(ranked)
    }
}
