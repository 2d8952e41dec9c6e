//! Read-only access to the internal opportunity catalog.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::models::{JobListing, Platform};

#[async_trait]
pub trait OpportunityCatalog: Send + Sync {
    /// Active, approved opportunities as listings.
    async fn active_listings(&self) -> Result<Vec<JobListing>>;
}

#[derive(Debug, Clone, FromRow)]
pub struct OpportunityRow {
    pub id: i64,
    pub title: String,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub stipend: Option<String>,
    pub application_deadline: Option<String>,
    /// Names from the required-skill relation.
    pub skill_names: Vec<String>,
    /// Legacy JSON-encoded skill list, used when the relation is empty.
    pub required_skills_json: Option<String>,
}

impl OpportunityRow {
    pub fn into_listing(self) -> JobListing {
        let required_skills = if self.skill_names.is_empty() {
            self.required_skills_json
                .as_deref()
                .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
                .unwrap_or_default()
        } else {
            self.skill_names
        };

        JobListing {
            id: Some(self.id),
            company: self.company_name.unwrap_or_else(|| "Unknown".to_string()),
            location: self
                .location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| "Not specified".to_string()),
            description: self.description.unwrap_or_default(),
            url: String::new(),
            source: Platform::Internal,
            salary: self.stipend,
            posted_at: None,
            deadline: self.application_deadline,
            applicants: None,
            duration: self.duration,
            required_skills,
            is_search: false,
            title: self.title,
        }
    }
}

pub struct PgOpportunityCatalog {
    pool: PgPool,
}

impl PgOpportunityCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OpportunityCatalog for PgOpportunityCatalog {
    async fn active_listings(&self) -> Result<Vec<JobListing>> {
        let rows = sqlx::query_as::<_, OpportunityRow>(
            r#"
            SELECT
                o.id::bigint AS id,
                o.title,
                c.name AS company_name,
                o.location,
                o.description,
                o.duration,
                o.stipend,
                o.application_deadline::text AS application_deadline,
                COALESCE(
                    (SELECT array_agg(s.name::text ORDER BY s.name)
                     FROM opportunity_skills os
                     JOIN skills s ON s.id = os.skill_id
                     WHERE os.opportunity_id = o.id AND os.is_required),
                    ARRAY[]::text[]
                ) AS skill_names,
                o.required_skills AS required_skills_json
            FROM opportunities o
            LEFT JOIN companies c ON c.id = o.company_id
            WHERE o.is_active AND o.is_approved
            ORDER BY o.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load active opportunities")?;

        Ok(rows.into_iter().map(OpportunityRow::into_listing).collect())
    }
}

/// Fixed listing set. Used when no database is configured, and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    listings: Vec<JobListing>,
}

impl StaticCatalog {
    pub fn new(listings: Vec<JobListing>) -> Self {
        Self { listings }
    }
}

#[async_trait]
impl OpportunityCatalog for StaticCatalog {
    async fn active_listings(&self) -> Result<Vec<JobListing>> {
        Ok(self.listings.clone())
    }
}
