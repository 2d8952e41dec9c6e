//! Match scoring: a pluggable scorer plus the ranking pass over a listing set.
//!
//! `RecommendationEngine` holds an `Arc<dyn MatchScorer>`; the default is
//! `KeywordMatchScorer` (deterministic, no external calls).

use crate::matching::scoring::{blend_score, keyword_match_percent, match_reason, ScoringWeights};
use crate::matching::similarity::cosine_similarity;
use crate::matching::skills::{clean_skill_list, extract_skills_from_text, SkillOverlap};
use crate::models::{JobListing, MatchResult, ResumeProfile};

/// Cap on the matched/missing skill lists carried in each result.
const MAX_LISTED_SKILLS: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

pub trait MatchScorer: Send + Sync {
    fn score(&self, profile: &ResumeProfile, listing: &JobListing) -> MatchResult;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordMatchScorer
// ────────────────────────────────────────────────────────────────────────────

/// Weighted blend of skill overlap, keyword hits and text similarity.
///
/// 1. Job skills = explicit `required_skills`, or vocabulary terms found in
///    title + description when none are given.
/// 2. Skill score = share of job skills fuzzily covered by resume skills.
/// 3. Keyword score = share of resume keywords present in the description.
/// 4. Similarity = TF-IDF cosine of (skills + summary) vs (description + required skills).
/// 5. No skill and no keyword overlap at all scores 0.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatchScorer {
    pub weights: ScoringWeights,
}

impl MatchScorer for KeywordMatchScorer {
    fn score(&self, profile: &ResumeProfile, listing: &JobListing) -> MatchResult {
        let resume_skills = clean_skill_list(&profile.skills);
        let resume_keywords = clean_skill_list(&profile.keywords);

        let job_skills = if listing.required_skills.is_empty() {
            extract_skills_from_text(&format!("{} {}", listing.title, listing.description))
        } else {
            clean_skill_list(&listing.required_skills)
        };

        let overlap = SkillOverlap::compute(&resume_skills, &job_skills);
        let skill_score = overlap.percent();
        let keyword_score =
            keyword_match_percent(&resume_keywords, &listing.description.to_lowercase());

        let match_score = if skill_score == 0.0 && keyword_score == 0.0 {
            0
        } else {
            let resume_text = format!("{} {}", profile.skills.join(" "), profile.summary);
            let job_text = format!(
                "{} {}",
                listing.description,
                listing.required_skills.join(" ")
            );
            let similarity = cosine_similarity(&resume_text, &job_text);
            blend_score(skill_score, keyword_score, similarity, &self.weights)
        };

        let match_reason = match_reason(overlap.matched.len(), overlap.total());
        let SkillOverlap {
            mut matched,
            mut missing,
        } = overlap;
        matched.truncate(MAX_LISTED_SKILLS);
        missing.truncate(MAX_LISTED_SKILLS);

        MatchResult {
            listing: listing.clone(),
            match_score,
            match_reason,
            matched_skills: matched,
            missing_skills: missing,
        }
    }
}

/// Scores every listing and sorts by score, highest first. Equal scores keep
/// their input order. `top_n == 0` returns everything.
pub fn rank_listings(
    scorer: &dyn MatchScorer,
    profile: &ResumeProfile,
    listings: &[JobListing],
    top_n: usize,
) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = listings
        .iter()
        .map(|listing| scorer.score(profile, listing))
        .collect();
    results.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    if top_n > 0 {
        results.truncate(top_n);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    fn profile(skills: &[&str], keywords: &[&str]) -> ResumeProfile {
        ResumeProfile {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            ..ResumeProfile::default()
        }
    }

    fn listing(title: &str, description: &str, skills: &[&str]) -> JobListing {
        JobListing {
            description: description.to_string(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            ..JobListing::new(title, "Acme", "India", "https://jobs.example/1", Platform::Linkedin)
        }
    }

    #[test]
    fn test_python_react_against_python_sql() {
        let scorer = KeywordMatchScorer::default();
        let result = scorer.score(
            &profile(&["python", "react"], &[]),
            &listing("Backend Developer", "Work on data pipelines", &["python", "sql"]),
        );

        assert_eq!(result.matched_skills, vec!["python"]);
        assert_eq!(result.missing_skills, vec!["sql"]);
        // 0.6 * 50 = 30 from skills alone, well above the floor.
        assert!(result.match_score >= 30 && result.match_score < 60, "{}", result.match_score);
        assert!(result.match_reason.starts_with("Moderate match"));
    }

    #[test]
    fn test_required_skills_derived_from_text() {
        let scorer = KeywordMatchScorer::default();
        let result = scorer.score(
            &profile(&["Docker", "rust"], &[]),
            &listing("Platform Engineer", "Kubernetes and Docker on AWS", &[]),
        );

        assert_eq!(result.matched_skills, vec!["docker"]);
        assert_eq!(result.missing_skills, vec!["aws", "kubernetes"]);
        assert!(result.match_reason.starts_with("Partial match with 1 out of 3"));
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let scorer = KeywordMatchScorer::default();
        let result = scorer.score(
            &profile(&["welding"], &["fabrication"]),
            &listing("Python Developer", "python django", &["python"]),
        );
        assert_eq!(result.match_score, 0);
        assert_eq!(result.match_reason, "No skills match found");
    }

    #[test]
    fn test_keyword_only_overlap_hits_floor() {
        let scorer = KeywordMatchScorer::default();
        let result = scorer.score(
            &profile(&[], &["startup", "b2b", "saas", "growth", "fintech", "remote"]),
            &listing("Analyst", "an early stage fintech startup", &["excel"]),
        );
        // 0.25 * 33.3 = 8.3 → floored to 10
        assert_eq!(result.match_score, 10);
    }

    #[test]
    fn test_rank_is_descending_and_stable() {
        let scorer = KeywordMatchScorer::default();
        let listings = vec![
            listing("A", "", &["java"]),
            listing("B", "", &["python"]),
            listing("C", "", &["golang"]),
            listing("D", "", &["python"]),
        ];

        let ranked = rank_listings(&scorer, &profile(&["python"], &[]), &listings, 0);
        let titles: Vec<&str> = ranked.iter().map(|r| r.listing.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "D", "A", "C"]);

        let top = rank_listings(&scorer, &profile(&["python"], &[]), &listings, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].listing.title, "B");
    }
}
