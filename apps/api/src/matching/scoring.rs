/// Floor applied to the blended score when there is any skill or keyword overlap.
pub const MIN_RELEVANT_SCORE: f64 = 10.0;
pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub skill: f64,
    pub keyword: f64,
    pub similarity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill: 0.6,
            keyword: 0.25,
            similarity: 0.15,
        }
    }
}

/// Share of resume keywords found verbatim in the description, on a 0–100 scale.
/// `description` is expected lowercased.
pub fn keyword_match_percent(resume_keywords: &[String], description: &str) -> f64 {
    if resume_keywords.is_empty() || description.is_empty() {
        return 0.0;
    }
    let found = resume_keywords
        .iter()
        .filter(|keyword| description.contains(keyword.as_str()))
        .count();
    (found as f64 / resume_keywords.len() as f64 * 100.0).min(MAX_SCORE)
}

/// Blends the three 0–100 sub-scores into the final integer score.
///
/// Order matters: weighted blend, then the floor (only when skills or keywords
/// overlap), then the cap, then truncation.
pub fn blend_score(skill: f64, keyword: f64, similarity: f64, weights: &ScoringWeights) -> u32 {
    let base = weights.skill * skill + weights.keyword * keyword + weights.similarity * similarity;
    let floored = if skill > 0.0 || keyword > 0.0 {
        base.max(MIN_RELEVANT_SCORE)
    } else {
        base
    };
    floored.min(MAX_SCORE).max(0.0) as u32
}

/// Human-readable reason bucketed by the share of required skills matched.
pub fn match_reason(matched: usize, total: usize) -> String {
    if matched == 0 {
        return "No skills match found".to_string();
    }
    let percent = if total > 0 { matched * 100 / total } else { 0 };

    if percent >= 80 {
        format!("Excellent match! You have {matched} out of {total} required skills ({percent}% match)")
    } else if percent >= 60 {
        format!("Strong match with {matched} out of {total} required skills ({percent}% match)")
    } else if percent >= 40 {
        format!("Moderate match with {matched} out of {total} required skills ({percent}% match)")
    } else {
        format!("Partial match with {matched} out of {total} required skills ({percent}% match)")
    }
}
