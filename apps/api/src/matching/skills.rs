//! Skill vocabulary, normalization and fuzzy matching.

/// Technology terms recognised in free-text titles and descriptions.
const TECH_VOCABULARY: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "c++",
    "c#",
    "go",
    "rust",
    "ruby",
    "php",
    "react",
    "angular",
    "vue",
    "node.js",
    "nodejs",
    "express",
    "django",
    "flask",
    "spring",
    "sql",
    "mysql",
    "postgresql",
    "mongodb",
    "redis",
    "oracle",
    "database",
    "aws",
    "azure",
    "gcp",
    "google cloud",
    "docker",
    "kubernetes",
    "k8s",
    "terraform",
    "html",
    "css",
    "bootstrap",
    "tailwind",
    "sass",
    "less",
    "android",
    "ios",
    "react native",
    "flutter",
    "swift",
    "kotlin",
    "machine learning",
    "ml",
    "ai",
    "artificial intelligence",
    "data science",
    "pandas",
    "numpy",
    "tensorflow",
    "pytorch",
    "scikit-learn",
    "keras",
    "git",
    "github",
    "gitlab",
    "jenkins",
    "ci/cd",
    "devops",
    "agile",
    "scrum",
    "jira",
    "confluence",
];

const SKILL_FILLER_WORDS: &[&str] = &[
    "programming",
    "development",
    "developer",
    "experience",
    "knowledge",
    "skill",
];

const SKILL_ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("nodejs", "node.js"),
    ("ml", "machine learning"),
    ("ai", "artificial intelligence"),
    ("k8s", "kubernetes"),
    ("postgres", "postgresql"),
    ("mongo", "mongodb"),
];

/// Vocabulary terms present in `text`, in vocabulary order.
///
/// A term only counts when it is not glued to other letters or digits, so
/// "go" is not found in "google" and "ai" not in "maintain".
pub fn extract_skills_from_text(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    TECH_VOCABULARY
        .iter()
        .filter(|term| contains_term(&text, term))
        .map(|term| term.to_string())
        .collect()
}

fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Lowercases and strips filler words ("developer", "experience", ...).
pub fn normalize_skill(skill: &str) -> String {
    let mut normalized = skill.trim().to_lowercase();
    for filler in SKILL_FILLER_WORDS {
        normalized = normalized.replace(filler, "");
    }
    normalized.trim().to_string()
}

fn resolve_alias(skill: &str) -> &str {
    SKILL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == skill)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(skill)
}

/// Exact match, then containment either way, then the alias table.
/// A skill that normalizes to nothing never matches.
pub fn fuzzy_skill_match(resume_skill: &str, job_skill: &str) -> bool {
    let resume = normalize_skill(resume_skill);
    let job = normalize_skill(job_skill);
    if resume.is_empty() || job.is_empty() {
        return false;
    }
    if resume == job || resume.contains(&job) || job.contains(&resume) {
        return true;
    }

    let resume = resolve_alias(&resume);
    let job = resolve_alias(&job);
    resume == job || resume.contains(job) || job.contains(resume)
}

/// Lowercased, trimmed, de-duplicated skills in first-seen order.
pub fn clean_skill_list<S: AsRef<str>>(skills: &[S]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for skill in skills {
        let skill = skill.as_ref().trim().to_lowercase();
        if !skill.is_empty() && !cleaned.contains(&skill) {
            cleaned.push(skill);
        }
    }
    cleaned
}

/// How a listing's required skills are covered by a resume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillOverlap {
    /// Job skills covered by at least one resume skill, in job order.
    pub matched: Vec<String>,
    /// Job skills no resume skill covers, in job order.
    pub missing: Vec<String>,
}

impl SkillOverlap {
    /// Each job skill counts at most once, exact matches before fuzzy ones.
    pub fn compute(resume_skills: &[String], job_skills: &[String]) -> Self {
        let mut overlap = SkillOverlap::default();
        for job_skill in job_skills {
            let covered = resume_skills.contains(job_skill)
                || resume_skills
                    .iter()
                    .any(|resume_skill| fuzzy_skill_match(resume_skill, job_skill));
            if covered {
                overlap.matched.push(job_skill.clone());
            } else {
                overlap.missing.push(job_skill.clone());
            }
        }
        overlap
    }

    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }

    /// Share of job skills covered, on a 0–100 scale.
    pub fn percent(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.matched.len() as f64 / total as f64 * 100.0,
        }
    }
}
