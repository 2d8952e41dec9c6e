//! Synthesized listings for when live sources come back empty, and apply-link
//! normalisation for every listing before it is ranked.

use tracing::info;

use crate::aggregation::query::{prepare_search_keywords, DEFAULT_FALLBACK_KEYWORDS};
use crate::models::{JobListing, Platform};
use crate::sources::urls::{normalize_url_text, synthesize_search_url};

const MAX_SEARCH_TERMS: usize = 4;
const MAX_SKILL_CARDS: usize = 10;
const OPPORTUNITIES_PATH: &str = "/student/opportunities";

const JOB_TITLE_PATTERNS: &[(&str, &str)] = &[
    ("python", "Python Developer"),
    ("java", "Java Developer"),
    ("javascript", "JavaScript Developer"),
    ("react", "React Developer"),
    ("node.js", "Node.js Developer"),
    ("nodejs", "Node.js Developer"),
    ("angular", "Angular Developer"),
    ("vue", "Vue.js Developer"),
    ("sql", "SQL Developer"),
    ("mongodb", "MongoDB Developer"),
    ("aws", "AWS Developer"),
    ("docker", "Docker Engineer"),
    ("kubernetes", "Kubernetes Engineer"),
    ("machine learning", "Machine Learning Engineer"),
    ("data science", "Data Scientist"),
    ("android", "Android Developer"),
    ("ios", "iOS Developer"),
    ("flutter", "Flutter Developer"),
];

/// One LinkedIn, Naukri and Internshala search card for each leading search term.
pub fn external_search_cards(keywords: &[String], location: &str) -> Vec<JobListing> {
    let terms = prepare_search_keywords(keywords, DEFAULT_FALLBACK_KEYWORDS, MAX_SEARCH_TERMS);
    let platforms = [
        (Platform::Linkedin, "LinkedIn", "jobs"),
        (Platform::Naukri, "Naukri", "jobs"),
        (Platform::Internshala, "Internshala", "roles"),
    ];

    terms
        .iter()
        .flat_map(|term| {
            let display = title_case(term);
            platforms.iter().map(move |(platform, name, noun)| JobListing {
                description: format!("Search {name} {noun} for {display}"),
                required_skills: vec![term.clone()],
                is_search: true,
                ..JobListing::new(
                    format!("{display} - {name} Search"),
                    *name,
                    location,
                    synthesize_search_url(*platform, term, location),
                    *platform,
                )
            })
        })
        .collect()
}

/// Naukri keyword-search cards built straight from resume skills.
pub fn naukri_skill_cards<S: AsRef<str>>(skills: &[S], location: &str) -> Vec<JobListing> {
    let mut seen: Vec<String> = Vec::new();
    let mut cards = Vec::new();

    for skill in skills.iter().take(MAX_SKILL_CARDS) {
        let skill = skill.as_ref().trim();
        let lower = skill.to_lowercase();
        if lower.is_empty() || seen.contains(&lower) {
            continue;
        }
        seen.push(lower.clone());

        let job_title = JOB_TITLE_PATTERNS
            .iter()
            .find(|(key, _)| *key == lower)
            .map(|(_, title)| title.to_string())
            .unwrap_or_else(|| format!("{} Developer", title_case(skill)));
        let slug = lower.replace([' ', '.', '+'], "-");

        cards.push(JobListing {
            description: format!(
                "Search for {job_title} jobs on Naukri. Click to view all available positions matching your {skill} skills."
            ),
            required_skills: vec![skill.to_string()],
            is_search: true,
            ..JobListing::new(
                job_title.clone(),
                "Multiple Companies",
                location,
                format!("https://www.naukri.com/{slug}-jobs"),
                Platform::Naukri,
            )
        });
    }

    info!("Created {} Naukri skill-search cards", cards.len());
    cards
}

/// Internal listings link to the in-app opportunity page, absolute when the app
/// origin is known. External listings get an absolute URL, synthesized from the
/// platform search page when needed.
pub fn normalize_apply_target(
    mut listing: JobListing,
    location: &str,
    app_base_url: Option<&str>,
) -> JobListing {
    if listing.source == Platform::Internal {
        let path = match listing.id {
            Some(id) if id > 0 => format!("{OPPORTUNITIES_PATH}/{id}"),
            _ => OPPORTUNITIES_PATH.to_string(),
        };
        listing.url = match app_base_url {
            Some(base) => format!("{base}{path}"),
            None => path,
        };
        return listing;
    }

    if listing.source == Platform::External {
        listing.source = Platform::from_url(&listing.url);
    }
    listing.url = match normalize_url_text(&listing.url) {
        Some(url) => url,
        None => synthesize_search_url(listing.source, &listing.title, location),
    };
    listing
}

/// Capitalises the first letter of every alphabetic run.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
