use crate::catalog::RoleCatalog;
use crate::config::MatcherConfig;
use crate::embedding::term_frequency::{count_cosine, TermFrequencyVectorizer};
use crate::extractor::{token_sort_ratio, tokenize};
use crate::{Role, RoleMatch};

use super::{experience_penalty, sort_and_truncate};

/// Degraded-mode ranking: term-frequency vectors over each role's
/// required-skill text plus the resume text, cosine similarity over those
/// counts, and fuzzy token overlap instead of set intersection for the
/// matched/missing split. Never fails for a well-formed catalog; it trades
/// ranking quality for availability.
pub fn rank(
    catalog: &RoleCatalog,
    resume_text: &str,
    experience_years: u32,
    top_k: usize,
    config: &MatcherConfig,
) -> Vec<RoleMatch> {
    let role_docs: Vec<String> = catalog
        .roles()
        .iter()
        .map(|role| {
            role.required_skills
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    let mut corpus: Vec<&str> = role_docs.iter().map(String::as_str).collect();
    corpus.push(resume_text);
    let vectorizer = TermFrequencyVectorizer::fit(&corpus);

    let resume_vector = vectorizer.transform(resume_text);
    let resume_low = resume_text.to_lowercase();
    let windows = token_windows(&resume_low);

    let mut matches: Vec<RoleMatch> = catalog
        .roles()
        .iter()
        .zip(role_docs.iter())
        .map(|(role, doc)| {
            let similarity = f64::from(count_cosine(&resume_vector, &vectorizer.transform(doc)));
            build_fuzzy_match(role, &resume_low, &windows, similarity, experience_years, config)
        })
        .collect();

    sort_and_truncate(&mut matches, top_k);
    matches
}

/// All 1..=3-token phrases of the resume, for fuzzy matched-skill detection.
fn token_windows(text_low: &str) -> Vec<String> {
    let tokens = tokenize(text_low);
    let mut windows = Vec::new();
    for start in 0..tokens.len() {
        for width in 1..=3usize {
            if let Some(window) = tokens.get(start..start + width) {
                windows.push(window.join(" "));
            }
        }
    }
    windows
}

fn build_fuzzy_match(
    role: &Role,
    resume_low: &str,
    windows: &[String],
    similarity: f64,
    experience_years: u32,
    config: &MatcherConfig,
) -> RoleMatch {
    let penalty = experience_penalty(config, experience_years, role.min_experience);

    let mut matched: Vec<String> = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    for skill in &role.required_skills {
        if skill_mentioned(skill, resume_low, windows, config.fallback_match_threshold) {
            matched.push(skill.clone());
        } else {
            missing.push(skill.clone());
        }
    }

    RoleMatch {
        role: role.name.clone(),
        score: similarity * penalty,
        similarity,
        experience_penalty: penalty,
        min_experience: role.min_experience,
        required_skills: role.required_skills.iter().cloned().collect(),
        matched_skills: matched,
        missing_skills: missing,
    }
}

fn skill_mentioned(skill: &str, resume_low: &str, windows: &[String], threshold: f64) -> bool {
    if resume_low.contains(skill) {
        return true;
    }
    windows
        .iter()
        .any(|window| token_sort_ratio(window, skill) >= threshold)
}
