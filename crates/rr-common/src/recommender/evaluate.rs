use serde::Serialize;
use thiserror::Error;

use crate::catalog::RoleCatalog;
use crate::config::MatcherConfig;
use crate::extractor::extract;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvaluateError {
    #[error("job role '{0}' not found in catalog")]
    RoleNotFound(String),
}

/// The winning resume of an `evaluate_resumes_for_role` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeEvaluation {
    pub filename: String,
    /// Required-skill coverage ratio in 0.0..=1.0.
    pub score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Compare several extracted resume texts against one catalog role and pick
/// the best by required-skill coverage. Ties keep the earliest resume; an
/// empty resume list yields `None`. An unknown role name is a client error,
/// not a ranking of nothing.
pub fn evaluate_resumes_for_role(
    catalog: &RoleCatalog,
    resumes: &[(String, String)],
    role_name: &str,
    config: &MatcherConfig,
) -> Result<Option<ResumeEvaluation>, EvaluateError> {
    let role = catalog
        .find_role(role_name)
        .ok_or_else(|| EvaluateError::RoleNotFound(role_name.to_string()))?;

    let mut best: Option<ResumeEvaluation> = None;
    for (filename, text) in resumes {
        let resume_skills = extract(text, catalog.gazetteer(), config);

        let matched: Vec<String> = role
            .required_skills
            .intersection(&resume_skills)
            .cloned()
            .collect();
        let missing: Vec<String> = role
            .required_skills
            .difference(&resume_skills)
            .cloned()
            .collect();
        let score = matched.len() as f64 / role.required_skills.len().max(1) as f64;

        let better = best.as_ref().is_none_or(|current| score > current.score);
        if better {
            best = Some(ResumeEvaluation {
                filename: filename.clone(),
                score,
                matched_skills: matched,
                missing_skills: missing,
            });
        }
    }

    Ok(best)
}
