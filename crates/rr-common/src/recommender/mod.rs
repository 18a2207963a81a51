pub mod evaluate;
pub mod fallback;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use crate::catalog::RoleCatalog;
use crate::config::MatcherConfig;
use crate::embedding::{BackendError, SkillEmbedder};
use crate::extractor::extract;
use crate::fairness::remove_bias_terms;
use crate::{CandidateProfile, Role, RoleMatch};

pub use evaluate::{evaluate_resumes_for_role, EvaluateError, ResumeEvaluation};

pub const DEFAULT_TOP_K: usize = 5;

/// Outcome of a recommendation call. `Degraded` carries a valid ranking
/// produced by the term-frequency fallback after the embedding path failed;
/// the caller decides whether that is worth logging or surfacing.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    Primary(Vec<RoleMatch>),
    Degraded(Vec<RoleMatch>),
}

impl Recommendation {
    pub fn matches(&self) -> &[RoleMatch] {
        match self {
            Self::Primary(matches) | Self::Degraded(matches) => matches,
        }
    }

    pub fn into_matches(self) -> Vec<RoleMatch> {
        match self {
            Self::Primary(matches) | Self::Degraded(matches) => matches,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// Multiplicative discount for candidates below a role's minimum experience:
/// linear decay per missing year, floored so similarity is never discounted
/// below the configured fraction.
pub fn experience_penalty(config: &MatcherConfig, experience_years: u32, min_experience: u32) -> f64 {
    if experience_years >= min_experience {
        return 1.0;
    }
    let gap = f64::from(min_experience - experience_years);
    (1.0 - config.experience_penalty_step * gap).max(config.experience_penalty_floor)
}

/// Ranks catalog roles for a candidate skill set. Holds read-only shared
/// references to the catalog and embedder; every call is stateless, so one
/// recommender serves concurrent requests without locking.
pub struct RoleRecommender {
    catalog: Arc<RoleCatalog>,
    embedder: Arc<dyn SkillEmbedder>,
    config: MatcherConfig,
}

impl RoleRecommender {
    pub fn new(
        catalog: Arc<RoleCatalog>,
        embedder: Arc<dyn SkillEmbedder>,
        config: MatcherConfig,
    ) -> Self {
        Self {
            catalog,
            embedder,
            config,
        }
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Embedding-based ranking: cosine similarity of the mean skill vector
    /// against each role vector, discounted by the experience penalty.
    /// Stable sort keeps catalog order on ties; at most `top_k` entries.
    pub fn rank(
        &self,
        skills: &BTreeSet<String>,
        experience_years: u32,
        top_k: usize,
    ) -> Result<Vec<RoleMatch>, BackendError> {
        let texts: Vec<String> = if skills.is_empty() {
            vec![String::new()]
        } else {
            skills.iter().cloned().collect()
        };
        let candidate = self.embedder.encode_mean(&texts)?;

        let mut matches: Vec<RoleMatch> = self
            .catalog
            .roles()
            .iter()
            .map(|role| {
                let similarity =
                    f64::from(self.embedder.similarity(&candidate, &role.embedding));
                build_match(&self.config, role, skills, experience_years, similarity)
            })
            .collect();

        sort_and_truncate(&mut matches, top_k);
        Ok(matches)
    }

    /// Full pipeline: scrub demographic terms, extract skills from the
    /// resume text, rank via embeddings, and drop to the term-frequency
    /// fallback on any embedding failure.
    pub fn recommend_from_text(
        &self,
        text: &str,
        experience_years: u32,
        top_k: usize,
    ) -> Recommendation {
        let text = remove_bias_terms(text);
        let skills = extract(&text, self.catalog.gazetteer(), &self.config);
        let profile = CandidateProfile::new(skills, experience_years);

        match self.rank(&profile.skills, profile.experience_years, top_k) {
            Ok(matches) => Recommendation::Primary(matches),
            Err(err) => {
                warn!(
                    error = %err,
                    embedder = self.embedder.name(),
                    "embedding path failed; switching to term-frequency fallback"
                );
                Recommendation::Degraded(fallback::rank(
                    &self.catalog,
                    &text,
                    profile.experience_years,
                    top_k,
                    &self.config,
                ))
            }
        }
    }

    /// Rank a pre-built profile (skills already extracted elsewhere).
    pub fn recommend(&self, profile: &CandidateProfile, top_k: usize) -> Recommendation {
        match self.rank(&profile.skills, profile.experience_years, top_k) {
            Ok(matches) => Recommendation::Primary(matches),
            Err(err) => {
                warn!(
                    error = %err,
                    embedder = self.embedder.name(),
                    "embedding path failed; switching to term-frequency fallback"
                );
                let text = profile
                    .skills
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" ");
                Recommendation::Degraded(fallback::rank(
                    &self.catalog,
                    &text,
                    profile.experience_years,
                    top_k,
                    &self.config,
                ))
            }
        }
    }
}

pub(crate) fn build_match(
    config: &MatcherConfig,
    role: &Role,
    skills: &BTreeSet<String>,
    experience_years: u32,
    similarity: f64,
) -> RoleMatch {
    let penalty = experience_penalty(config, experience_years, role.min_experience);
    let matched: Vec<String> = role.required_skills.intersection(skills).cloned().collect();
    let missing: Vec<String> = role.required_skills.difference(skills).cloned().collect();

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

pub(crate) fn sort_and_truncate(matches: &mut Vec<RoleMatch>, top_k: usize) {
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    matches.truncate(top_k.max(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RoleCatalog;
    use crate::embedding::{BackendError, Embedding, HashEmbedder};

    fn fixture_catalog(embedder: &dyn SkillEmbedder) -> Arc<RoleCatalog> {
        let csv = "role,required_skills,min_experience\n\
                   Backend Engineer,\"python,sql,docker\",2\n\
                   Data Analyst,\"sql;pandas;python\",0\n\
                   Frontend Engineer,\"javascript,react,css\",1\n";
        Arc::new(RoleCatalog::from_reader(csv.as_bytes(), embedder).unwrap())
    }

    fn recommender() -> RoleRecommender {
        let embedder: Arc<dyn SkillEmbedder> = Arc::new(HashEmbedder::new(256));
        let catalog = fixture_catalog(embedder.as_ref());
        RoleRecommender::new(catalog, embedder, MatcherConfig::default())
    }

    fn skills(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn penalty_is_one_when_experience_suffices() {
        let config = MatcherConfig::default();
        assert_eq!(experience_penalty(&config, 5, 3), 1.0);
        assert_eq!(experience_penalty(&config, 3, 3), 1.0);
    }

    #[test]
    fn penalty_decays_linearly_with_the_gap() {
        let config = MatcherConfig::default();
        assert!((experience_penalty(&config, 0, 2) - 0.8).abs() < 1e-9);
        assert!((experience_penalty(&config, 1, 3) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn penalty_is_floored() {
        let config = MatcherConfig::default();
        assert_eq!(experience_penalty(&config, 0, 30), 0.6);
    }

    #[test]
    fn penalty_stays_within_bounds_below_requirement() {
        let config = MatcherConfig::default();
        for min_experience in 1..20 {
            for years in 0..min_experience {
                let penalty = experience_penalty(&config, years, min_experience);
                assert!((0.6..1.0).contains(&penalty), "penalty {penalty}");
            }
        }
    }

    #[test]
    fn rank_orders_by_score_and_respects_top_k() {
        let recommender = recommender();
        let matches = recommender
            .rank(&skills(&["python", "sql", "docker"]), 3, 2)
            .unwrap();

        assert_eq!(matches.len(), 2);
        assert!(matches[0].score >= matches[1].score);
        assert_eq!(matches[0].role, "Backend Engineer");
    }

    #[test]
    fn rank_never_exceeds_catalog_size() {
        let recommender = recommender();
        let matches = recommender.rank(&skills(&["python"]), 0, 50).unwrap();
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn zero_top_k_is_clamped_to_one() {
        let recommender = recommender();
        let matches = recommender.rank(&skills(&["python"]), 0, 0).unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn matched_and_missing_partition_the_requirements() {
        let recommender = recommender();
        let candidate = skills(&["python", "react"]);
        for entry in recommender.rank(&candidate, 0, 5).unwrap() {
            let matched: BTreeSet<_> = entry.matched_skills.iter().cloned().collect();
            let missing: BTreeSet<_> = entry.missing_skills.iter().cloned().collect();
            let required: BTreeSet<_> = entry.required_skills.iter().cloned().collect();

            assert!(matched.is_disjoint(&missing));
            let union: BTreeSet<_> = matched.union(&missing).cloned().collect();
            assert_eq!(union, required);
        }
    }

    #[test]
    fn skill_lists_are_sorted_ascending() {
        let recommender = recommender();
        for entry in recommender.rank(&skills(&["python"]), 0, 5).unwrap() {
            let mut sorted = entry.missing_skills.clone();
            sorted.sort();
            assert_eq!(entry.missing_skills, sorted);
        }
    }

    #[test]
    fn empty_skill_set_still_ranks() {
        let recommender = recommender();
        let matches = recommender.rank(&BTreeSet::new(), 0, 5).unwrap();
        assert_eq!(matches.len(), 3);
        assert!(matches.iter().all(|m| (0.0..=1.0).contains(&m.score)));
        assert!(matches.iter().all(|m| m.matched_skills.is_empty()));
    }

    #[test]
    fn single_role_example_end_to_end() {
        let embedder: Arc<dyn SkillEmbedder> = Arc::new(HashEmbedder::new(256));
        let csv = "role,required_skills,min_experience\n\
                   Backend Engineer,\"python,sql,docker\",2\n";
        let catalog = Arc::new(RoleCatalog::from_reader(csv.as_bytes(), embedder.as_ref()).unwrap());
        let recommender = RoleRecommender::new(catalog, embedder, MatcherConfig::default());

        let matches = recommender.rank(&skills(&["python"]), 0, 5).unwrap();
        assert_eq!(matches.len(), 1);
        let entry = &matches[0];
        assert_eq!(entry.matched_skills, vec!["python".to_string()]);
        assert_eq!(
            entry.missing_skills,
            vec!["docker".to_string(), "sql".to_string()]
        );
        assert!((entry.experience_penalty - 0.8).abs() < 1e-9);
        assert!((entry.score - entry.similarity * 0.8).abs() < 1e-9);
    }

    struct FailingEmbedder;

    impl SkillEmbedder for FailingEmbedder {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn version(&self) -> &str {
            "v0"
        }
        fn dimension(&self) -> usize {
            8
        }
        fn encode(&self, _texts: &[String]) -> Result<Vec<Embedding>, BackendError> {
            Err(BackendError::Unavailable("forced failure".into()))
        }
    }

    #[test]
    fn backend_failure_degrades_instead_of_erroring() {
        let loader = HashEmbedder::new(8);
        let catalog = fixture_catalog(&loader);
        let recommender = RoleRecommender::new(
            catalog,
            Arc::new(FailingEmbedder),
            MatcherConfig::default(),
        );

        let outcome =
            recommender.recommend_from_text("Python and SQL developer, 1 yr docker", 0, 5);
        assert!(outcome.is_degraded());
        assert_eq!(outcome.matches().len(), 3);
        assert!(outcome
            .matches()
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn demographic_terms_do_not_change_the_ranking() {
        let recommender = recommender();
        let plain = recommender.recommend_from_text("python and sql developer", 2, 5);
        let biased = recommender.recommend_from_text(
            "married female python and sql developer, age 40",
            2,
            5,
        );
        assert_eq!(plain.matches(), biased.matches());
    }

    #[test]
    fn recommend_from_text_extracts_and_ranks() {
        let recommender = recommender();
        let outcome = recommender.recommend_from_text(
            "Senior developer, 3 yrs JS dev, reactjs expert with css",
            2,
            1,
        );
        assert!(!outcome.is_degraded());
        let matches = outcome.matches();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].role, "Frontend Engineer");
        assert!(matches[0]
            .matched_skills
            .contains(&"javascript".to_string()));
    }
}
