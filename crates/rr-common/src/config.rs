/// Tunables for extraction and ranking.
///
/// The fuzzy thresholds and the penalty floor are empirically chosen; they
/// are kept as configuration (with `RR_*` env overrides) rather than baked
/// constants so deployments can retune them.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Minimum token-sort ratio (0..=100) for the extractor's fuzzy pass.
    pub fuzzy_extract_threshold: f64,
    /// Minimum token-sort ratio (0..=100) for the fallback recommender's
    /// matched-skill detection.
    pub fallback_match_threshold: f64,
    /// Lower bound of the experience penalty: a candidate is never scored
    /// below this fraction of the raw similarity.
    pub experience_penalty_floor: f64,
    /// Penalty decay per missing year of experience.
    pub experience_penalty_step: f64,
    /// Minimum token-sort ratio (0..=100) for fuzzy course lookup; below it
    /// the catalog-level fallback pick is used instead.
    pub course_match_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_extract_threshold: 82.0,
            fallback_match_threshold: 85.0,
            experience_penalty_floor: 0.6,
            experience_penalty_step: 0.1,
            course_match_threshold: 60.0,
        }
    }
}

impl MatcherConfig {
    /// Load the config from `RR_*` environment variables, falling back to
    /// defaults for anything absent or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fuzzy_extract_threshold: env_f64(
                "RR_FUZZY_EXTRACT_THRESHOLD",
                defaults.fuzzy_extract_threshold,
            ),
            fallback_match_threshold: env_f64(
                "RR_FALLBACK_MATCH_THRESHOLD",
                defaults.fallback_match_threshold,
            ),
            experience_penalty_floor: env_f64(
                "RR_PENALTY_FLOOR",
                defaults.experience_penalty_floor,
            ),
            experience_penalty_step: env_f64("RR_PENALTY_STEP", defaults.experience_penalty_step),
            course_match_threshold: env_f64(
                "RR_COURSE_MATCH_THRESHOLD",
                defaults.course_match_threshold,
            ),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
