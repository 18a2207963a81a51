use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use rr_common::catalog::RoleCatalog;
use rr_common::config::MatcherConfig;
use rr_common::courses::CourseCatalog;
use rr_common::embedding::{init_embedder_from_env, SkillEmbedder};
use rr_common::logging::init_logging;
use rr_common::recommender::{RoleRecommender, DEFAULT_TOP_K};
use tracing::{error, info};

fn main() -> ExitCode {
    init_logging("rr-analyzer");

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: rr-analyzer <roles.csv> <resume.txt> [experience_years] [top_k]");
        return ExitCode::FAILURE;
    }

    let roles_path = Path::new(&args[1]);
    let resume_path = Path::new(&args[2]);
    let experience_years: u32 = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let top_k: usize = args
        .get(4)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TOP_K);

    let resume_text = match std::fs::read_to_string(resume_path) {
        Ok(text) => text,
        Err(err) => {
            error!(path = %resume_path.display(), error = %err, "failed to read resume");
            return ExitCode::FAILURE;
        }
    };

    let config = MatcherConfig::from_env();
    let embedder: Arc<dyn SkillEmbedder> = Arc::from(init_embedder_from_env());
    let catalog = match RoleCatalog::load(roles_path, embedder.as_ref()) {
        Ok(catalog) => Arc::new(catalog),
        Err(err) => {
            error!(path = %roles_path.display(), error = %err, "failed to load role catalog");
            return ExitCode::FAILURE;
        }
    };
    info!(
        roles = catalog.len(),
        gazetteer_terms = catalog.gazetteer().len(),
        embedder = embedder.name(),
        "role catalog loaded"
    );

    let recommender = RoleRecommender::new(Arc::clone(&catalog), embedder, config.clone());
    let outcome = recommender.recommend_from_text(&resume_text, experience_years, top_k);
    if outcome.is_degraded() {
        info!("ranking produced by the term-frequency fallback");
    }

    let matches = outcome.into_matches();
    match serde_json::to_string_pretty(&matches) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            error!(error = %err, "failed to serialize ranking");
            return ExitCode::FAILURE;
        }
    }

    // Optional learning plan for the top match, when a course catalog is
    // supplied via RR_COURSES_PATH.
    if let (Some(path), Some(top)) = (std::env::var_os("RR_COURSES_PATH"), matches.first()) {
        match CourseCatalog::load(Path::new(&path)) {
            Ok(courses) => {
                let plan = courses.build_learning_plan(
                    top.missing_skills.iter().map(String::as_str),
                    &config,
                );
                match serde_json::to_string_pretty(&plan) {
                    Ok(json) => println!("{json}"),
                    Err(err) => error!(error = %err, "failed to serialize learning plan"),
                }
            }
            Err(err) => error!(error = %err, "failed to load course catalog"),
        }
    }

    ExitCode::SUCCESS
}
