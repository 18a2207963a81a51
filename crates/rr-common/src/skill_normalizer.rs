use std::collections::HashMap;
use std::sync::LazyLock;

use strsim::damerau_levenshtein;
use unicode_normalization::UnicodeNormalization;

/// Skill alias → canonical form (O(1) lookup).
static ALIAS_TO_CANONICAL: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let aliases: &[(&str, &[&str])] = &[
        // Languages
        (
            "javascript",
            &["js", "java script", "ecmascript", "es6", "es2015"],
        ),
        ("typescript", &["ts", "type script"]),
        ("python", &["py", "python3", "python 3"]),
        ("java", &["java8", "java11", "java17", "openjdk"]),
        ("csharp", &["c#", "c sharp", ".net", "dotnet"]),
        ("cplusplus", &["c++", "cpp", "c plus plus"]),
        ("golang", &["go", "go lang"]),
        ("rust", &["rust lang", "rust language"]),
        // Frontend
        ("react", &["reactjs", "react.js", "react js"]),
        ("nextjs", &["next.js", "next js"]),
        ("vue", &["vuejs", "vue.js", "vue js"]),
        ("angular", &["angularjs", "angular.js"]),
        ("css", &["css3", "cascading style sheets"]),
        // Backend / runtime
        ("nodejs", &["node", "node.js", "node js"]),
        ("django", &["django rest framework", "drf"]),
        ("express", &["expressjs", "express.js", "express js"]),
        ("fastapi", &["fast api"]),
        // Data stores
        ("postgresql", &["postgres", "pgsql", "postgre sql"]),
        ("mysql", &["my sql", "mariadb"]),
        ("mongodb", &["mongo", "mongo db"]),
        ("sql", &["structured query language"]),
        ("elasticsearch", &["elastic search"]),
        // Cloud / DevOps
        ("aws", &["amazon web services", "amazon aws", "aws cloud"]),
        ("gcp", &["google cloud platform", "google cloud"]),
        ("azure", &["microsoft azure", "ms azure"]),
        ("docker", &["docker container", "containerization"]),
        ("kubernetes", &["k8s", "kube"]),
        ("terraform", &["infrastructure as code", "iac"]),
        ("continuous integration", &["ci/cd", "cicd", "ci cd"]),
        ("site reliability engineering", &["sre"]),
        // AI / ML
        ("machine learning", &["ml"]),
        ("artificial intelligence", &["ai"]),
        ("natural language processing", &["nlp"]),
        ("deep learning", &["deeplearning", "neural networks"]),
        ("tensorflow", &["tf", "tensor flow"]),
        ("pytorch", &["pt", "torch", "py torch"]),
        // Data
        ("pandas", &["python pandas"]),
        ("numpy", &["numerical python"]),
        ("spark", &["apache spark"]),
        ("kafka", &["apache kafka"]),
    ];

    let mut map = HashMap::new();
    for (canonical, alias_list) in aliases {
        map.insert(*canonical, *canonical);
        for alias in *alias_list {
            map.insert(*alias, *canonical);
        }
    }
    map
});

/// Alias map keyed by separator-stripped compact form, to absorb minor
/// punctuation and spacing differences ("node.js" vs "node js").
static COMPACT_ALIAS_TO_CANONICAL: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (alias, canonical) in ALIAS_TO_CANONICAL.iter() {
        map.entry(compact_key(alias)).or_insert(*canonical);
    }
    map
});

fn nfkc_lower_trim(input: &str) -> String {
    input.nfkc().collect::<String>().trim().to_lowercase()
}

fn compact_key(input: &str) -> String {
    input
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-' | '_' | '/' | ','))
        .collect()
}

fn match_canonical_token(token: &str) -> Option<String> {
    if token.is_empty() {
        return None;
    }

    if let Some(canonical) = ALIAS_TO_CANONICAL.get(token) {
        return Some((*canonical).to_string());
    }

    let compact = compact_key(token);
    if let Some(canonical) = COMPACT_ALIAS_TO_CANONICAL.get(&compact) {
        return Some((*canonical).to_string());
    }

    fuzzy_match_canonical(&compact)
}

fn fuzzy_match_canonical(compact: &str) -> Option<String> {
    // Short tokens (java, go, sql) are only matched exactly; a one-edit
    // tolerance on them would swallow unrelated terms.
    if compact.len() < 5 {
        return None;
    }

    let mut best: Option<(&str, usize)> = None;
    for (alias, canonical) in COMPACT_ALIAS_TO_CANONICAL.iter() {
        if alias.len() < 5 || canonical.len() < 5 {
            continue;
        }

        let distance = damerau_levenshtein(compact, alias);
        if distance == 0 {
            return Some((*canonical).to_string());
        }

        let len = compact.len().max(alias.len());
        let acceptable = distance == 1 || (len >= 8 && distance == 2);
        if !acceptable {
            continue;
        }

        match best {
            None => best = Some((*canonical, distance)),
            Some((_, best_dist)) if distance < best_dist => best = Some((*canonical, distance)),
            _ => {}
        }
    }

    best.map(|(canonical, _)| canonical.to_string())
}

/// Canonicalize one skill string: NFKC fold, trim, lowercase, alias
/// substitution. Pure and idempotent; unknown terms pass through lowercased.
pub fn normalize_skill(skill: &str) -> String {
    let normalized = nfkc_lower_trim(skill);
    if let Some(canonical) = match_canonical_token(&normalized) {
        return canonical;
    }
    normalized
}

/// Normalize a batch into a sorted, deduplicated Vec. Blank entries and
/// single-character fragments are dropped.
pub fn normalize_skills_vec(skills: &[String]) -> Vec<String> {
    let mut result: Vec<String> = skills
        .iter()
        .map(|s| normalize_skill(s))
        .filter(|s| s.len() >= 2)
        .collect();
    result.sort();
    result.dedup();
    result
}
