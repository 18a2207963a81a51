use std::sync::LazyLock;

use regex::Regex;

/// Demographic terms that must never influence a ranking.
const BIAS_TERMS: [&str; 4] = ["male", "female", "age", "married"];

static BIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?i)\b(?:{})\b", BIAS_TERMS.join("|"));
    Regex::new(&pattern).expect("bias pattern is valid")
});

/// Strip demographic terms from free text before any matching runs. Matches
/// whole words only, case-insensitively; embedded occurrences ("language",
/// "management") are left alone.
pub fn remove_bias_terms(text: &str) -> String {
    BIAS_RE.replace_all(text, "").into_owned()
}
