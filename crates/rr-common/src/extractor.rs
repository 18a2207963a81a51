use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use strsim::normalized_levenshtein;

use crate::config::MatcherConfig;
use crate::gazetteer::Gazetteer;
use crate::skill_normalizer::normalize_skill;

/// Maximal runs of alphanumerics plus the symbol characters that occur in
/// real skill names (c++, c#, node.js, ci-cd).
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9+#.\-]+").expect("token pattern is valid"));

/// Largest token window considered by the fuzzy pass. Multi-word skill names
/// in the catalog top out at three tokens; longer windows only add false
/// positives.
const MAX_WINDOW: usize = 3;

/// Token-order-insensitive similarity on a 0..=100 scale: both sides are
/// tokenized, sorted and rejoined before a normalized Levenshtein ratio.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&sorted_tokens(a), &sorted_tokens(b)) * 100.0
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Scan text for known skills: an exact substring pass over the gazetteer,
/// then a fuzzy pass over 1..=3-token windows. Returns canonical terms as a
/// set; empty input yields an empty set.
pub fn extract(text: &str, gazetteer: &Gazetteer, config: &MatcherConfig) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let text_low = text.to_lowercase();
    if text_low.trim().is_empty() {
        return found;
    }

    for term in gazetteer.iter() {
        if text_low.contains(term) {
            found.insert(term.to_string());
        }
    }

    let tokens = tokenize(&text_low);
    for start in 0..tokens.len() {
        for width in 1..=MAX_WINDOW {
            let Some(window) = tokens.get(start..start + width) else {
                break;
            };
            let phrase = window.join(" ");

            // Alias resolution first: "js" and "k8s" are windows the ratio
            // test alone would never accept.
            let canonical = normalize_skill(&phrase);
            if gazetteer.contains(&canonical) {
                found.insert(canonical);
                continue;
            }

            if let Some(term) = best_fuzzy_term(&phrase, gazetteer, config.fuzzy_extract_threshold)
            {
                found.insert(normalize_skill(term));
            }
        }
    }

    found
}

fn best_fuzzy_term<'g>(phrase: &str, gazetteer: &'g Gazetteer, threshold: f64) -> Option<&'g str> {
    let mut best: Option<(&str, f64)> = None;
    for term in gazetteer.iter() {
        let ratio = token_sort_ratio(phrase, term);
        if best.is_none_or(|(_, best_ratio)| ratio > best_ratio) {
            best = Some((term, ratio));
        }
    }
    best.and_then(|(term, ratio)| (ratio >= threshold).then_some(term))
}
