use std::collections::BTreeSet;

use crate::skill_normalizer::normalize_skill;

const SKILL_DELIMITERS: [char; 3] = [';', '|', ','];

/// Split one delimiter-separated skill field into canonical terms. Blank
/// fragments contribute nothing; malformed input never errors.
pub fn split_skills(field: &str) -> Vec<String> {
    field
        .split(SKILL_DELIMITERS)
        .map(normalize_skill)
        .filter(|s| !s.is_empty())
        .collect()
}

/// The reference vocabulary of canonical skill terms, built once from the
/// role catalog and read-only afterwards. Iteration order is the sorted term
/// order, so membership sweeps are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gazetteer {
    terms: BTreeSet<String>,
}

impl Gazetteer {
    /// Build from raw skill/certification fields, one string per field.
    pub fn build<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms = BTreeSet::new();
        for field in fields {
            for term in split_skills(field.as_ref()) {
                terms.insert(term);
            }
        }
        Self { terms }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
