pub mod catalog;
pub mod config;
pub mod courses;
pub mod embedding;
pub mod extractor;
pub mod fairness;
pub mod gazetteer;
pub mod logging;
pub mod recommender;
pub mod skill_normalizer;

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::embedding::Embedding;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRole {
    #[error("role name is empty")]
    EmptyName,
}

/// One job role from the reference catalog. Built once at load time and
/// immutable for the process lifetime; the catalog owns every instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub name: String,
    pub required_skills: BTreeSet<String>,
    pub min_experience: u32,
    pub embedding: Embedding,
}

impl Role {
    pub fn new(
        name: impl Into<String>,
        required_skills: BTreeSet<String>,
        min_experience: u32,
        embedding: Embedding,
    ) -> Result<Self, InvalidRole> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InvalidRole::EmptyName);
        }
        Ok(Self {
            name,
            required_skills,
            min_experience,
            embedding,
        })
    }
}

/// Per-request candidate state: the extracted skill set plus stated
/// experience. Never persisted by this core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateProfile {
    pub skills: BTreeSet<String>,
    pub experience_years: u32,
}

impl CandidateProfile {
    pub fn new(skills: BTreeSet<String>, experience_years: u32) -> Self {
        Self {
            skills,
            experience_years,
        }
    }
}

/// One ranked entry of a recommendation response. Skill lists are sorted
/// ascending so responses compare deterministically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleMatch {
    pub role: String,
    pub score: f64,
    pub similarity: f64,
    pub experience_penalty: f64,
    pub min_experience: u32,
    pub required_skills: Vec<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_rejects_empty_name() {
        let embedding = Embedding::new(vec![0.0], "hash");
        let err = Role::new("  ", BTreeSet::new(), 0, embedding).unwrap_err();
        assert_eq!(err, InvalidRole::EmptyName);
    }

    #[test]
    fn role_accepts_plain_name() {
        let embedding = Embedding::new(vec![0.0], "hash");
        let role = Role::new("Backend Engineer", BTreeSet::new(), 2, embedding).unwrap();
        assert_eq!(role.name, "Backend Engineer");
        assert_eq!(role.min_experience, 2);
    }
}
