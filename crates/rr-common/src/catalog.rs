use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::embedding::{BackendError, SkillEmbedder};
use crate::gazetteer::{split_skills, Gazetteer};
use crate::Role;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("reference dataset missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

const REQUIRED_COLUMNS: [&str; 2] = ["role", "required_skills"];

#[derive(Debug, Default, Deserialize)]
struct RoleRow {
    #[serde(default)]
    role: String,
    #[serde(default)]
    required_skills: String,
    #[serde(default)]
    min_experience: Option<String>,
    #[serde(default)]
    certifications: Option<String>,
}

/// The role reference dataset: loaded once at startup, read-only afterwards.
/// Owns every `Role` and the gazetteer derived from the same rows; share it
/// across request handlers behind an `Arc`.
#[derive(Debug)]
pub struct RoleCatalog {
    roles: Vec<Role>,
    gazetteer: Gazetteer,
}

impl RoleCatalog {
    pub fn load(path: &Path, embedder: &dyn SkillEmbedder) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(file, embedder)
    }

    /// Parse the tabular source. Missing `role`/`required_skills` headers
    /// fail fast; individual malformed rows are skipped with a warning.
    pub fn from_reader<R: Read>(
        reader: R,
        embedder: &dyn SkillEmbedder,
    ) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        // Headers are matched case-insensitively; lowering the record here
        // keeps row deserialization in agreement with the schema check.
        let headers: csv::StringRecord = reader
            .headers()?
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !headers.iter().any(|h| h == **required))
            .map(|required| (*required).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::Schema { missing });
        }
        reader.set_headers(headers);

        let mut roles: Vec<Role> = Vec::new();
        let mut skill_fields: Vec<String> = Vec::new();

        for record in reader.deserialize::<RoleRow>() {
            let row = match record {
                Ok(row) => row,
                Err(err) => {
                    warn!(error = %err, "skipping malformed catalog row");
                    continue;
                }
            };

            skill_fields.push(row.required_skills.clone());
            if let Some(certifications) = &row.certifications {
                skill_fields.push(certifications.clone());
            }

            if roles
                .iter()
                .any(|existing| existing.name.eq_ignore_ascii_case(&row.role))
            {
                warn!(role = %row.role, "duplicate role name; keeping the first occurrence");
                continue;
            }

            let skills: BTreeSet<String> = split_skills(&row.required_skills).into_iter().collect();
            let min_experience = parse_min_experience(row.min_experience.as_deref());

            // A role with no parseable skills still gets a usable vector via
            // the single-empty-string convention.
            let texts: Vec<String> = if skills.is_empty() {
                vec![String::new()]
            } else {
                skills.iter().cloned().collect()
            };
            let embedding = embedder.encode_mean(&texts)?;

            match Role::new(row.role, skills, min_experience, embedding) {
                Ok(role) => roles.push(role),
                Err(err) => warn!(error = %err, "skipping catalog row"),
            }
        }

        Ok(Self {
            roles,
            gazetteer: Gazetteer::build(&skill_fields),
        })
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Case-insensitive lookup by role name.
    pub fn find_role(&self, name: &str) -> Option<&Role> {
        self.roles
            .iter()
            .find(|role| role.name.eq_ignore_ascii_case(name))
    }
}

fn parse_min_experience(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return 0;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.parse::<i64>() {
        Ok(years) if years >= 0 => u32::try_from(years).unwrap_or(u32::MAX),
        Ok(_) | Err(_) => {
            warn!(value = trimmed, "non-numeric min_experience; defaulting to 0");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;

    fn load(csv: &str) -> Result<RoleCatalog, CatalogError> {
        let embedder = HashEmbedder::new(64);
        RoleCatalog::from_reader(csv.as_bytes(), &embedder)
    }

    #[test]
    fn loads_roles_with_parsed_skills() {
        let catalog = load(
            "role,required_skills,min_experience\n\
             Backend Engineer,\"python,sql,docker\",2\n\
             Data Analyst,\"sql;pandas\",0\n",
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let backend = catalog.find_role("backend engineer").unwrap();
        assert_eq!(backend.min_experience, 2);
        assert!(backend.required_skills.contains("docker"));
        assert!(catalog.gazetteer().contains("pandas"));
    }

    #[test]
    fn header_case_does_not_affect_row_parsing() {
        let catalog = load(
            "Role,Required_Skills,Min_Experience\n\
             Backend Engineer,\"python,sql\",2\n",
        )
        .unwrap();

        assert_eq!(catalog.len(), 1);
        let backend = catalog.find_role("Backend Engineer").unwrap();
        assert_eq!(backend.min_experience, 2);
        assert!(backend.required_skills.contains("python"));
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let err = load("role,headcount\nBackend Engineer,3\n").unwrap_err();
        match err {
            CatalogError::Schema { missing } => {
                assert_eq!(missing, vec!["required_skills".to_string()]);
            }
            other => panic!("expected schema error, got {other}"),
        }
    }

    #[test]
    fn malformed_experience_defaults_to_zero() {
        let catalog = load(
            "role,required_skills,min_experience\n\
             Backend Engineer,python,not-a-number\n\
             Platform Engineer,kubernetes,-3\n",
        )
        .unwrap();
        assert!(catalog.roles().iter().all(|r| r.min_experience == 0));
    }

    #[test]
    fn empty_skill_list_still_gets_a_usable_vector() {
        let catalog = load("role,required_skills\nGeneralist,\n").unwrap();
        let role = catalog.find_role("Generalist").unwrap();
        assert!(role.required_skills.is_empty());
        assert!(role.embedding.vector.iter().any(|v| *v != 0.0));
    }

    #[test]
    fn duplicate_role_names_keep_first() {
        let catalog = load(
            "role,required_skills,min_experience\n\
             Backend Engineer,python,1\n\
             backend engineer,golang,9\n",
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find_role("Backend Engineer").unwrap().min_experience, 1);
    }

    #[test]
    fn certifications_feed_the_gazetteer_only() {
        let catalog = load(
            "role,required_skills,certifications\n\
             Cloud Engineer,terraform,\"aws|gcp\"\n",
        )
        .unwrap();
        assert!(catalog.gazetteer().contains("aws"));
        assert!(catalog.gazetteer().contains("gcp"));
        let role = catalog.find_role("Cloud Engineer").unwrap();
        assert!(!role.required_skills.contains("aws"));
    }
}
