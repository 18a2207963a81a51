use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::CatalogError;
use crate::config::MatcherConfig;
use crate::extractor::token_sort_ratio;
use crate::skill_normalizer::normalize_skill;

const REQUIRED_COLUMNS: [&str; 2] = ["skill", "course_title"];

#[derive(Debug, Default, Deserialize)]
struct CourseRow {
    #[serde(default)]
    skill: String,
    #[serde(default)]
    course_title: String,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    duration_hours: Option<String>,
    #[serde(default)]
    level: Option<String>,
}

/// One course record handed to learning-plan construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub skill: String,
    pub title: String,
    pub platform: String,
    pub link: String,
    pub duration_hours: f64,
    pub level: String,
}

/// Course reference data keyed by canonical skill. Loaded once; lookups are
/// read-only and never come back empty, so learning-plan construction always
/// has material to work with.
#[derive(Debug, Default)]
pub struct CourseCatalog {
    courses: Vec<Course>,
    by_skill: BTreeMap<String, Vec<usize>>,
}

impl CourseCatalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        // Lower the header record so row deserialization matches the
        // case-insensitive schema check.
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

        let mut courses = Vec::new();
        let mut by_skill: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for record in reader.deserialize::<CourseRow>() {
            let row = match record {
                Ok(row) => row,
                Err(err) => {
                    warn!(error = %err, "skipping malformed course row");
                    continue;
                }
            };
            if row.skill.trim().is_empty() || row.course_title.trim().is_empty() {
                warn!("skipping course row with blank skill or title");
                continue;
            }

            let skill = normalize_skill(&row.skill);
            let course = Course {
                skill: skill.clone(),
                title: row.course_title,
                platform: row.platform.unwrap_or_default(),
                link: row.link.unwrap_or_default(),
                duration_hours: parse_duration(row.duration_hours.as_deref()),
                level: row.level.unwrap_or_else(|| "Beginner".into()),
            };
            by_skill.entry(skill).or_default().push(courses.len());
            courses.push(course);
        }

        Ok(Self { courses, by_skill })
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Courses for one skill: exact canonical hit, else the closest fuzzy
    /// skill above the configured ratio, else a catalog-level fallback pick.
    /// Always at least one entry.
    pub fn lookup(&self, skill: &str, config: &MatcherConfig) -> Vec<Course> {
        let canonical = normalize_skill(skill);

        if let Some(indices) = self.by_skill.get(&canonical) {
            return indices.iter().map(|&i| self.courses[i].clone()).collect();
        }

        let mut best: Option<(&str, f64)> = None;
        for known in self.by_skill.keys() {
            let ratio = token_sort_ratio(&canonical, known);
            if best.is_none_or(|(_, best_ratio)| ratio > best_ratio) {
                best = Some((known, ratio));
            }
        }
        if let Some((known, ratio)) = best {
            if ratio >= config.course_match_threshold {
                let indices = &self.by_skill[known];
                return indices.iter().map(|&i| self.courses[i].clone()).collect();
            }
        }

        vec![self.fallback_pick(&canonical)]
    }

    /// Map every missing skill to its course list, in sorted skill order.
    pub fn build_learning_plan<'a, I>(
        &self,
        missing_skills: I,
        config: &MatcherConfig,
    ) -> BTreeMap<String, Vec<Course>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        missing_skills
            .into_iter()
            .map(|skill| {
                let canonical = normalize_skill(skill);
                let courses = self.lookup(skill, config);
                (canonical, courses)
            })
            .collect()
    }

    /// Best-effort pick when nothing matches: the first catalog entry, or a
    /// built-in foundations course for an empty catalog.
    fn fallback_pick(&self, canonical: &str) -> Course {
        match self.courses.first() {
            Some(course) => {
                let mut course = course.clone();
                course.skill = canonical.to_string();
                course
            }
            None => Course {
                skill: canonical.to_string(),
                title: "General IT Foundations".into(),
                platform: "Coursera".into(),
                link: String::new(),
                duration_hours: 0.0,
                level: "Beginner".into(),
            },
        }
    }
}

fn parse_duration(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|hours| hours.is_finite() && *hours >= 0.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CourseCatalog {
        let csv = "skill,platform,course_title,link,duration_hours,level\n\
                   python,Coursera,Python for Everybody,https://example.com/py,40,Beginner\n\
                   python,edX,Advanced Python,https://example.com/py2,30,Advanced\n\
                   docker,Udemy,Docker Mastery,https://example.com/docker,25,Intermediate\n";
        CourseCatalog::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn exact_lookup_returns_all_courses_for_the_skill() {
        let courses = catalog().lookup("Python", &MatcherConfig::default());
        assert_eq!(courses.len(), 2);
        assert!(courses.iter().all(|c| c.skill == "python"));
    }

    #[test]
    fn alias_resolution_applies_before_lookup() {
        let courses = catalog().lookup("py", &MatcherConfig::default());
        assert_eq!(courses[0].skill, "python");
    }

    #[test]
    fn fuzzy_lookup_recovers_close_misses() {
        let courses = catalog().lookup("dockre", &MatcherConfig::default());
        assert!(courses.iter().all(|c| c.skill == "docker"));
    }

    #[test]
    fn unknown_skill_still_gets_a_fallback_pick() {
        let courses = catalog().lookup("underwater basket weaving", &MatcherConfig::default());
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].skill, "underwater basket weaving");
        assert!(!courses[0].title.is_empty());
    }

    #[test]
    fn empty_catalog_falls_back_to_builtin_course() {
        let empty = CourseCatalog::from_reader("skill,course_title\n".as_bytes()).unwrap();
        let courses = empty.lookup("sql", &MatcherConfig::default());
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "General IT Foundations");
    }

    #[test]
    fn header_case_does_not_affect_row_parsing() {
        let csv = "Skill,Platform,Course_Title,Link,Duration_Hours,Level\n\
                   sql,Coursera,SQL Basics,https://example.com/sql,20,Beginner\n";
        let catalog = CourseCatalog::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 1);
        let courses = catalog.lookup("sql", &MatcherConfig::default());
        assert_eq!(courses[0].title, "SQL Basics");
        assert_eq!(courses[0].duration_hours, 20.0);
    }

    #[test]
    fn missing_required_header_fails_fast() {
        let err = CourseCatalog::from_reader("skill,link\npython,x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::Schema { .. }));
    }

    #[test]
    fn learning_plan_covers_every_missing_skill() {
        let catalog = catalog();
        let config = MatcherConfig::default();
        let plan = catalog.build_learning_plan(["docker", "sql"], &config);

        assert_eq!(plan.len(), 2);
        assert!(plan.values().all(|courses| !courses.is_empty()));
        assert!(plan.contains_key("docker"));
        assert!(plan.contains_key("sql"));
    }

    #[test]
    fn malformed_duration_defaults_to_zero() {
        let csv = "skill,course_title,duration_hours\nsql,SQL Basics,soon\n";
        let catalog = CourseCatalog::from_reader(csv.as_bytes()).unwrap();
        let courses = catalog.lookup("sql", &MatcherConfig::default());
        assert_eq!(courses[0].duration_hours, 0.0);
    }
}
