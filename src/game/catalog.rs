//! Mission catalog
//!
//! The catalog is declarative content: a list of departments offered at
//! registration and the missions shown on the map, in order. It is loaded
//! once, validated, and then only read.

use crate::data::MissionDefinition;
use crate::AdventureError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Content compiled into the binary
const BUILTIN_CATALOG: &str = include_str!("../../content/catalog.toml");

/// Points awarded for a correct answer
pub const MISSION_POINTS: u32 = 100;

/// Problems found while loading a catalog
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Catalog has no {0}")]
    Empty(&'static str),

    #[error("Duplicate mission key: {0}")]
    DuplicateKey(String),

    #[error("Duplicate department: {0}")]
    DuplicateDepartment(String),

    #[error("Mission {key} has {count} option(s), at least 2 are required")]
    TooFewOptions { key: String, count: usize },

    #[error("Mission {key}: correct index {index} is out of range ({options} options)")]
    CorrectIndexOutOfRange {
        key: String,
        index: usize,
        options: usize,
    },

    #[error("Mission {key}: {field} is blank")]
    Blank { key: String, field: &'static str },
}

/// On-disk shape of a catalog document
#[derive(Debug, Deserialize)]
struct CatalogFile {
    departments: Vec<String>,
    missions: Vec<MissionDefinition>,
}

/// The validated, immutable set of missions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    departments: Vec<String>,
    missions: Vec<MissionDefinition>,
}

impl Catalog {
    /// Build a catalog, checking every content invariant
    pub fn new(
        departments: Vec<String>,
        missions: Vec<MissionDefinition>,
    ) -> std::result::Result<Self, CatalogError> {
        if departments.is_empty() {
            return Err(CatalogError::Empty("departments"));
        }
        if missions.is_empty() {
            return Err(CatalogError::Empty("missions"));
        }

        let mut seen_departments = HashSet::new();
        for department in &departments {
            if department.trim().is_empty() {
                return Err(CatalogError::Blank {
                    key: "<departments>".to_string(),
                    field: "department name",
                });
            }
            if !seen_departments.insert(department.as_str()) {
                return Err(CatalogError::DuplicateDepartment(department.clone()));
            }
        }

        let mut seen_keys = HashSet::new();
        for mission in &missions {
            if mission.key.trim().is_empty() {
                return Err(CatalogError::Blank {
                    key: mission.title.clone(),
                    field: "key",
                });
            }
            if !seen_keys.insert(mission.key.as_str()) {
                return Err(CatalogError::DuplicateKey(mission.key.clone()));
            }
            if mission.title.trim().is_empty() {
                return Err(CatalogError::Blank {
                    key: mission.key.clone(),
                    field: "title",
                });
            }
            if mission.prompt.trim().is_empty() {
                return Err(CatalogError::Blank {
                    key: mission.key.clone(),
                    field: "prompt",
                });
            }
            if mission.options.len() < 2 {
                return Err(CatalogError::TooFewOptions {
                    key: mission.key.clone(),
                    count: mission.options.len(),
                });
            }
            if mission.correct_index >= mission.options.len() {
                return Err(CatalogError::CorrectIndexOutOfRange {
                    key: mission.key.clone(),
                    index: mission.correct_index,
                    options: mission.options.len(),
                });
            }
        }

        Ok(Self {
            departments,
            missions,
        })
    }

    /// Parse and validate a TOML catalog document
    pub fn from_toml_str(source: &str) -> std::result::Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(source)?;
        Self::new(file.departments, file.missions)
    }

    /// Load a catalog from a TOML file
    pub fn load(path: &Path) -> std::result::Result<Self, CatalogError> {
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_toml_str(&source)?;
        tracing::info!(
            path = %path.display(),
            missions = catalog.missions.len(),
            departments = catalog.departments.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// The three-mission catalog shipped with the game
    pub fn builtin() -> std::result::Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Look up a mission by key
    pub fn get(&self, key: &str) -> std::result::Result<&MissionDefinition, AdventureError> {
        self.missions
            .iter()
            .find(|m| m.key == key)
            .ok_or_else(|| AdventureError::UnknownMission(key.to_string()))
    }

    /// All missions in map order
    pub fn all(&self) -> &[MissionDefinition] {
        &self.missions
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.missions.iter().position(|m| m.key == key)
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    /// True when every mission key is in `completed`
    pub fn is_complete(&self, completed: &HashSet<String>) -> bool {
        self.missions.iter().all(|m| completed.contains(&m.key))
    }

    pub fn departments(&self) -> &[String] {
        &self.departments
    }

    pub fn contains_department(&self, department: &str) -> bool {
        self.departments.iter().any(|d| d == department)
    }

    pub fn max_score(&self) -> u32 {
        u32::try_from(self.missions.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(MISSION_POINTS)
    }
}
