//! Mission definitions

use serde::{Deserialize, Serialize};

/// One mission on the map: a single question with guidance afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionDefinition {
    /// Stable identifier, unique within a catalog
    pub key: String,
    pub title: String,
    pub prompt: String,
    /// Answer options in display order
    pub options: Vec<String>,
    pub correct_index: usize,
    /// Guidance shown after answering, right or wrong
    pub feedback: String,
}

impl MissionDefinition {
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }

    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    pub fn correct_option(&self) -> &str {
        self.option(self.correct_index).unwrap_or_default()
    }
}
