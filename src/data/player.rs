//! Player identity and progression

use serde::{Deserialize, Serialize};

/// The registered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub department: String,
}

impl User {
    pub fn new(name: &str, department: &str) -> Self {
        Self {
            name: name.to_string(),
            department: department.to_string(),
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.department)
    }
}

/// The single answer given for a mission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub mission: String,
    pub chosen: usize,
    pub correct: bool,
}

/// Title awarded on the ending screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rank {
    Apprentice,          // less than half right
    Practitioner,        // at least half right
    Champion,            // everything right
}

impl Rank {
    pub fn from_answers(correct: usize, total: usize) -> Self {
        if total == 0 || correct >= total {
            Rank::Champion
        } else if correct * 2 >= total {
            Rank::Practitioner
        } else {
            Rank::Apprentice
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rank::Apprentice => "A good start. Review the advice and try again.",
            Rank::Practitioner => "Solid instincts. A few points are worth revisiting.",
            Rank::Champion => "Flawless. You are ready to coach your colleagues.",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rank::Apprentice => write!(f, "Compliance Apprentice"),
            Rank::Practitioner => write!(f, "Compliance Practitioner"),
            Rank::Champion => write!(f, "Compliance Champion"),
        }
    }
}

/// End-of-game summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub user: Option<User>,
    pub score: u32,
    pub max_score: u32,
    pub correct: usize,
    pub total: usize,
    pub rank: Rank,
}

impl Summary {
    /// Score as a percentage of the maximum, 0-100
    pub fn percentage(&self) -> u8 {
        if self.max_score == 0 {
            return 100;
        }
        ((self.score as u64 * 100) / self.max_score as u64).min(100) as u8
    }
}
