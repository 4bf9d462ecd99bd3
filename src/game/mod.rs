//! Core game logic and state management

pub mod catalog;
pub mod report;
pub mod session;

pub use catalog::{Catalog, CatalogError, MISSION_POINTS};
pub use report::{Report, ReportSink, TracingSink};
pub use session::{Session, SessionState};

use crate::data::Summary;
use serde::{Deserialize, Serialize};

/// The screen the player is looking at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Intro,      // Registration
    Map,        // Mission overview
    Mission,    // Answering a question
    Ending,     // Final summary
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Screen::Intro => write!(f, "intro"),
            Screen::Map => write!(f, "map"),
            Screen::Mission => write!(f, "mission"),
            Screen::Ending => write!(f, "ending"),
        }
    }
}

/// Actions the player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Register { name: String, department: String },
    EnterMission(String),
    Answer(usize),
    Finish,
    Reset,
}

impl Action {
    /// The only screen this action is accepted on
    pub fn screen(&self) -> Screen {
        match self {
            Action::Register { .. } => Screen::Intro,
            Action::EnterMission(_) | Action::Finish => Screen::Map,
            Action::Answer(_) => Screen::Mission,
            Action::Reset => Screen::Ending,
        }
    }
}

/// What an answered mission produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub mission: String,
    pub title: String,
    pub correct: bool,
    pub points: u32,
    pub chosen_option: String,
    pub correct_option: String,
    pub feedback: String,
}

/// Result of an accepted action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Registered,
    MissionEntered(String),
    Answered(AnswerOutcome),
    Finished(Summary),
    Reset,
}
