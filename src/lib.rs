//! Compliance Adventure
//!
//! A short training adventure about responsible purchasing. The player
//! registers, works through three missions from a map, answers one question
//! per mission and receives guidance on each topic before the final summary.
//!
//! # Game Mechanics
//!
//! - **Missions**: one question each, a single irrevocable answer
//! - **Scoring**: 100 points per correct answer, nothing for a wrong one
//! - **Guidance**: every mission ends with advice, whatever was answered
//!
//! # Architecture
//!
//! - `game` - Session state machine, mission catalog, end-of-game reports
//! - `tui` - Terminal user interface with ratatui
//! - `data` - Plain data structures shared by the game and the UI

pub mod data;
pub mod game;
pub mod tui;

pub use data::*;
pub use game::{Catalog, Session};

/// Game version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for the application
pub type Result<T> = anyhow::Result<T>;

/// Rejected session transitions
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AdventureError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unknown mission: {0}")]
    UnknownMission(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Answer {index} is out of range ({options} options)")]
    OutOfRangeAnswer { index: usize, options: usize },
}
