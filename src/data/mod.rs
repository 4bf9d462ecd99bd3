//! Data structures for the adventure
//!
//! Mission content, the registered player and the notices shown by the UI.

pub mod mission;
pub mod player;

pub use mission::*;
pub use player::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tone of a notice shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

impl Tone {
    pub fn symbol(&self) -> &'static str {
        match self {
            Tone::Info => "ℹ",
            Tone::Success => "✔",
            Tone::Warning => "▲",
            Tone::Error => "✖",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tone::Info => write!(f, "INFO"),
            Tone::Success => write!(f, "OK"),
            Tone::Warning => write!(f, "WARN"),
            Tone::Error => write!(f, "ERROR"),
        }
    }
}

/// A unique identifier wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id(pub Uuid);

impl Id {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
