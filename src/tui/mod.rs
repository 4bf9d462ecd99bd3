//! Terminal User Interface
//!
//! Renders the adventure with ratatui and turns key presses into session
//! transitions.

pub mod app;
pub mod widgets;

pub use app::App;

use crate::data::Tone;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

/// Color scheme for the game
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
    pub border: Color,
    pub header: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            accent: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            header: Color::Magenta,
        }
    }
}

/// Get the theme color for a notice tone
pub fn tone_color(tone: &Tone, theme: &Theme) -> Color {
    match tone {
        Tone::Info => theme.fg,
        Tone::Success => theme.success,
        Tone::Warning => theme.warning,
        Tone::Error => theme.error,
    }
}

/// Create a styled border block
pub fn styled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
}

/// Banner for the intro screen
pub const LOGO: &str = r#"
╔════════════════════════════════════════════════════╗
║                                                    ║
║          C O M P L I A N C E                       ║
║                    A D V E N T U R E               ║
║                                                    ║
║     Three missions through a responsible           ║
║     supply chain. Choose wisely.                   ║
║                                                    ║
╚════════════════════════════════════════════════════╝
"#;

/// Smaller logo for header
pub const SMALL_LOGO: &str = " COMPLIANCE ADVENTURE ";

/// Help text
pub const HELP_TEXT: &str = r#"
╔═══════════════════════════════════════════════╗
║                  CONTROLS                     ║
╠═══════════════════════════════════════════════╣
║  ↑/↓    Navigate lists                        ║
║  Enter  Select / Confirm                      ║
║  Tab    Switch between name and department    ║
║  Esc    Close overlay / Leave                 ║
║  ?      Toggle this help                      ║
║  q      Quit (outside text entry)             ║
╠═══════════════════════════════════════════════╣
║  Each mission allows one answer only.         ║
║  A correct answer is worth 100 points.        ║
╚═══════════════════════════════════════════════╝
"#;

/// Create the main layout
pub fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // Header
            Constraint::Min(8),      // Main content
            Constraint::Length(1),   // Status bar
        ])
        .split(area)
        .to_vec()
}

/// Split the mission screen into prompt and options
pub fn create_mission_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),  // Prompt
            Constraint::Percentage(55),  // Options
        ])
        .split(area)
        .to_vec()
}

/// Rectangle of the given size centred in `area`, clamped to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
