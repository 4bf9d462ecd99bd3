//! Main application state and rendering

use crate::data::Tone;
use crate::game::{Action, AnswerOutcome, Outcome, Screen, Session};
use crate::tui::widgets::{DramaticBox, Notice, ScoreBar};
use crate::tui::{centered_rect, create_main_layout, create_mission_layout};
use crate::tui::{styled_block, Theme, HELP_TEXT, LOGO, SMALL_LOGO};
use crate::AdventureError;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::time::Duration;

/// Which intro widget receives input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroFocus {
    Name,
    Department,
}

/// Status line message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotice {
    pub message: String,
    pub tone: Tone,
}

/// Application state
pub struct App {
    pub session: Session,
    pub theme: Theme,
    pub running: bool,
    pub show_help: bool,
    pub menu_state: ListState,
    pub name_input: String,
    pub intro_focus: IntroFocus,
    /// Guidance from the last answered mission, shown over the map
    pub feedback: Option<AnswerOutcome>,
    pub notice: Option<StatusNotice>,
}

impl App {
    pub fn new(session: Session) -> Self {
        let mut menu_state = ListState::default();
        menu_state.select(Some(0));

        Self {
            session,
            theme: Theme::default(),
            running: true,
            show_help: false,
            menu_state,
            name_input: String::new(),
            intro_focus: IntroFocus::Name,
            feedback: None,
            notice: None,
        }
    }

    /// Poll the terminal for one event; returns false once the player quits
    pub fn handle_input(&mut self) -> std::io::Result<bool> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(self.running)
    }

    /// Apply a single key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return;
        }

        self.notice = None;

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        if self.feedback.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
                self.feedback = None;
            }
            return;
        }

        let typing = self.is_typing_name();
        match key.code {
            KeyCode::Char('?') if !typing => self.show_help = true,
            KeyCode::Char('q') if !typing => self.running = false,
            KeyCode::Esc => self.handle_escape(),
            KeyCode::Tab if self.session.screen() == Screen::Intro => self.toggle_focus(),
            KeyCode::Up => self.navigate_up(),
            KeyCode::Down => self.navigate_down(),
            KeyCode::Enter => self.handle_enter(),
            KeyCode::Backspace if typing => {
                self.name_input.pop();
            }
            KeyCode::Char(c) if typing => self.name_input.push(c),
            _ => {}
        }
    }

    fn is_typing_name(&self) -> bool {
        self.session.screen() == Screen::Intro && self.intro_focus == IntroFocus::Name
    }

    fn handle_escape(&mut self) {
        if self.session.screen() != Screen::Intro {
            return;
        }
        match self.intro_focus {
            IntroFocus::Department => self.intro_focus = IntroFocus::Name,
            IntroFocus::Name => self.running = false,
        }
    }

    fn toggle_focus(&mut self) {
        self.intro_focus = match self.intro_focus {
            IntroFocus::Name => IntroFocus::Department,
            IntroFocus::Department => IntroFocus::Name,
        };
        self.menu_state.select(Some(0));
    }

    /// Highest selectable list index on the current screen
    fn max_index(&self) -> usize {
        let catalog = self.session.catalog();
        match self.session.screen() {
            Screen::Intro => catalog.departments().len().saturating_sub(1),
            Screen::Map => catalog.len(), // last entry is "Finish"
            Screen::Mission => self
                .session
                .active_mission()
                .map(|m| m.options.len().saturating_sub(1))
                .unwrap_or(0),
            Screen::Ending => 0,
        }
    }

    /// Whether list entry `index` can be chosen on the current screen.
    /// On the map, completed missions are skipped and "Finish" only opens
    /// once nothing is left.
    fn is_selectable(&self, index: usize) -> bool {
        if self.session.screen() != Screen::Map {
            return index <= self.max_index();
        }
        match self.session.catalog().all().get(index) {
            Some(mission) => !self.session.state().is_completed(&mission.key),
            None => {
                index == self.session.catalog().len() && self.session.remaining_missions() == 0
            }
        }
    }

    fn navigate_up(&mut self) {
        if self.is_typing_name() {
            return;
        }
        let i = self.menu_state.selected().unwrap_or(0);
        match (0..i).rev().find(|&j| self.is_selectable(j)) {
            Some(j) => self.menu_state.select(Some(j)),
            None if self.session.screen() == Screen::Intro => {
                self.intro_focus = IntroFocus::Name;
            }
            None => {}
        }
    }

    fn navigate_down(&mut self) {
        if self.is_typing_name() {
            self.intro_focus = IntroFocus::Department;
            self.menu_state.select(Some(0));
            return;
        }
        let i = self.menu_state.selected().unwrap_or(0);
        if let Some(j) = (i + 1..=self.max_index()).find(|&j| self.is_selectable(j)) {
            self.menu_state.select(Some(j));
        }
    }

    fn handle_enter(&mut self) {
        let selected = self.menu_state.selected().unwrap_or(0);
        match self.session.screen() {
            Screen::Intro => match self.intro_focus {
                IntroFocus::Name => {
                    self.intro_focus = IntroFocus::Department;
                    self.menu_state.select(Some(0));
                }
                IntroFocus::Department => {
                    let department = self
                        .session
                        .catalog()
                        .departments()
                        .get(selected)
                        .cloned()
                        .unwrap_or_default();
                    let action = Action::Register {
                        name: self.name_input.clone(),
                        department,
                    };
                    self.dispatch(action);
                }
            },
            Screen::Map => {
                if !self.is_selectable(selected) {
                    return;
                }
                let key = self.session.catalog().all().get(selected).map(|m| m.key.clone());
                match key {
                    Some(key) => self.dispatch(Action::EnterMission(key)),
                    None => self.dispatch(Action::Finish),
                }
            }
            Screen::Mission => self.dispatch(Action::Answer(selected)),
            Screen::Ending => self.dispatch(Action::Reset),
        }
    }

    /// Send an action to the session and update the UI from the result
    fn dispatch(&mut self, action: Action) {
        match self.session.apply(action) {
            Ok(outcome) => self.on_outcome(outcome),
            Err(err) => self.on_rejected(err),
        }
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Registered => {
                let name = self.name_input.trim().to_string();
                self.set_notice(
                    &format!("Welcome aboard, {name}. Pick your first mission."),
                    Tone::Success,
                );
                self.select_next_open_mission();
            }
            Outcome::MissionEntered(_) => {
                self.menu_state.select(Some(0));
            }
            Outcome::Answered(answer) => {
                self.feedback = Some(answer);
                self.select_next_open_mission();
            }
            Outcome::Finished(summary) => {
                self.set_notice(&format!("Adventure complete: {}", summary.rank), Tone::Success);
                self.menu_state.select(Some(0));
            }
            Outcome::Reset => {
                self.name_input.clear();
                self.intro_focus = IntroFocus::Name;
                self.feedback = None;
                self.menu_state.select(Some(0));
                self.set_notice("New adventure. Enter your name to begin.", Tone::Info);
            }
        }
    }

    fn on_rejected(&mut self, err: AdventureError) {
        if matches!(err, AdventureError::Validation(_)) && self.name_input.trim().is_empty() {
            self.intro_focus = IntroFocus::Name;
        }
        let tone = match err {
            AdventureError::Validation(_) => Tone::Warning,
            _ => Tone::Error,
        };
        self.set_notice(&err.to_string(), tone);
    }

    fn set_notice(&mut self, message: &str, tone: Tone) {
        self.notice = Some(StatusNotice {
            message: message.to_string(),
            tone,
        });
    }

    /// Put the map cursor on the first open mission, or on "Finish"
    fn select_next_open_mission(&mut self) {
        let index = self
            .session
            .catalog()
            .all()
            .iter()
            .position(|m| !self.session.state().is_completed(&m.key))
            .unwrap_or(self.session.catalog().len());
        self.menu_state.select(Some(index));
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let layout = create_main_layout(frame.area());

        self.render_header(frame, layout[0]);
        match self.session.screen() {
            Screen::Intro => self.render_intro(frame, layout[1]),
            Screen::Map => self.render_map(frame, layout[1]),
            Screen::Mission => self.render_mission(frame, layout[1]),
            Screen::Ending => self.render_ending(frame, layout[1]),
        }
        self.render_status_bar(frame, layout[2]);

        if self.feedback.is_some() {
            self.render_feedback_overlay(frame);
        }
        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let player = match self.session.user() {
            Some(user) => user.to_string(),
            None => "Not registered".to_string(),
        };
        let catalog = self.session.catalog();
        let header = Line::from(vec![
            Span::styled(
                SMALL_LOGO,
                Style::default()
                    .fg(self.theme.bg)
                    .bg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(player, Style::default().fg(self.theme.fg)),
            Span::raw("  |  "),
            Span::styled(
                format!("Score {}", self.session.score()),
                Style::default().fg(self.theme.success),
            ),
            Span::raw("  |  "),
            Span::styled(
                format!("Missions {}/{}", self.session.completed().len(), catalog.len()),
                Style::default().fg(self.theme.header),
            ),
        ]);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border));
        frame.render_widget(Paragraph::new(header).block(block), area);
    }

    fn render_intro(&mut self, frame: &mut Frame, area: Rect) {
        let logo_height = LOGO.lines().count() as u16;
        // Skip the banner on small terminals
        let show_logo = area.height >= logo_height + 10;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(if show_logo { logo_height } else { 0 }),
                Constraint::Length(3),
                Constraint::Min(4),
            ])
            .split(area);

        if show_logo {
            let logo = Paragraph::new(LOGO)
                .style(Style::default().fg(self.theme.accent))
                .alignment(Alignment::Center);
            frame.render_widget(logo, chunks[0]);
        }

        let name_focused = self.intro_focus == IntroFocus::Name;
        let focus_style = |focused: bool| {
            if focused {
                Style::default().fg(self.theme.accent)
            } else {
                Style::default().fg(self.theme.border)
            }
        };

        let cursor = if name_focused { "█" } else { "" };
        let name = Paragraph::new(format!("{}{}", self.name_input, cursor))
            .style(Style::default().fg(self.theme.fg))
            .block(
                Block::default()
                    .title(" Your name ")
                    .borders(Borders::ALL)
                    .border_style(focus_style(name_focused)),
            );
        frame.render_widget(name, chunks[1]);

        let items: Vec<ListItem> = self
            .session
            .catalog()
            .departments()
            .iter()
            .map(|d| ListItem::new(format!("  {d}")))
            .collect();
        let highlight = if name_focused {
            Style::default().fg(self.theme.muted)
        } else {
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        };
        let departments = List::new(items)
            .block(
                Block::default()
                    .title(" Department ")
                    .borders(Borders::ALL)
                    .border_style(focus_style(!name_focused)),
            )
            .highlight_style(highlight)
            .highlight_symbol("→ ");
        frame.render_stateful_widget(departments, chunks[2], &mut self.menu_state);
    }

    fn render_map(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(2)])
            .split(area);

        let state = self.session.state();
        let mut items: Vec<ListItem> = self
            .session
            .catalog()
            .all()
            .iter()
            .enumerate()
            .map(|(i, mission)| {
                let answer = state.answers().iter().find(|a| a.mission == mission.key);
                let (marker, detail, color) = match answer {
                    Some(a) if a.correct => ("✓", "+100", self.theme.success),
                    Some(_) => ("✗", "+0", self.theme.warning),
                    None => ("○", "open", self.theme.fg),
                };
                let style = Style::default().fg(color);
                ListItem::new(Line::from(vec![
                    Span::styled(format!("  {marker} Mission {}: {}", i + 1, mission.title), style),
                    Span::styled(format!("  ({detail})"), Style::default().fg(self.theme.muted)),
                ]))
            })
            .collect();

        let finish_style = if self.session.remaining_missions() == 0 {
            Style::default().fg(self.theme.header).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.muted)
        };
        items.push(ListItem::new(Span::styled("  ⚑ Finish the adventure", finish_style)));

        let map = List::new(items)
            .block(styled_block("Mission Map", &self.theme))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol("→ ");
        frame.render_stateful_widget(map, chunks[0], &mut self.menu_state);

        let bar = ScoreBar::new("Score", self.session.score(), self.session.catalog().max_score())
            .color(self.theme.success);
        frame.render_widget(bar, chunks[1]);
    }

    fn render_mission(&mut self, frame: &mut Frame, area: Rect) {
        let Some(mission) = self.session.active_mission() else {
            return;
        };
        let chunks = create_mission_layout(area);

        let prompt = Paragraph::new(mission.prompt.as_str())
            .style(Style::default().fg(self.theme.fg))
            .wrap(Wrap { trim: true })
            .block(styled_block(&mission.title, &self.theme));
        frame.render_widget(prompt, chunks[0]);

        let items: Vec<ListItem> = mission
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| ListItem::new(format!("  {}) {}", option_label(i), option)))
            .collect();
        let options = List::new(items)
            .block(styled_block("Your answer (one attempt)", &self.theme))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .highlight_symbol("→ ");
        frame.render_stateful_widget(options, chunks[1], &mut self.menu_state);
    }

    fn render_ending(&self, frame: &mut Frame, area: Rect) {
        let summary = self.session.summary();
        let catalog = self.session.catalog();

        let mut lines = Vec::new();
        if let Some(user) = &summary.user {
            lines.push(format!("Well done, {}!", user.name));
            lines.push(format!("Department: {}", user.department));
        }
        lines.push(String::new());
        lines.push(format!(
            "Final score: {} / {} ({}%)",
            summary.score,
            summary.max_score,
            summary.percentage()
        ));
        lines.push(format!("Rank: {}", summary.rank));
        lines.push(summary.rank.description().to_string());
        lines.push(String::new());
        for answer in self.session.answers() {
            let Ok(mission) = catalog.get(&answer.mission) else {
                continue;
            };
            if answer.correct {
                lines.push(format!("✓ {}", mission.title));
            } else {
                lines.push(format!(
                    "✗ {} (best answer: {})",
                    mission.title,
                    mission.correct_option()
                ));
            }
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(2)])
            .split(area);

        let border = if summary.correct == summary.total {
            self.theme.success
        } else {
            self.theme.warning
        };
        frame.render_widget(
            DramaticBox::new("MISSION DEBRIEF").content(lines).border_color(border),
            chunks[0],
        );
        frame.render_widget(
            ScoreBar::new("Score", summary.score, summary.max_score).color(border),
            chunks[1],
        );
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(notice) = &self.notice {
            frame.render_widget(Notice::new(&notice.message, notice.tone, &self.theme), area);
            return;
        }

        let hint = match self.session.screen() {
            Screen::Intro => match self.intro_focus {
                IntroFocus::Name => " Type your name | Enter/Tab: choose department | Esc: quit ",
                IntroFocus::Department => " ↑/↓ choose department | Enter: start | Tab: edit name ",
            },
            Screen::Map => " ↑/↓ choose a mission | Enter: start | ? help | q quit ",
            Screen::Mission => " ↑/↓ choose an answer | Enter: confirm (one attempt only) ",
            Screen::Ending => " Enter: play again | q quit ",
        };
        let status =
            Paragraph::new(hint).style(Style::default().fg(self.theme.fg).bg(self.theme.muted));
        frame.render_widget(status, area);
    }

    fn render_feedback_overlay(&self, frame: &mut Frame) {
        let Some(feedback) = &self.feedback else {
            return;
        };
        let popup_area = centered_rect(72, 18, frame.area());
        frame.render_widget(Clear, popup_area);

        let (verdict, color) = if feedback.correct {
            (format!("Correct! +{} points", feedback.points), self.theme.success)
        } else {
            ("Not quite. No points this time.".to_string(), self.theme.warning)
        };

        let mut text = vec![
            Line::from(Span::styled(
                verdict,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Your answer: {}", feedback.chosen_option)),
        ];
        if !feedback.correct {
            text.push(Line::from(format!("Best answer: {}", feedback.correct_option)));
        }
        text.push(Line::from(""));
        text.push(Line::from(feedback.feedback.as_str()));
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            "Press Enter to continue",
            Style::default().fg(self.theme.muted),
        )));

        let popup = Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(format!(" {} ", feedback.title)),
            );
        frame.render_widget(popup, popup_area);
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let popup_area = centered_rect(52, 17, frame.area());
        frame.render_widget(Clear, popup_area);

        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(self.theme.fg))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.accent)),
            );
        frame.render_widget(help, popup_area);
    }
}

/// Letter shown in front of an answer option
fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
