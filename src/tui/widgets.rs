//! Custom widgets for the game UI

use crate::data::Tone;
use crate::tui::{tone_color, Theme};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A progress bar for the score
pub struct ScoreBar {
    value: u32,
    max: u32,
    label: String,
    color: Color,
}

impl ScoreBar {
    pub fn new(label: &str, value: u32, max: u32) -> Self {
        Self {
            value,
            max,
            label: label.to_string(),
            color: Color::Green,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Widget for ScoreBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }

        let label = format!("{}: {} / {}", self.label, self.value, self.max);
        buf.set_string(area.x, area.y, &label, Style::default().fg(self.color));

        if area.height > 1 {
            let inner = (area.width - 2) as u32;
            let filled = if self.max == 0 {
                inner
            } else {
                (self.value.min(self.max) * inner) / self.max
            } as u16;

            let bar_y = area.y + 1;
            buf.set_string(area.x, bar_y, "[", Style::default());
            buf.set_string(area.x + area.width - 1, bar_y, "]", Style::default());

            for x in 0..filled {
                buf.set_string(area.x + 1 + x, bar_y, "█", Style::default().fg(self.color));
            }
            for x in filled..(area.width - 2) {
                buf.set_string(area.x + 1 + x, bar_y, "░", Style::default().fg(Color::DarkGray));
            }
        }
    }
}

/// A one-line notice for the status bar
pub struct Notice {
    message: String,
    tone: Tone,
    color: Color,
}

impl Notice {
    pub fn new(message: &str, tone: Tone, theme: &Theme) -> Self {
        Self {
            message: message.to_string(),
            tone,
            color: tone_color(&tone, theme),
        }
    }
}

impl Widget for Notice {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let text = format!("{} {}", self.tone.symbol(), self.message);
        let style = Style::default().fg(self.color);
        buf.set_stringn(area.x, area.y, &text, area.width as usize, style);
    }
}

/// Double-lined box for the ending screen
pub struct DramaticBox {
    title: String,
    content: Vec<String>,
    border_color: Color,
}

impl DramaticBox {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Vec::new(),
            border_color: Color::Yellow,
        }
    }

    pub fn content(mut self, lines: Vec<String>) -> Self {
        self.content = lines;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }
}

impl Widget for DramaticBox {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 2 {
            return;
        }
        let style = Style::default().fg(self.border_color);
        let right = area.x + area.width - 1;
        let bottom = area.y + area.height - 1;

        buf.set_string(area.x, area.y, "╔", style);
        buf.set_string(area.x, bottom, "╚", style);
        for x in 1..area.width - 1 {
            buf.set_string(area.x + x, area.y, "═", style);
            buf.set_string(area.x + x, bottom, "═", style);
        }
        buf.set_string(right, area.y, "╗", style);
        buf.set_string(right, bottom, "╝", style);

        for y in 1..area.height - 1 {
            buf.set_string(area.x, area.y + y, "║", style);
            buf.set_string(right, area.y + y, "║", style);
        }

        let title = format!(" {} ", self.title);
        let title_len = title.chars().count() as u16;
        if title_len + 2 <= area.width {
            let title_x = area.x + (area.width - title_len) / 2;
            buf.set_string(title_x, area.y, &title, style);
        }

        let max_width = area.width.saturating_sub(4) as usize;
        for (i, line) in self.content.iter().enumerate() {
            if i as u16 + 1 < area.height - 1 {
                buf.set_stringn(
                    area.x + 2,
                    area.y + 1 + i as u16,
                    line,
                    max_width,
                    Style::default().fg(Color::White),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn score_bar_fills_proportionally() {
        let area = Rect::new(0, 0, 12, 2);
        let mut buf = Buffer::empty(area);
        ScoreBar::new("Score", 150, 300).render(area, &mut buf);

        assert_eq!(row(&buf, 0), "Score: 150 /");
        assert_eq!(row(&buf, 1), "[█████░░░░░]");
    }

    #[test]
    fn notice_uses_theme_color_for_its_tone() {
        let area = Rect::new(0, 0, 20, 1);
        let theme = Theme {
            error: Color::LightRed,
            ..Theme::default()
        };
        let mut buf = Buffer::empty(area);
        Notice::new("boom", Tone::Error, &theme).render(area, &mut buf);

        assert!(row(&buf, 0).contains("boom"));
        assert_eq!(buf[(0, 0)].fg, Color::LightRed);
    }

    #[test]
    fn dramatic_box_draws_title_and_content() {
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        DramaticBox::new("DONE")
            .content(vec!["Score 300".to_string()])
            .render(area, &mut buf);

        assert!(row(&buf, 0).contains(" DONE "));
        assert!(row(&buf, 1).contains("Score 300"));
        assert!(row(&buf, 3).starts_with('╚'));
    }
}
