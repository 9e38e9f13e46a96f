//! Custom widgets for the academy UI

use crate::data::Tone;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Labelled horizontal bar for drill progress and remaining time
pub struct MeterBar {
    value: u32,
    max: u32,
    label: String,
    color: Color,
    warning_below: Option<u32>,
    danger_below: Option<u32>,
}

impl MeterBar {
    pub fn new(label: &str, value: u32, max: u32) -> Self {
        Self {
            value,
            max: max.max(1),
            label: label.to_string(),
            color: Color::Green,
            warning_below: None,
            danger_below: None,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Turn yellow once the value drops below `threshold`
    pub fn warning_below(mut self, threshold: u32) -> Self {
        self.warning_below = Some(threshold);
        self
    }

    /// Turn red once the value drops below `threshold`
    pub fn danger_below(mut self, threshold: u32) -> Self {
        self.danger_below = Some(threshold);
        self
    }

    fn current_color(&self) -> Color {
        if self.danger_below.is_some_and(|t| self.value < t) {
            Color::Red
        } else if self.warning_below.is_some_and(|t| self.value < t) {
            Color::Yellow
        } else {
            self.color
        }
    }
}

impl Widget for MeterBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }
        let color = self.current_color();

        buf.set_string(area.x, area.y, &self.label, Style::default().fg(color));
        let label_width = self.label.chars().count() as u16 + 1;
        if area.width <= label_width + 2 {
            return;
        }

        let bar_x = area.x + label_width;
        let bar_width = area.width - label_width - 2;
        let filled = (u64::from(self.value.min(self.max)) * u64::from(bar_width) / u64::from(self.max)) as u16;

        buf.set_string(bar_x, area.y, "[", Style::default());
        for x in 0..bar_width {
            let (symbol, style) = if x < filled {
                ("█", Style::default().fg(color))
            } else {
                ("░", Style::default().fg(Color::DarkGray))
            };
            buf.set_string(bar_x + 1 + x, area.y, symbol, style);
        }
        buf.set_string(bar_x + 1 + bar_width, area.y, "]", Style::default());
    }
}

/// One-line notice with a tone symbol
pub struct AlertIndicator {
    message: String,
    tone: Tone,
}

impl AlertIndicator {
    pub fn new(message: &str, tone: Tone) -> Self {
        Self {
            message: message.to_string(),
            tone,
        }
    }
}

impl Widget for AlertIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let color = crate::tui::tone_color(self.tone);
        let text = format!("{} {}", self.tone.symbol(), self.message);
        buf.set_stringn(area.x, area.y, &text, area.width as usize, Style::default().fg(color));
    }
}

/// Double-lined box for the end-of-drill and end-of-quiz screens
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
            border_color: Color::Red,
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
        if area.width < 4 || area.height < 3 {
            return;
        }
        let style = Style::default().fg(self.border_color);
        let right = area.x + area.width - 1;
        let bottom = area.y + area.height - 1;

        buf.set_string(area.x, area.y, "╔", style);
        buf.set_string(right, area.y, "╗", style);
        buf.set_string(area.x, bottom, "╚", style);
        buf.set_string(right, bottom, "╝", style);
        for x in area.x + 1..right {
            buf.set_string(x, area.y, "═", style);
            buf.set_string(x, bottom, "═", style);
        }
        for y in area.y + 1..bottom {
            buf.set_string(area.x, y, "║", style);
            buf.set_string(right, y, "║", style);
        }

        let title = format!(" {} ", self.title);
        let title_width = title.chars().count() as u16;
        if title_width < area.width {
            buf.set_string(area.x + (area.width - title_width) / 2, area.y, &title, style);
        }

        let inner_width = area.width.saturating_sub(4) as usize;
        for (i, line) in self.content.iter().enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= bottom {
                break;
            }
            buf.set_stringn(area.x + 2, y, line, inner_width, Style::default().fg(Color::White));
        }
    }
}
