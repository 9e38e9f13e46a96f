//! Terminal User Interface
//!
//! Thin ratatui front end over the academy engines

pub mod app;
pub mod widgets;

pub use app::App;

use crate::data::{Priority, Tone};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

/// Color scheme
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub alert: Color,
    pub success: Color,
    pub warning: Color,
    pub info: Color,
    pub border: Color,
    pub header: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            accent: Color::Cyan,
            alert: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            info: Color::Blue,
            border: Color::DarkGray,
            header: Color::Magenta,
        }
    }
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Info => Color::Cyan,
        Tone::Success => Color::Green,
        Tone::Warning => Color::Yellow,
        Tone::Error => Color::Red,
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::P1 => Color::Magenta,
        Priority::P2 => Color::Red,
        Priority::P3 => Color::Yellow,
        Priority::P4 => Color::Blue,
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

pub const LOGO: &str = r#"
 ██████╗██╗   ██╗██████╗ ███████╗██████╗
██╔════╝╚██╗ ██╔╝██╔══██╗██╔════╝██╔══██╗
██║      ╚████╔╝ ██████╔╝█████╗  ██████╔╝
██║       ╚██╔╝  ██╔══██╗██╔══╝  ██╔══██╗
╚██████╗   ██║   ██████╔╝███████╗██║  ██║
 ╚═════╝   ╚═╝   ╚═════╝ ╚══════╝╚═╝  ╚═╝
           A C A D E M Y
"#;

pub const SMALL_LOGO: &str = " CYBER ACADEMY ";

pub const HELP_TEXT: &str = r#"
╔═══════════════════════════════════════════════════════════════╗
║                       CONTROLS                                ║
╠═══════════════════════════════════════════════════════════════╣
║  ↑/↓   Navigate lists                                         ║
║  Enter Select / Submit                                        ║
║  Esc   Back / Pause drill                                     ║
║  ?     Toggle this help                                       ║
║  q     Quit (from the briefing)                               ║
╠═══════════════════════════════════════════════════════════════╣
║                         QUIZ                                  ║
╠═══════════════════════════════════════════════════════════════╣
║  ←/→   Previous / next question                               ║
║  1-9   Place item N on the selected drop zone                 ║
║  Bksp  Take an item back off the selected zone                ║
║  r     Retake the quiz (results page)                         ║
╠═══════════════════════════════════════════════════════════════╣
║                        DRILLS                                 ║
╠═══════════════════════════════════════════════════════════════╣
║  s     Start the drill                                        ║
║  Tab   Switch console (SIEM, EDR, TIP, SOAR, Physical, Comms) ║
║  F1-F6 Jump straight to a console                             ║
║  r     Restart the drill                                      ║
║  b     Back to the course (after the drill ends)              ║
╚═══════════════════════════════════════════════════════════════╝
"#;

/// Header, content, status bar
pub fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // Header
            Constraint::Min(10),     // Main content
            Constraint::Length(1),   // Status bar
        ])
        .split(area)
        .to_vec()
}

/// Step panel on the left, chat on the right
pub fn create_content_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),  // Step + consoles
            Constraint::Percentage(60),  // Operations chat
        ])
        .split(area)
        .to_vec()
}

/// Step details above, console actions below
pub fn create_side_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Percentage(45),
        ])
        .split(area)
        .to_vec()
}

/// A rectangle of the given size centered in `area`
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
