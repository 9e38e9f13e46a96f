//! Cyber Academy: gamified security awareness training
//!
//! A terminal trainer that walks a trainee from a mission briefing through a
//! knowledge quiz, course selection and simulated incident response drills.
//!
//! # Training Mechanics
//!
//! - **Quiz**: multiple-choice, true/false, free-text and drag-match questions
//! - **Drills**: step-by-step incident handling across SIEM, EDR, TIP and SOAR consoles
//! - **Time Pressure**: every drill runs against a countdown
//! - **Feedback**: each action is judged immediately in the operations chat
//!
//! # Architecture
//!
//! - `data` - Content and run-time record types
//! - `content` - Built-in course catalog and YAML content packs
//! - `game` - Timer, quiz engine, step engine and navigation shell
//! - `config` - Runtime settings
//! - `logging` - Tracing subscriber setup
//! - `tui` - Terminal user interface with ratatui

pub mod config;
pub mod content;
pub mod data;
pub mod game;
pub mod logging;
pub mod tui;

pub use config::Settings;
pub use content::Catalog;
pub use data::*;
pub use game::Academy;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for the academy
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading content or driving the engines
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Answer does not fit question {question}: expected {expected}")]
    AnswerMismatch {
        question: String,
        expected: &'static str,
    },

    #[error("Invalid settings: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
