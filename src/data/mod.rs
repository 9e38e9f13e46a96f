//! Data structures for the academy
//!
//! Defines quiz questions, scenarios, steps and the run-time records
//! produced while a trainee works through a drill.

pub mod chat;
pub mod question;
pub mod scenario;

pub use chat::*;
pub use question::*;
pub use scenario::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Style tag attached to every chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
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
            Tone::Success => write!(f, "SUCCESS"),
            Tone::Warning => write!(f, "WARN"),
            Tone::Error => write!(f, "ERROR"),
        }
    }
}

/// Incident priority. `P1` is the most urgent; ordering follows urgency,
/// so `Priority::P1 < Priority::P4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    P3,
    P4,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::P1 => "Critical",
            Priority::P2 => "High",
            Priority::P3 => "Medium",
            Priority::P4 => "Low",
        }
    }

    /// Numeric level, 1 for the most urgent
    pub fn level(&self) -> u8 {
        match self {
            Priority::P1 => 1,
            Priority::P2 => 2,
            Priority::P3 => 3,
            Priority::P4 => 4,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{} ({})", self.level(), self.label())
    }
}

/// Identifier of one training run. A fresh one is minted at every restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p1_sorts_before_p4() {
        let mut levels = vec![Priority::P3, Priority::P1, Priority::P4, Priority::P2];
        levels.sort();
        assert_eq!(levels, vec![Priority::P1, Priority::P2, Priority::P3, Priority::P4]);
    }

    #[test]
    fn priority_display_includes_label() {
        assert_eq!(Priority::P2.to_string(), "P2 (High)");
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }
}
