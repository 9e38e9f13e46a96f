//! Operations chat log and step results
//!
//! Both are created during a training run and thrown away on restart.

use super::{Payload, Tone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single line in the operations chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub tone: Tone,
}

/// Append-only chat log. Ids start at 1 and increase by one per message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its id
    pub fn push(&mut self, sender: &str, text: &str, tone: Tone) -> u64 {
        let id = self.messages.len() as u64 + 1;
        self.messages.push(ChatMessage {
            id,
            sender: sender.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
            tone,
        });
        id
    }

    pub fn system(&mut self, text: &str, tone: Tone) -> u64 {
        self.push(SYSTEM_SENDER, text, tone)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Sender label used for engine-generated messages
pub const SYSTEM_SENDER: &str = "System";

/// Outcome of one judged submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Failure,
    Partial,
}

/// Record of one attempted step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: u32,
    pub status: StepStatus,
    pub payload: Payload,
    pub timestamp: DateTime<Utc>,
    pub score: u32,
}

/// Score contribution of a successful step
pub const STEP_SUCCESS_SCORE: u32 = 100;

impl StepResult {
    pub fn new(step_id: u32, status: StepStatus, payload: Payload) -> Self {
        let score = match status {
            StepStatus::Success => STEP_SUCCESS_SCORE,
            StepStatus::Failure | StepStatus::Partial => 0,
        };
        Self {
            step_id,
            status,
            payload,
            timestamp: Utc::now(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_ids_are_monotonic() {
        let mut log = ChatLog::new();
        assert_eq!(log.system("one", Tone::Info), 1);
        assert_eq!(log.push("Analyst", "two", Tone::Warning), 2);
        assert_eq!(log.system("three", Tone::Error), 3);
        let ids: Vec<u64> = log.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(log.last().map(|m| m.sender.as_str()), Some(SYSTEM_SENDER));
    }

    #[test]
    fn only_success_scores() {
        assert_eq!(StepResult::new(1, StepStatus::Success, Payload::new()).score, 100);
        assert_eq!(StepResult::new(1, StepStatus::Failure, Payload::new()).score, 0);
        assert_eq!(StepResult::new(1, StepStatus::Partial, Payload::new()).score, 0);
    }
}
