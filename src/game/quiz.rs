//! Knowledge quiz engine
//!
//! Walks a fixed list of questions in order. Each question can be
//! answered once; score counts correct answers.

use crate::data::{Answer, Placement, Question, QuestionKind};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Correct,
    Incorrect,
    /// The question was answered earlier; nothing changed
    AlreadyAnswered,
    /// Drag placement recorded, zones still open
    Pending,
}

/// A recorded answer with its verdict
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub answer: Answer,
    pub correct: bool,
}

/// Reward band for the final percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardTier {
    High,
    Medium,
    Low,
}

impl RewardTier {
    pub fn badge(&self) -> &'static str {
        match self {
            RewardTier::High => "Gold Shield",
            RewardTier::Medium => "Silver Shield",
            RewardTier::Low => "Bronze Shield",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RewardTier::High => "Outstanding. You are ready for live incident drills.",
            RewardTier::Medium => "Solid work. Review the explanations you missed before the drills.",
            RewardTier::Low => "Keep practising. Revisit the briefing and try the quiz again.",
        }
    }
}

/// Minimum percentages for each tier; `high >= medium`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self { high: 80.0, medium: 50.0 }
    }
}

impl TierThresholds {
    pub fn tier_for(&self, percentage: f64) -> RewardTier {
        if percentage >= self.high {
            RewardTier::High
        } else if percentage >= self.medium {
            RewardTier::Medium
        } else {
            RewardTier::Low
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizEngine {
    questions: Vec<Question>,
    thresholds: TierThresholds,
    index: usize,
    answers: Vec<Option<AnswerRecord>>,
    placements: Vec<Placement>,
    score: u32,
    completed: bool,
}

impl QuizEngine {
    pub fn new(questions: Vec<Question>, thresholds: TierThresholds) -> Self {
        let count = questions.len();
        Self {
            questions,
            thresholds,
            index: 0,
            answers: vec![None; count],
            placements: vec![Placement::new(); count],
            score: 0,
            completed: false,
        }
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Answer record of the current question, if answered
    pub fn current_record(&self) -> Option<&AnswerRecord> {
        self.answers.get(self.index).and_then(Option::as_ref)
    }

    pub fn is_answered(&self) -> bool {
        self.current_record().is_some()
    }

    /// Explanation is revealed once the current question is answered
    pub fn explanation(&self) -> Option<&str> {
        self.current_record()
            .and(self.current())
            .map(|q| q.explanation.as_str())
    }

    /// Submit an answer for the current question
    pub fn submit(&mut self, answer: Answer) -> Result<SubmitOutcome> {
        if self.completed {
            return Ok(SubmitOutcome::AlreadyAnswered);
        }
        let Some(question) = self.questions.get(self.index) else {
            return Ok(SubmitOutcome::AlreadyAnswered);
        };
        if self.answers[self.index].is_some() {
            debug!(question = %question.id, "Ignoring resubmission");
            return Ok(SubmitOutcome::AlreadyAnswered);
        }

        // A matching is only judged once every zone holds an item
        let answer = match (answer, &question.kind) {
            (Answer::Matching(placement), QuestionKind::DragMatch { zones, .. }) => {
                let merged = &mut self.placements[self.index];
                merged.extend(placement);
                if !zones.iter().all(|z| merged.contains_key(&z.id)) {
                    debug!(question = %question.id, placed = merged.len(), "Partial matching held back");
                    return Ok(SubmitOutcome::Pending);
                }
                Answer::Matching(merged.clone())
            }
            (answer, _) => answer,
        };

        let correct = question.is_correct(&answer)?;
        if correct {
            self.score += 1;
        }
        info!(question = %question.id, correct, score = self.score, "Quiz answer recorded");
        self.answers[self.index] = Some(AnswerRecord { answer, correct });

        Ok(if correct {
            SubmitOutcome::Correct
        } else {
            SubmitOutcome::Incorrect
        })
    }

    /// Place a drag item on a zone of the current drag-match question.
    /// Once every zone is filled the placement is judged automatically.
    pub fn assign(&mut self, zone: &str, item: &str) -> Result<SubmitOutcome> {
        if self.is_answered() || self.completed {
            return Ok(SubmitOutcome::AlreadyAnswered);
        }
        let Some(question) = self.questions.get(self.index) else {
            return Ok(SubmitOutcome::AlreadyAnswered);
        };
        let QuestionKind::DragMatch { items, zones } = &question.kind else {
            return Err(Error::AnswerMismatch {
                question: question.id.clone(),
                expected: question.kind.name(),
            });
        };
        if !zones.iter().any(|z| z.id == zone) || !items.iter().any(|i| i.id == item) {
            return Err(Error::InvalidContent(format!(
                "question {}: no zone {} or item {}",
                question.id, zone, item
            )));
        }
        let placement = Placement::from([(zone.to_string(), item.to_string())]);
        self.submit(Answer::Matching(placement))
    }

    /// Take an item back off a zone before the question is judged
    pub fn unassign(&mut self, zone: &str) {
        if !self.is_answered() {
            if let Some(placement) = self.placements.get_mut(self.index) {
                placement.remove(zone);
            }
        }
    }

    /// Current drag placements for the current question
    pub fn placement(&self) -> Option<&Placement> {
        self.placements.get(self.index)
    }

    /// Move forward; past the last question the quiz is completed
    pub fn next(&mut self) {
        if self.completed {
            return;
        }
        if self.index + 1 < self.questions.len() {
            self.index += 1;
        } else {
            self.completed = true;
            info!(score = self.score, total = self.len(), tier = ?self.tier(), "Quiz completed");
        }
    }

    pub fn previous(&mut self) {
        if !self.completed && self.index > 0 {
            self.index -= 1;
        }
    }

    pub fn restart(&mut self) {
        self.index = 0;
        self.answers.iter_mut().for_each(|a| *a = None);
        self.placements.iter_mut().for_each(Placement::clear);
        self.score = 0;
        self.completed = false;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn percentage(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        f64::from(self.score) * 100.0 / self.questions.len() as f64
    }

    pub fn tier(&self) -> RewardTier {
        self.thresholds.tier_for(self.percentage())
    }

    pub fn completion_message(&self) -> String {
        format!(
            "{} / {} correct ({:.0}%). {}",
            self.score,
            self.len(),
            self.percentage(),
            self.tier().message()
        )
    }
}
