//! Quiz questions and answer checking

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A single quiz question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub explanation: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// The four supported question types with their correct answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice { choices: Vec<String>, answer: usize },
    TrueFalse { answer: bool },
    FreeText { accepted: Vec<String> },
    DragMatch { items: Vec<DragItem>, zones: Vec<DropZone> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragItem {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropZone {
    pub id: String,
    pub label: String,
    pub correct_item: String,
}

/// Zone id -> item id
pub type Placement = BTreeMap<String, String>;

/// A trainee's answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Choice(usize),
    TrueFalse(bool),
    Text(String),
    Matching(Placement),
}

impl QuestionKind {
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple-choice",
            QuestionKind::TrueFalse { .. } => "true/false",
            QuestionKind::FreeText { .. } => "free-text",
            QuestionKind::DragMatch { .. } => "drag-match",
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

impl Question {
    /// Check structural invariants
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidContent(format!("question {}: {}", self.id, msg)));

        match &self.kind {
            QuestionKind::MultipleChoice { choices, answer } => {
                if *answer >= choices.len() {
                    return invalid(format!("answer index {} out of {} choices", answer, choices.len()));
                }
            }
            QuestionKind::TrueFalse { .. } => {}
            QuestionKind::FreeText { accepted } => {
                if accepted.iter().all(|a| a.trim().is_empty()) {
                    return invalid("no accepted answers".to_string());
                }
            }
            QuestionKind::DragMatch { items, zones } => {
                if zones.is_empty() {
                    return invalid("no drop zones".to_string());
                }
                let item_ids: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
                if item_ids.len() != items.len() {
                    return invalid("duplicate drag item id".to_string());
                }
                let mut zone_ids = HashSet::new();
                for zone in zones {
                    if !zone_ids.insert(zone.id.as_str()) {
                        return invalid(format!("duplicate drop zone {}", zone.id));
                    }
                    if !item_ids.contains(zone.correct_item.as_str()) {
                        return invalid(format!(
                            "zone {} expects unknown item {}",
                            zone.id, zone.correct_item
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Judge an answer against this question's type-specific rule
    pub fn is_correct(&self, answer: &Answer) -> Result<bool> {
        match (&self.kind, answer) {
            (QuestionKind::MultipleChoice { answer: correct, .. }, Answer::Choice(given)) => {
                Ok(correct == given)
            }
            (QuestionKind::TrueFalse { answer: correct }, Answer::TrueFalse(given)) => {
                Ok(correct == given)
            }
            (QuestionKind::FreeText { accepted }, Answer::Text(given)) => {
                let given = normalize(given);
                Ok(accepted.iter().any(|a| normalize(a) == given))
            }
            (QuestionKind::DragMatch { zones, .. }, Answer::Matching(placement)) => Ok(zones
                .iter()
                .all(|z| placement.get(&z.id) == Some(&z.correct_item))),
            (kind, _) => Err(Error::AnswerMismatch {
                question: self.id.clone(),
                expected: kind.name(),
            }),
        }
    }

    /// Drop zones of a drag-match question, empty for other types
    pub fn zones(&self) -> &[DropZone] {
        match &self.kind {
            QuestionKind::DragMatch { zones, .. } => zones,
            _ => &[],
        }
    }

    /// Human-readable form of the correct answer, for the explanation panel
    pub fn correct_answer_text(&self) -> String {
        match &self.kind {
            QuestionKind::MultipleChoice { choices, answer } => {
                choices.get(*answer).cloned().unwrap_or_default()
            }
            QuestionKind::TrueFalse { answer } => {
                if *answer { "True".to_string() } else { "False".to_string() }
            }
            QuestionKind::FreeText { accepted } => accepted.first().cloned().unwrap_or_default(),
            QuestionKind::DragMatch { items, zones } => zones
                .iter()
                .map(|z| {
                    let label = items
                        .iter()
                        .find(|i| i.id == z.correct_item)
                        .map_or(z.correct_item.as_str(), |i| i.label.as_str());
                    format!("{} → {}", z.label, label)
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: QuestionKind) -> Question {
        Question {
            id: "q".to_string(),
            prompt: "prompt".to_string(),
            explanation: "because".to_string(),
            kind,
        }
    }

    fn matching() -> Question {
        question(QuestionKind::DragMatch {
            items: vec![
                DragItem { id: "phish".into(), label: "Phishing".into() },
                DragItem { id: "ransom".into(), label: "Ransomware".into() },
            ],
            zones: vec![
                DropZone { id: "email".into(), label: "Fake invoice email".into(), correct_item: "phish".into() },
                DropZone { id: "crypto".into(), label: "Files encrypted".into(), correct_item: "ransom".into() },
            ],
        })
    }

    #[test]
    fn free_text_ignores_case_and_whitespace() {
        let q = question(QuestionKind::FreeText {
            accepted: vec!["Phishing".into(), "spear phishing".into()],
        });
        assert!(q.is_correct(&Answer::Text("  PHISHING ".into())).unwrap());
        assert!(q.is_correct(&Answer::Text("Spear Phishing".into())).unwrap());
        assert!(!q.is_correct(&Answer::Text("vishing".into())).unwrap());
    }

    #[test]
    fn multiple_choice_is_exact() {
        let q = question(QuestionKind::MultipleChoice {
            choices: vec!["a".into(), "b".into()],
            answer: 1,
        });
        assert!(q.is_correct(&Answer::Choice(1)).unwrap());
        assert!(!q.is_correct(&Answer::Choice(0)).unwrap());
    }

    #[test]
    fn drag_match_requires_every_zone() {
        let q = matching();
        let mut placement = Placement::new();
        placement.insert("email".into(), "phish".into());
        assert!(!q.is_correct(&Answer::Matching(placement.clone())).unwrap());
        placement.insert("crypto".into(), "ransom".into());
        assert!(q.is_correct(&Answer::Matching(placement.clone())).unwrap());
        placement.insert("crypto".into(), "phish".into());
        assert!(!q.is_correct(&Answer::Matching(placement)).unwrap());
    }

    #[test]
    fn mismatched_answer_shape_is_an_error() {
        let q = question(QuestionKind::TrueFalse { answer: true });
        assert!(matches!(
            q.is_correct(&Answer::Choice(0)),
            Err(Error::AnswerMismatch { expected: "true/false", .. })
        ));
    }

    #[test]
    fn dangling_zone_item_fails_validation() {
        let mut q = matching();
        if let QuestionKind::DragMatch { zones, .. } = &mut q.kind {
            zones[1].correct_item = "worm".into();
        }
        assert!(matches!(q.validate(), Err(Error::InvalidContent(_))));
        assert!(matching().validate().is_ok());
    }

    #[test]
    fn question_deserializes_from_tagged_yaml() {
        let yaml = r#"
id: tf-1
prompt: MFA stops every phishing attack.
explanation: Push fatigue and token theft still work.
type: true_false
answer: false
"#;
        let q: Question = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(q.kind, QuestionKind::TrueFalse { answer: false });
    }
}
