//! Scenario definitions and step data
//!
//! A scenario is a simulated incident with narrative text and an ordered
//! list of steps. Each step names the console a trainee must use and the
//! action they must perform there.

use super::Priority;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Simulated consoles a trainee can act through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Siem,
    Edr,
    Tip,
    Soar,
    Physical,
    Communication,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::Siem,
        Tool::Edr,
        Tool::Tip,
        Tool::Soar,
        Tool::Physical,
        Tool::Communication,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Siem => "SIEM",
            Tool::Edr => "EDR",
            Tool::Tip => "TIP",
            Tool::Soar => "SOAR",
            Tool::Physical => "Physical",
            Tool::Communication => "Comms",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::Siem => "Search and correlate security events",
            Tool::Edr => "Inspect and act on endpoints",
            Tool::Tip => "Look up threat intelligence",
            Tool::Soar => "Run response playbooks",
            Tool::Physical => "Act in the physical world",
            Tool::Communication => "Notify and coordinate people",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kinds of interaction inside a console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    Input,
    Select,
    Confirm,
    Query,
    Analyze,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Click,
        ActionKind::Input,
        ActionKind::Select,
        ActionKind::Confirm,
        ActionKind::Query,
        ActionKind::Analyze,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Click => "Click",
            ActionKind::Input => "Input",
            ActionKind::Select => "Select",
            ActionKind::Confirm => "Confirm",
            ActionKind::Query => "Query",
            ActionKind::Analyze => "Analyze",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Display-only value carried in a step payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl std::fmt::Display for PayloadValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadValue::Text(s) => write!(f, "{}", s),
            PayloadValue::Number(n) => write!(f, "{}", n),
            PayloadValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// Free-form key/value data shown next to a step. Never inspected by the engine.
pub type Payload = BTreeMap<String, PayloadValue>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feedback {
    pub success: String,
    pub failure: String,
}

/// One required tool + action interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub tool: Tool,
    pub action: ActionKind,
    pub expected_result: String,
    pub feedback: Feedback,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub next_step: Option<u32>,
}

/// Who/what/when/where/how/how-much of the simulated attack. Display only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttackAttribution {
    pub who: String,
    pub what: String,
    pub when: String,
    #[serde(rename = "where")]
    pub where_: String,
    pub how: String,
    pub how_much: String,
}

impl AttackAttribution {
    pub fn rows(&self) -> [(&'static str, &str); 6] {
        [
            ("Who", self.who.as_str()),
            ("What", self.what.as_str()),
            ("When", self.when.as_str()),
            ("Where", self.where_.as_str()),
            ("How", self.how.as_str()),
            ("How much", self.how_much.as_str()),
        ]
    }
}

/// Static description of a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub role: String,
    pub situation: String,
    pub flow: String,
    pub result: String,
    #[serde(default)]
    pub attribution: Option<AttackAttribution>,
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub hints: Vec<String>,
}

/// A course groups scenarios on the selection page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub scenarios: Vec<String>,
}

/// Check that step ids are unique, dense from 1 and ascending, and that
/// every override points forward to an existing step.
pub fn validate_steps(scenario_id: &str, steps: &[ScenarioStep]) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, step) in steps.iter().enumerate() {
        let expected = index as u32 + 1;
        if !seen.insert(step.id) {
            return Err(Error::InvalidContent(format!(
                "scenario {}: duplicate step id {}",
                scenario_id, step.id
            )));
        }
        if step.id != expected {
            return Err(Error::InvalidContent(format!(
                "scenario {}: step ids must be 1..={} in order, found {} at position {}",
                scenario_id,
                steps.len(),
                step.id,
                expected
            )));
        }
    }

    for step in steps {
        if let Some(next) = step.next_step {
            if next <= step.id || next as usize > steps.len() {
                return Err(Error::InvalidContent(format!(
                    "scenario {}: step {} jumps to invalid step {}",
                    scenario_id, step.id, next
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: u32) -> ScenarioStep {
        ScenarioStep {
            id,
            title: format!("step {}", id),
            description: String::new(),
            tool: Tool::Siem,
            action: ActionKind::Query,
            expected_result: String::new(),
            feedback: Feedback::default(),
            payload: Payload::new(),
            next_step: None,
        }
    }

    #[test]
    fn dense_ascending_steps_are_valid() {
        assert!(validate_steps("s", &[step(1), step(2), step(3)]).is_ok());
        assert!(validate_steps("s", &[]).is_ok());
    }

    #[test]
    fn gaps_and_duplicates_are_rejected() {
        assert!(validate_steps("s", &[step(1), step(3)]).is_err());
        assert!(validate_steps("s", &[step(1), step(1)]).is_err());
        assert!(validate_steps("s", &[step(2), step(1)]).is_err());
    }

    #[test]
    fn backward_override_is_rejected() {
        let mut second = step(2);
        second.next_step = Some(1);
        assert!(validate_steps("s", &[step(1), second, step(3)]).is_err());

        let mut first = step(1);
        first.next_step = Some(3);
        assert!(validate_steps("s", &[first, step(2), step(3)]).is_ok());
    }

    #[test]
    fn unknown_tool_fails_to_parse() {
        let yaml = "id: 1\ntitle: t\ndescription: d\ntool: firewall\naction: click\nexpected_result: r\nfeedback: {success: y, failure: n}\n";
        assert!(serde_yaml::from_str::<ScenarioStep>(yaml).is_err());
    }

    #[test]
    fn payload_keeps_value_kinds() {
        let yaml = "hosts: [WS-01, WS-02]\nevents: 42\nquery: 'index=auth failed'\n";
        let payload: Payload = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(payload["events"], PayloadValue::Number(42.0));
        assert_eq!(payload["query"], PayloadValue::Text("index=auth failed".into()));
        assert_eq!(payload["hosts"].to_string(), "WS-01, WS-02");
    }
}
