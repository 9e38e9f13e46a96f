//! Course catalog
//!
//! Everything a trainee sees is static content: the mission briefing, the
//! quiz, the courses and their scenarios. The built-in catalog is compiled
//! in; a YAML content pack with the same shape can replace it.

pub mod builtin;

use crate::data::*;
use crate::game::trainer::{StepEngine, TrainerOptions};
use crate::game::Lesson;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Opening mission briefing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Briefing {
    pub title: String,
    pub story: Vec<String>,
    pub objectives: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub briefing: Briefing,
    pub quiz: Vec<Question>,
    pub courses: Vec<Course>,
    pub scenarios: Vec<ScenarioDefinition>,
    /// Step lists by scenario id. Scenarios without an entry are briefing-only.
    #[serde(default)]
    pub steps: BTreeMap<String, Vec<ScenarioStep>>,
}

impl Catalog {
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a YAML content pack
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml_str(&text)?;
        info!(
            path = %path.display(),
            courses = catalog.courses.len(),
            scenarios = catalog.scenarios.len(),
            "Content pack loaded"
        );
        Ok(catalog)
    }

    /// Check ids, cross references and every question and step list
    pub fn validate(&self) -> Result<()> {
        let mut question_ids = HashSet::new();
        for question in &self.quiz {
            if !question_ids.insert(question.id.as_str()) {
                return Err(Error::InvalidContent(format!("duplicate question id {}", question.id)));
            }
            question.validate()?;
        }

        let mut scenario_ids = HashSet::new();
        for scenario in &self.scenarios {
            if !scenario_ids.insert(scenario.id.as_str()) {
                return Err(Error::InvalidContent(format!("duplicate scenario id {}", scenario.id)));
            }
            if scenario.time_limit_minutes == Some(0) {
                return Err(Error::InvalidContent(format!(
                    "scenario {}: time limit must be at least one minute",
                    scenario.id
                )));
            }
        }

        let mut course_ids = HashSet::new();
        for course in &self.courses {
            if !course_ids.insert(course.id.as_str()) {
                return Err(Error::InvalidContent(format!("duplicate course id {}", course.id)));
            }
            if let Some(missing) = course.scenarios.iter().find(|s| !scenario_ids.contains(s.as_str())) {
                return Err(Error::InvalidContent(format!(
                    "course {} lists unknown scenario {}",
                    course.id, missing
                )));
            }
        }

        for (scenario_id, steps) in &self.steps {
            if !scenario_ids.contains(scenario_id.as_str()) {
                return Err(Error::InvalidContent(format!(
                    "steps defined for unknown scenario {}",
                    scenario_id
                )));
            }
            validate_steps(scenario_id, steps)?;
        }
        Ok(())
    }

    pub fn course(&self, id: &str) -> Result<&Course> {
        self.courses
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::CourseNotFound(id.to_string()))
    }

    pub fn scenario(&self, id: &str) -> Result<&ScenarioDefinition> {
        self.scenarios
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::ScenarioNotFound(id.to_string()))
    }

    /// Scenarios of a course in course order
    pub fn course_scenarios(&self, course_id: &str) -> Result<Vec<&ScenarioDefinition>> {
        let course = self.course(course_id)?;
        course.scenarios.iter().map(|id| self.scenario(id)).collect()
    }

    /// Step list for a scenario; empty when none is configured
    pub fn steps_for(&self, scenario_id: &str) -> &[ScenarioStep] {
        self.steps.get(scenario_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_interactive(&self, scenario_id: &str) -> bool {
        !self.steps_for(scenario_id).is_empty()
    }

    /// Prepare a lesson. Scenarios without steps fall back to a briefing view.
    pub fn open(&self, scenario_id: &str, options: TrainerOptions) -> Result<Lesson> {
        let scenario = self.scenario(scenario_id)?.clone();
        let steps = self.steps_for(scenario_id);
        if steps.is_empty() {
            warn!(scenario = scenario_id, "No steps configured, showing briefing only");
            return Ok(Lesson::Briefing(scenario));
        }
        debug!(scenario = scenario_id, steps = steps.len(), "Opening interactive lesson");
        let engine = StepEngine::new(scenario, steps.to_vec(), options)?;
        Ok(Lesson::Interactive(Box::new(engine)))
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
