//! Training flow and state management
//!
//! `Academy` is the navigation shell: briefing → quiz → courses →
//! scenarios → lesson. It owns the active quiz and lesson and forwards
//! time to whichever engine is running.

pub mod quiz;
pub mod scheduler;
pub mod timer;
pub mod trainer;

use crate::config::Settings;
use crate::content::Catalog;
use crate::data::ScenarioDefinition;
use crate::Result;
use quiz::QuizEngine;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};
use trainer::{Phase, StepEngine};

/// Page currently shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Briefing,
    Quiz,
    Courses,
    Scenarios { course: String },
    Lesson,
}

/// An opened scenario
#[derive(Debug)]
pub enum Lesson {
    Interactive(Box<StepEngine>),
    /// The scenario has no step list; show its narrative only
    Briefing(ScenarioDefinition),
}

impl Lesson {
    pub fn scenario(&self) -> &ScenarioDefinition {
        match self {
            Lesson::Interactive(engine) => engine.scenario(),
            Lesson::Briefing(scenario) => scenario,
        }
    }

    pub fn engine(&self) -> Option<&StepEngine> {
        match self {
            Lesson::Interactive(engine) => Some(&**engine),
            Lesson::Briefing(_) => None,
        }
    }

    pub fn engine_mut(&mut self) -> Option<&mut StepEngine> {
        match self {
            Lesson::Interactive(engine) => Some(&mut **engine),
            Lesson::Briefing(_) => None,
        }
    }
}

/// Best result of a scenario during this session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub phase: Phase,
    pub score: u32,
}

pub struct Academy {
    catalog: Catalog,
    settings: Settings,
    page: Page,
    quiz: QuizEngine,
    lesson: Option<Lesson>,
    outcomes: HashMap<String, Outcome>,
    notice: Option<String>,
}

impl Academy {
    pub fn new(catalog: Catalog, settings: Settings) -> Self {
        let quiz = QuizEngine::new(catalog.quiz.clone(), settings.tiers);
        Self {
            catalog,
            settings,
            page: Page::Briefing,
            quiz,
            lesson: None,
            outcomes: HashMap::new(),
            notice: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn open_briefing(&mut self) {
        self.page = Page::Briefing;
    }

    pub fn open_quiz(&mut self) {
        self.page = Page::Quiz;
    }

    pub fn open_courses(&mut self) {
        self.record_outcome();
        self.lesson = None;
        self.page = Page::Courses;
    }

    pub fn open_course(&mut self, course_id: &str) -> Result<()> {
        self.catalog.course(course_id)?;
        self.record_outcome();
        self.lesson = None;
        self.page = Page::Scenarios {
            course: course_id.to_string(),
        };
        Ok(())
    }

    /// Open a scenario. Unknown ids leave the current page in place and
    /// surface a notice instead.
    pub fn open_scenario(&mut self, scenario_id: &str) -> Result<()> {
        match self.catalog.open(scenario_id, self.settings.trainer_options()) {
            Ok(lesson) => {
                info!(scenario = scenario_id, interactive = lesson.engine().is_some(), "Lesson opened");
                self.lesson = Some(lesson);
                self.page = Page::Lesson;
                self.notice = None;
                Ok(())
            }
            Err(err) => {
                warn!(scenario = scenario_id, error = %err, "Could not open scenario");
                self.notice = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Leave the lesson for its course's scenario list, or the course list
    pub fn back_to_course(&mut self) {
        self.record_outcome();
        let course = self.lesson.as_ref().and_then(|lesson| {
            let id = &lesson.scenario().id;
            self.catalog
                .courses
                .iter()
                .find(|c| c.scenarios.iter().any(|s| s == id))
                .map(|c| c.id.clone())
        });
        self.lesson = None;
        self.page = match course {
            Some(course) => Page::Scenarios { course },
            None => Page::Courses,
        };
    }

    pub fn quiz(&self) -> &QuizEngine {
        &self.quiz
    }

    pub fn quiz_mut(&mut self) -> &mut QuizEngine {
        &mut self.quiz
    }

    pub fn lesson(&self) -> Option<&Lesson> {
        self.lesson.as_ref()
    }

    pub fn lesson_mut(&mut self) -> Option<&mut Lesson> {
        self.lesson.as_mut()
    }

    pub fn engine(&self) -> Option<&StepEngine> {
        self.lesson.as_ref().and_then(Lesson::engine)
    }

    pub fn engine_mut(&mut self) -> Option<&mut StepEngine> {
        self.lesson.as_mut().and_then(Lesson::engine_mut)
    }

    /// Forward wall time to the running drill
    pub fn advance(&mut self, elapsed: Duration) {
        if let Some(engine) = self.engine_mut() {
            engine.advance(elapsed);
        }
        self.record_outcome();
    }

    pub fn outcome(&self, scenario_id: &str) -> Option<Outcome> {
        self.outcomes.get(scenario_id).copied()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    fn record_outcome(&mut self) {
        let Some(engine) = self.engine() else {
            return;
        };
        if !engine.phase().is_terminal() {
            return;
        }
        let id = engine.scenario().id.clone();
        let outcome = Outcome {
            phase: engine.phase(),
            score: engine.score(),
        };
        let better = match self.outcomes.get(&id) {
            None => true,
            Some(prev) => {
                (outcome.phase == Phase::Completed && prev.phase != Phase::Completed)
                    || (outcome.phase == prev.phase && outcome.score > prev.score)
            }
        };
        if better {
            self.outcomes.insert(id, outcome);
        }
    }
}
