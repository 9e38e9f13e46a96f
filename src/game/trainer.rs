//! Scenario step engine
//!
//! Drives one training run through a scenario's ordered steps:
//! `NotStarted -> Running -> Completed | TimedOut`.
//!
//! Time only moves through [`StepEngine::advance`], which interleaves the
//! countdown ticks with the deferred step advances in time order. A
//! deferred advance is keyed by run and step; restarting mints a new run
//! id and cancels everything still pending, so nothing from a previous run
//! can touch the new one.

use super::scheduler::{Scheduler, TaskKey};
use super::timer::{CountdownTimer, TimerEvent};
use crate::data::*;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    Running,
    Completed,
    TimedOut,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::TimedOut)
    }
}

/// How a submission from the wrong console is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrongToolPolicy {
    /// Silently ignored; the engine keeps advertising the expected tool
    #[default]
    Ignore,
    /// Scored as a failure, like a wrong action
    Penalize,
}

#[derive(Debug, Clone)]
pub struct TrainerOptions {
    /// Timer length for scenarios without their own limit
    pub default_minutes: u32,
    pub settle_delay: Duration,
    pub wrong_tool: WrongToolPolicy,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        Self {
            default_minutes: 15,
            settle_delay: Duration::from_secs(2),
            wrong_tool: WrongToolPolicy::Ignore,
        }
    }
}

/// Verdict on one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgement {
    Success,
    Failure,
    /// Not evaluated: wrong phase, step already answered, or wrong tool
    Ignored,
}

#[derive(Debug)]
pub struct StepEngine {
    scenario: ScenarioDefinition,
    steps: Vec<ScenarioStep>,
    options: TrainerOptions,
    run: RunId,
    phase: Phase,
    cursor: usize,
    answered: bool,
    paused: bool,
    timer: CountdownTimer,
    /// Pending step advances; the key alone says which step to leave
    scheduler: Scheduler<()>,
    chat: ChatLog,
    results: Vec<StepResult>,
    score: u32,
}

impl StepEngine {
    /// Build an engine for a scenario with at least one step
    pub fn new(
        scenario: ScenarioDefinition,
        steps: Vec<ScenarioStep>,
        options: TrainerOptions,
    ) -> Result<Self> {
        if steps.is_empty() {
            return Err(Error::InvalidContent(format!(
                "scenario {} has no interactive steps",
                scenario.id
            )));
        }
        validate_steps(&scenario.id, &steps)?;

        let minutes = scenario.time_limit_minutes.unwrap_or(options.default_minutes);
        if minutes == 0 {
            return Err(Error::InvalidContent(format!(
                "scenario {}: time limit must be at least one minute",
                scenario.id
            )));
        }
        Ok(Self {
            timer: CountdownTimer::new(minutes),
            scenario,
            steps,
            options,
            run: RunId::new(),
            phase: Phase::NotStarted,
            cursor: 0,
            answered: false,
            paused: false,
            scheduler: Scheduler::new(),
            chat: ChatLog::new(),
            results: Vec::new(),
            score: 0,
        })
    }

    pub fn start(&mut self) {
        if self.phase != Phase::NotStarted {
            return;
        }
        self.phase = Phase::Running;
        self.timer.start();
        info!(scenario = %self.scenario.id, run_id = %self.run, "Training run started");

        let tone = if self.scenario.priority <= Priority::P2 {
            Tone::Warning
        } else {
            Tone::Info
        };
        let opening = format!(
            "{} incident declared: {}. You are acting as {}.",
            self.scenario.priority, self.scenario.title, self.scenario.role
        );
        self.chat.system(&opening, tone);
        self.announce_step();
    }

    /// Judge an action performed in a simulated console
    pub fn submit(&mut self, tool: Tool, action: ActionKind, payload: Option<Payload>) -> Judgement {
        if self.phase != Phase::Running || self.answered || self.paused {
            debug!(phase = ?self.phase, answered = self.answered, "Submission ignored");
            return Judgement::Ignored;
        }
        let step = &self.steps[self.cursor];

        if tool != step.tool && self.options.wrong_tool == WrongToolPolicy::Ignore {
            debug!(step = step.id, expected = %step.tool, got = %tool, "Wrong tool ignored");
            return Judgement::Ignored;
        }

        let step_id = step.id;
        let payload = payload.unwrap_or_else(|| step.payload.clone());

        if tool == step.tool && action == step.action {
            let feedback = step.feedback.success.clone();
            let result = StepResult::new(step_id, StepStatus::Success, payload);
            self.score += result.score;
            self.results.push(result);
            self.chat.system(&feedback, Tone::Success);
            self.answered = true;
            self.scheduler.schedule(
                self.options.settle_delay,
                TaskKey { run: self.run, step_id },
                (),
            );
            info!(run_id = %self.run, step = step_id, score = self.score, "Step succeeded");
            Judgement::Success
        } else {
            let feedback = step.feedback.failure.clone();
            self.results.push(StepResult::new(step_id, StepStatus::Failure, payload));
            self.chat.system(&feedback, Tone::Error);
            info!(run_id = %self.run, step = step_id, tool = %tool, action = %action, "Step failed");
            Judgement::Failure
        }
    }

    /// Let time pass: countdown ticks and deferred advances, in time order.
    /// A deferred advance due on the same instant as a tick runs first.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.paused {
            return;
        }
        self.run_due_tasks();

        let mut budget = elapsed;
        while !budget.is_zero() {
            let slice = [self.scheduler.until_next(), self.timer.until_next_tick()]
                .into_iter()
                .flatten()
                .min()
                .map_or(budget, |next| next.min(budget));
            if slice.is_zero() {
                break;
            }

            let event = self.timer.advance(slice);
            self.scheduler.elapse(slice);
            budget -= slice;

            self.run_due_tasks();
            if event == TimerEvent::Expired {
                self.time_out();
            }
        }
    }

    /// One second of wall time
    pub fn tick(&mut self) {
        self.advance(Duration::from_secs(1));
    }

    /// Freeze the countdown and pending advances
    pub fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.paused = true;
            self.timer.pause();
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if self.phase == Phase::Running {
                self.timer.start();
            }
        }
    }

    /// Back to `NotStarted` with a fresh run id; pending work is dropped
    pub fn restart(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        let previous = self.run;
        self.run = RunId::new();
        self.phase = Phase::NotStarted;
        self.cursor = 0;
        self.answered = false;
        self.paused = false;
        self.timer.reset();
        self.chat = ChatLog::new();
        self.results.clear();
        self.score = 0;
        info!(scenario = %self.scenario.id, previous = %previous, run_id = %self.run, cancelled, "Training run restarted");
    }

    fn run_due_tasks(&mut self) {
        for task in self.scheduler.take_due() {
            let live = task.key.run == self.run
                && self.phase == Phase::Running
                && self.answered
                && self.steps[self.cursor].id == task.key.step_id;
            if !live {
                debug!(step = task.key.step_id, "Discarding stale deferred task");
                continue;
            }
            self.advance_cursor();
        }
    }

    fn advance_cursor(&mut self) {
        let step = &self.steps[self.cursor];
        let next = match step.next_step {
            Some(id) => id as usize - 1,
            None => self.cursor + 1,
        };

        if next >= self.steps.len() {
            self.complete();
            return;
        }
        debug!(from = step.id, to = self.steps[next].id, "Advancing to next step");
        self.cursor = next;
        self.answered = false;
        self.announce_step();
    }

    fn announce_step(&mut self) {
        let step = &self.steps[self.cursor];
        let text = format!(
            "Step {}/{}: {}",
            step.id,
            self.steps.len(),
            step.title
        );
        self.chat.system(&text, Tone::Info);
    }

    fn complete(&mut self) {
        self.phase = Phase::Completed;
        self.answered = false;
        self.timer.pause();
        let text = format!(
            "Incident resolved. Well done, analyst! Score {} with {} left on the clock.",
            self.score,
            self.timer.display()
        );
        self.chat.system(&text, Tone::Success);
        info!(scenario = %self.scenario.id, run_id = %self.run, score = self.score, "Training run completed");
    }

    fn time_out(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::TimedOut;
        self.answered = false;
        self.scheduler.cancel_run(self.run);
        let step = &self.steps[self.cursor];
        let text = format!(
            "Time is up. The incident escalated while you were on step {}: {}.",
            step.id, step.title
        );
        self.chat.system(&text, Tone::Warning);
        warn!(scenario = %self.scenario.id, run_id = %self.run, step = step.id, "Training run timed out");
    }

    pub fn scenario(&self) -> &ScenarioDefinition {
        &self.scenario
    }

    pub fn steps(&self) -> &[ScenarioStep] {
        &self.steps
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run_id(&self) -> RunId {
        self.run
    }

    /// Index of the current step; stays on the last step once finished
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    pub fn current_step(&self) -> Option<&ScenarioStep> {
        if self.phase == Phase::Completed {
            None
        } else {
            self.steps.get(self.cursor)
        }
    }

    /// Tool the current step expects, offered to the UI as a hint
    pub fn expected_tool(&self) -> Option<Tool> {
        (self.phase == Phase::Running).then(|| self.steps[self.cursor].tool)
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_score(&self) -> u32 {
        self.steps.len() as u32 * STEP_SUCCESS_SCORE
    }

    /// Steps done so far
    pub fn completed_steps(&self) -> usize {
        match self.phase {
            Phase::Completed => self.steps.len(),
            _ => self.cursor + usize::from(self.answered),
        }
    }

    /// Fraction of steps done, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        self.completed_steps() as f64 / self.steps.len() as f64
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn remaining_secs(&self) -> u32 {
        self.timer.remaining_secs()
    }

    /// Deferred advances waiting to fire
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }
}
