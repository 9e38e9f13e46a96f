//! End-to-end behavior of the timer, quiz and step engines through the
//! public API.

use cyber_academy::game::quiz::{QuizEngine, RewardTier, SubmitOutcome, TierThresholds};
use cyber_academy::game::timer::{CountdownTimer, TimerEvent};
use cyber_academy::game::trainer::{Judgement, Phase, StepEngine, TrainerOptions, WrongToolPolicy};
use cyber_academy::{
    ActionKind, Answer, Feedback, Priority, Question, QuestionKind, ScenarioDefinition, ScenarioStep,
    StepStatus, Tool,
};
use std::time::Duration;

fn scenario(minutes: Option<u32>) -> ScenarioDefinition {
    ScenarioDefinition {
        id: "drill".to_string(),
        title: "Suspicious login".to_string(),
        priority: Priority::P2,
        role: "SOC analyst".to_string(),
        situation: "Alerts are firing.".to_string(),
        flow: String::new(),
        result: String::new(),
        attribution: None,
        time_limit_minutes: minutes,
        hints: Vec::new(),
    }
}

fn step(id: u32, tool: Tool, action: ActionKind) -> ScenarioStep {
    ScenarioStep {
        id,
        title: format!("Step {}", id),
        description: String::new(),
        tool,
        action,
        expected_result: String::new(),
        feedback: Feedback {
            success: format!("Step {} done", id),
            failure: format!("Step {} missed", id),
        },
        payload: Default::default(),
        next_step: None,
    }
}

fn two_step_engine(minutes: Option<u32>) -> StepEngine {
    StepEngine::new(
        scenario(minutes),
        vec![step(1, Tool::Siem, ActionKind::Query), step(2, Tool::Edr, ActionKind::Click)],
        TrainerOptions::default(),
    )
    .unwrap()
}

fn mc(id: &str, answer: usize) -> Question {
    Question {
        id: id.to_string(),
        prompt: format!("{}?", id),
        explanation: String::new(),
        kind: QuestionKind::MultipleChoice {
            choices: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            answer,
        },
    }
}

#[test]
fn timer_expires_exactly_once() {
    for minutes in [1, 2, 5] {
        let mut timer = CountdownTimer::new(minutes);
        timer.start();
        let expirations = (0..minutes * 60 + 30)
            .filter(|_| timer.tick() == TimerEvent::Expired)
            .count();
        assert_eq!(expirations, 1, "{} minute timer", minutes);
        assert_eq!(timer.remaining_secs(), 0);
        assert!(!timer.is_running());
    }
}

#[test]
fn timer_fires_on_the_last_second_under_coarse_advances() {
    let mut timer = CountdownTimer::new(1);
    timer.start();
    assert_eq!(timer.advance(Duration::from_millis(59_900)), TimerEvent::Ticked);
    assert_eq!(timer.remaining_secs(), 1);
    assert_eq!(timer.advance(Duration::from_millis(100)), TimerEvent::Expired);
}

#[test]
fn quiz_scores_two_of_three_as_medium() {
    let mut quiz = QuizEngine::new(vec![mc("q1", 0), mc("q2", 1), mc("q3", 2)], TierThresholds::default());

    assert_eq!(quiz.submit(Answer::Choice(0)).unwrap(), SubmitOutcome::Correct);
    quiz.next();
    assert_eq!(quiz.submit(Answer::Choice(1)).unwrap(), SubmitOutcome::Correct);
    quiz.next();
    assert_eq!(quiz.submit(Answer::Choice(0)).unwrap(), SubmitOutcome::Incorrect);
    quiz.next();

    assert!(quiz.is_completed());
    assert_eq!(quiz.score(), 2);
    assert_eq!(quiz.tier(), RewardTier::Medium);
    assert!(quiz.completion_message().starts_with("2 / 3 correct (67%)"));
}

#[test]
fn quiz_answer_cannot_be_changed() {
    let mut quiz = QuizEngine::new(vec![mc("q1", 0)], TierThresholds::default());
    assert_eq!(quiz.submit(Answer::Choice(2)).unwrap(), SubmitOutcome::Incorrect);
    assert_eq!(quiz.submit(Answer::Choice(0)).unwrap(), SubmitOutcome::AlreadyAnswered);
    assert_eq!(quiz.score(), 0);

    // Navigating away and back keeps the first answer
    quiz.previous();
    assert_eq!(quiz.submit(Answer::Choice(0)).unwrap(), SubmitOutcome::AlreadyAnswered);
    assert!(!quiz.current_record().unwrap().correct);
}

#[test]
fn two_step_drill_completes_after_settle_delays() {
    let mut engine = two_step_engine(None);
    engine.start();
    assert_eq!(engine.phase(), Phase::Running);
    assert_eq!(engine.expected_tool(), Some(Tool::Siem));

    assert_eq!(engine.submit(Tool::Siem, ActionKind::Query, None), Judgement::Success);
    assert_eq!(engine.current_index(), 0);
    engine.advance(Duration::from_millis(1_999));
    assert_eq!(engine.current_index(), 0);
    engine.advance(Duration::from_millis(1));
    assert_eq!(engine.current_index(), 1);

    assert_eq!(engine.submit(Tool::Edr, ActionKind::Click, None), Judgement::Success);
    engine.advance(Duration::from_secs(2));
    assert_eq!(engine.phase(), Phase::Completed);
    assert_eq!(engine.score(), 200);
    assert_eq!(engine.progress(), 1.0);
    assert_eq!(engine.pending_tasks(), 0);

    let messages = engine.chat().len();
    assert_eq!(engine.submit(Tool::Edr, ActionKind::Click, None), Judgement::Ignored);
    assert_eq!(engine.chat().len(), messages);
}

#[test]
fn wrong_action_is_recorded_and_retry_allowed() {
    let mut engine = two_step_engine(None);
    engine.start();
    assert_eq!(engine.submit(Tool::Siem, ActionKind::Click, None), Judgement::Failure);
    assert_eq!(engine.results()[0].status, StepStatus::Failure);
    assert_eq!(engine.results()[0].score, 0);
    assert_eq!(engine.submit(Tool::Siem, ActionKind::Query, None), Judgement::Success);
    assert_eq!(engine.score(), 100);
}

#[test]
fn wrong_tool_is_ignored_unless_penalized() {
    let mut engine = two_step_engine(None);
    engine.start();
    assert_eq!(engine.submit(Tool::Edr, ActionKind::Query, None), Judgement::Ignored);
    assert!(engine.results().is_empty());

    let options = TrainerOptions {
        wrong_tool: WrongToolPolicy::Penalize,
        ..TrainerOptions::default()
    };
    let mut strict = StepEngine::new(
        scenario(None),
        vec![step(1, Tool::Siem, ActionKind::Query)],
        options,
    )
    .unwrap();
    strict.start();
    assert_eq!(strict.submit(Tool::Edr, ActionKind::Query, None), Judgement::Failure);
    assert_eq!(strict.results().len(), 1);
}

#[test]
fn drill_times_out_exactly_once() {
    let mut engine = two_step_engine(Some(1));
    engine.start();
    for _ in 0..60 {
        engine.tick();
    }
    assert_eq!(engine.phase(), Phase::TimedOut);
    let messages = engine.chat().len();

    for _ in 0..30 {
        engine.tick();
    }
    assert_eq!(engine.phase(), Phase::TimedOut);
    assert_eq!(engine.chat().len(), messages);
    assert_eq!(engine.submit(Tool::Siem, ActionKind::Query, None), Judgement::Ignored);
}

#[test]
fn success_pending_at_timeout_is_cancelled() {
    let mut engine = two_step_engine(Some(1));
    engine.start();
    engine.advance(Duration::from_secs(59));
    assert_eq!(engine.submit(Tool::Siem, ActionKind::Query, None), Judgement::Success);
    engine.advance(Duration::from_secs(5));
    assert_eq!(engine.phase(), Phase::TimedOut);
    assert_eq!(engine.current_index(), 0);
    assert_eq!(engine.pending_tasks(), 0);
}

#[test]
fn restart_discards_the_previous_run() {
    let mut engine = two_step_engine(None);
    engine.start();
    let first_run = engine.run_id();
    engine.submit(Tool::Siem, ActionKind::Query, None);
    engine.advance(Duration::from_secs(30));
    engine.submit(Tool::Edr, ActionKind::Click, None);

    engine.restart();
    assert_ne!(engine.run_id(), first_run);
    assert_eq!(engine.phase(), Phase::NotStarted);
    assert_eq!(engine.score(), 0);
    assert!(engine.chat().is_empty());
    assert!(engine.results().is_empty());
    assert_eq!(engine.pending_tasks(), 0);
    assert_eq!(engine.remaining_secs(), 15 * 60);

    // The old deferred advance must not move the new run
    engine.start();
    engine.advance(Duration::from_secs(5));
    assert_eq!(engine.current_index(), 0);
    assert_eq!(engine.phase(), Phase::Running);
}

#[test]
fn terminal_phases_are_exclusive() {
    let mut completed = StepEngine::new(
        scenario(Some(1)),
        vec![step(1, Tool::Siem, ActionKind::Query)],
        TrainerOptions::default(),
    )
    .unwrap();
    completed.start();
    completed.advance(Duration::from_secs(58));
    completed.submit(Tool::Siem, ActionKind::Query, None);
    // The deferred advance falls due on the same instant as the final tick
    completed.advance(Duration::from_secs(2));
    assert_eq!(completed.phase(), Phase::Completed);
    completed.advance(Duration::from_secs(60));
    assert_eq!(completed.phase(), Phase::Completed);
}
