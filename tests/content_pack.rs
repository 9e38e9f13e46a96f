//! Loading YAML content packs and driving them through the academy shell.

use cyber_academy::game::trainer::{Judgement, Phase};
use cyber_academy::game::{Lesson, Page};
use cyber_academy::{Academy, ActionKind, Answer, Catalog, Error, Settings, Tool};
use std::time::Duration;

const PACK: &str = r#"
briefing:
  title: Lunch and Learn
  story:
    - A short refresher for new starters.
  objectives:
    - Spot a phish
quiz:
  - id: q-link
    prompt: Hover before you click?
    explanation: Hovering reveals the real destination.
    type: true_false
    answer: true
  - id: q-report
    prompt: Who do you tell about a phish?
    explanation: The security team triages every report.
    type: free_text
    accepted: [security team, soc]
  - id: q-match
    prompt: Match each console to its job.
    explanation: SIEM searches logs, EDR acts on hosts.
    type: drag_match
    items:
      - { id: siem, label: SIEM }
      - { id: edr, label: EDR }
    zones:
      - { id: logs, label: Search logs, correct_item: siem }
      - { id: hosts, label: Isolate a host, correct_item: edr }
courses:
  - id: basics
    title: Basics
    summary: First steps
    scenarios: [fake-invoice, tailgate]
scenarios:
  - id: fake-invoice
    title: Fake invoice
    priority: P3
    role: Accounts clerk
    situation: An unexpected invoice arrives.
    flow: The attachment drops a loader.
    result: The loader was blocked.
    time_limit_minutes: 2
  - id: tailgate
    title: Tailgating
    priority: P4
    role: Receptionist
    situation: Someone follows staff through the door.
    flow: They reach the server room.
    result: Badge policy was reinforced.
    hints: [Challenge unknown visitors]
steps:
  fake-invoice:
    - id: 1
      title: Find the mail
      description: Search for the sender.
      tool: siem
      action: query
      expected_result: Mail found
      feedback: { success: Found it., failure: Not there. }
      payload: { sender: billing@examp1e.com, hits: 3 }
      next_step: 3
    - id: 2
      title: Skipped step
      description: Never reached.
      tool: tip
      action: analyze
      expected_result: n/a
      feedback: { success: Done., failure: Missed. }
    - id: 3
      title: Quarantine
      description: Pull the mail from every inbox.
      tool: soar
      action: confirm
      expected_result: Mail purged
      feedback: { success: Purged., failure: Try again. }
"#;

fn academy() -> Academy {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, PACK.as_bytes()).unwrap();
    let catalog = Catalog::load(file.path()).unwrap();
    Academy::new(catalog, Settings::default())
}

#[test]
fn pack_loads_every_question_type() {
    let a = academy();
    assert_eq!(a.catalog().briefing.title, "Lunch and Learn");
    assert_eq!(a.catalog().quiz.len(), 3);
    assert!(a.catalog().is_interactive("fake-invoice"));
    assert!(!a.catalog().is_interactive("tailgate"));
}

#[test]
fn pack_quiz_accepts_normalized_text_and_drag_placement() {
    let mut a = academy();
    a.open_quiz();
    let quiz = a.quiz_mut();
    quiz.submit(Answer::TrueFalse(true)).unwrap();
    quiz.next();
    quiz.submit(Answer::Text("  Security Team ".to_string())).unwrap();
    quiz.next();
    quiz.assign("logs", "siem").unwrap();
    quiz.assign("hosts", "edr").unwrap();
    assert!(quiz.is_answered());
    quiz.next();
    assert!(quiz.is_completed());
    assert_eq!(quiz.score(), 3);
}

#[test]
fn forward_override_skips_a_step() {
    let mut a = academy();
    a.open_course("basics").unwrap();
    a.open_scenario("fake-invoice").unwrap();
    assert_eq!(a.page(), &Page::Lesson);

    let engine = a.engine_mut().unwrap();
    assert_eq!(engine.remaining_secs(), 120);
    engine.start();
    assert_eq!(engine.submit(Tool::Siem, ActionKind::Query, None), Judgement::Success);
    // Recorded payload falls back to the step's own payload
    assert_eq!(engine.results()[0].payload.len(), 2);

    a.advance(Duration::from_secs(2));
    let engine = a.engine_mut().unwrap();
    assert_eq!(engine.current_step().unwrap().id, 3);
    engine.submit(Tool::Soar, ActionKind::Confirm, None);
    a.advance(Duration::from_secs(2));

    assert_eq!(a.engine().unwrap().phase(), Phase::Completed);
    a.back_to_course();
    assert_eq!(a.outcome("fake-invoice").unwrap().score, 200);
    assert_eq!(a.page(), &Page::Scenarios { course: "basics".to_string() });
}

#[test]
fn stepless_scenario_opens_as_reading() {
    let mut a = academy();
    a.open_scenario("tailgate").unwrap();
    match a.lesson() {
        Some(Lesson::Briefing(scenario)) => assert_eq!(scenario.hints.len(), 1),
        other => panic!("expected a briefing lesson, got {:?}", other),
    }
}

#[test]
fn backward_override_is_rejected() {
    let broken = PACK.replace("next_step: 3", "next_step: 1");
    assert!(matches!(Catalog::from_yaml_str(&broken), Err(Error::InvalidContent(_))));
}

#[test]
fn steps_for_unknown_scenario_are_rejected() {
    let broken = PACK.replace("  fake-invoice:\n    - id: 1", "  ghost:\n    - id: 1");
    assert!(matches!(Catalog::from_yaml_str(&broken), Err(Error::InvalidContent(_))));
}

#[test]
fn malformed_pack_is_a_yaml_error() {
    assert!(matches!(Catalog::from_yaml_str("quiz: [unclosed"), Err(Error::Yaml(_))));
}
