//! Main application state and rendering

use crate::data::{ActionKind, Answer, Priority, QuestionKind, Tone, Tool};
use crate::game::quiz::{RewardTier, SubmitOutcome};
use crate::game::trainer::{Phase, StepEngine};
use crate::game::{Academy, Lesson, Page};
use crate::tui::widgets::{AlertIndicator, DramaticBox, MeterBar};
use crate::tui::{centered_rect, priority_color, styled_block, tone_color, Theme, HELP_TEXT, LOGO, SMALL_LOGO};
use crate::tui::{create_content_layout, create_main_layout, create_side_layout};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};
use std::time::Duration;
use tracing::{debug, warn};

/// Application state
pub struct App {
    pub academy: Academy,
    pub theme: Theme,
    pub running: bool,
    pub show_help: bool,
    /// Selection in whatever list the current page shows
    pub menu_state: ListState,
    /// Free-text answer being typed
    pub input_buffer: String,
    /// Console the trainee is working in
    pub tool: Tool,
    pub action_state: ListState,
    /// Lines scrolled up from the bottom of the chat
    pub chat_scroll: u16,
}

impl App {
    pub fn new(academy: Academy) -> Self {
        let mut menu_state = ListState::default();
        menu_state.select(Some(0));
        let mut action_state = ListState::default();
        action_state.select(Some(0));

        Self {
            academy,
            theme: Theme::default(),
            running: true,
            show_help: false,
            menu_state,
            input_buffer: String::new(),
            tool: Tool::Siem,
            action_state,
            chat_scroll: 0,
        }
    }

    /// Poll for one key press. Returns `false` once the user quits.
    pub fn handle_input(&mut self) -> std::io::Result<bool> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(self.running)
    }

    /// Let wall time pass for the running drill
    pub fn on_tick(&mut self, elapsed: Duration) {
        self.academy.advance(elapsed);
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if self.is_typing() && self.handle_typing(code) {
            return;
        }

        match code {
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                return;
            }
            KeyCode::Esc if self.show_help => {
                self.show_help = false;
                return;
            }
            _ => {}
        }
        if self.show_help {
            return;
        }

        if self.academy.notice().is_some() {
            self.academy.clear_notice();
        }

        match self.academy.page().clone() {
            Page::Briefing => self.handle_briefing_key(code),
            Page::Quiz => self.handle_quiz_key(code),
            Page::Courses => self.handle_courses_key(code),
            Page::Scenarios { course } => self.handle_scenarios_key(code, &course),
            Page::Lesson => self.handle_lesson_key(code),
        }
    }

    /// Free-text question still open for an answer
    fn is_typing(&self) -> bool {
        if self.show_help || *self.academy.page() != Page::Quiz {
            return false;
        }
        let quiz = self.academy.quiz();
        !quiz.is_completed()
            && !quiz.is_answered()
            && matches!(quiz.current().map(|q| &q.kind), Some(QuestionKind::FreeText { .. }))
    }

    /// Returns `true` if the key was consumed by the input line
    fn handle_typing(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                true
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                true
            }
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input_buffer);
                if !text.trim().is_empty() {
                    self.submit_answer(Answer::Text(text));
                }
                true
            }
            _ => false,
        }
    }

    fn handle_briefing_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Enter => {
                self.academy.open_quiz();
                self.reset_selection();
            }
            KeyCode::Char('c') => {
                self.academy.open_courses();
                self.reset_selection();
            }
            _ => {}
        }
    }

    fn handle_quiz_key(&mut self, code: KeyCode) {
        if self.academy.quiz().is_completed() || self.academy.quiz().is_empty() {
            match code {
                KeyCode::Enter | KeyCode::Char('c') => {
                    self.academy.open_courses();
                    self.reset_selection();
                }
                KeyCode::Char('r') => {
                    self.academy.quiz_mut().restart();
                    self.reset_selection();
                }
                KeyCode::Esc => self.academy.open_briefing(),
                _ => {}
            }
            return;
        }

        let Some(kind) = self.academy.quiz().current().map(|q| q.kind.clone()) else {
            return;
        };
        let answered = self.academy.quiz().is_answered();

        match code {
            KeyCode::Esc => self.academy.open_briefing(),
            KeyCode::Left => {
                self.academy.quiz_mut().previous();
                self.reset_selection();
            }
            KeyCode::Right => {
                self.academy.quiz_mut().next();
                self.reset_selection();
            }
            KeyCode::Enter if answered => {
                self.academy.quiz_mut().next();
                self.reset_selection();
            }
            KeyCode::Up => self.navigate_up(),
            KeyCode::Down => self.navigate_down(),
            KeyCode::Enter => {
                let selected = self.menu_state.selected().unwrap_or(0);
                match kind {
                    QuestionKind::MultipleChoice { .. } => self.submit_answer(Answer::Choice(selected)),
                    QuestionKind::TrueFalse { .. } => self.submit_answer(Answer::TrueFalse(selected == 0)),
                    _ => {}
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                if let QuestionKind::DragMatch { items, zones } = &kind {
                    let n = c as usize - '1' as usize;
                    let zone = self.menu_state.selected().and_then(|i| zones.get(i));
                    if let (Some(zone), Some(item)) = (zone, items.get(n)) {
                        let zone_id = zone.id.clone();
                        match self.academy.quiz_mut().assign(&zone_id, &item.id) {
                            Ok(SubmitOutcome::Pending) => self.navigate_down(),
                            Ok(outcome) => debug!(?outcome, "Drag placement judged"),
                            Err(err) => warn!(error = %err, "Placement rejected"),
                        }
                    }
                }
            }
            KeyCode::Backspace => {
                if let QuestionKind::DragMatch { zones, .. } = &kind {
                    if let Some(zone) = self.menu_state.selected().and_then(|i| zones.get(i)) {
                        let zone_id = zone.id.clone();
                        self.academy.quiz_mut().unassign(&zone_id);
                    }
                }
            }
            _ => {}
        }
    }

    fn submit_answer(&mut self, answer: Answer) {
        match self.academy.quiz_mut().submit(answer) {
            Ok(outcome) => debug!(?outcome, "Quiz answer submitted"),
            Err(err) => warn!(error = %err, "Answer rejected"),
        }
    }

    fn handle_courses_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.academy.open_briefing(),
            KeyCode::Up => self.navigate_up(),
            KeyCode::Down => self.navigate_down(),
            KeyCode::Enter => {
                let selected = self.menu_state.selected().unwrap_or(0);
                let Some(id) = self.academy.catalog().courses.get(selected).map(|c| c.id.clone()) else {
                    return;
                };
                if self.academy.open_course(&id).is_ok() {
                    self.reset_selection();
                }
            }
            _ => {}
        }
    }

    fn handle_scenarios_key(&mut self, code: KeyCode, course: &str) {
        match code {
            KeyCode::Esc => {
                self.academy.open_courses();
                self.reset_selection();
            }
            KeyCode::Up => self.navigate_up(),
            KeyCode::Down => self.navigate_down(),
            KeyCode::Enter => {
                let selected = self.menu_state.selected().unwrap_or(0);
                let id = self
                    .academy
                    .catalog()
                    .course(course)
                    .ok()
                    .and_then(|c| c.scenarios.get(selected).cloned());
                let Some(id) = id else {
                    return;
                };
                // Failure leaves a notice on the current page
                if self.academy.open_scenario(&id).is_ok() {
                    self.tool = Tool::Siem;
                    self.action_state.select(Some(0));
                    self.chat_scroll = 0;
                }
            }
            _ => {}
        }
    }

    fn handle_lesson_key(&mut self, code: KeyCode) {
        let Some(engine) = self.academy.engine_mut() else {
            // Briefing-only lesson
            if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('b')) {
                self.leave_lesson();
            }
            return;
        };
        let phase = engine.phase();
        let paused = engine.is_paused();

        match code {
            KeyCode::Char('s') if phase == Phase::NotStarted => engine.start(),
            KeyCode::Char('r') => {
                engine.restart();
                self.chat_scroll = 0;
            }
            KeyCode::Esc if phase == Phase::Running => {
                if paused {
                    engine.resume();
                } else {
                    engine.pause();
                }
            }
            KeyCode::Esc | KeyCode::Char('b') if phase != Phase::Running || paused => self.leave_lesson(),
            KeyCode::Tab => self.tool = next_tool(self.tool, 1),
            KeyCode::BackTab => self.tool = next_tool(self.tool, Tool::ALL.len() - 1),
            KeyCode::F(n @ 1..=6) => self.tool = Tool::ALL[usize::from(n) - 1],
            KeyCode::Up => {
                let i = self.action_state.selected().unwrap_or(0);
                self.action_state.select(Some(i.saturating_sub(1)));
            }
            KeyCode::Down => {
                let i = self.action_state.selected().unwrap_or(0);
                self.action_state.select(Some((i + 1).min(ActionKind::ALL.len() - 1)));
            }
            KeyCode::Enter if phase == Phase::Running => {
                let action = ActionKind::ALL[self.action_state.selected().unwrap_or(0)];
                let judgement = engine.submit(self.tool, action, None);
                debug!(tool = %self.tool, action = %action, ?judgement, "Console action");
                self.chat_scroll = 0;
            }
            KeyCode::PageUp => self.chat_scroll = self.chat_scroll.saturating_add(5),
            KeyCode::PageDown => self.chat_scroll = self.chat_scroll.saturating_sub(5),
            _ => {}
        }
    }

    fn leave_lesson(&mut self) {
        self.academy.back_to_course();
        self.chat_scroll = 0;
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        self.menu_state.select(Some(0));
        self.input_buffer.clear();
    }

    fn list_len(&self) -> usize {
        match self.academy.page() {
            Page::Quiz => match self.academy.quiz().current().map(|q| &q.kind) {
                Some(QuestionKind::MultipleChoice { choices, .. }) => choices.len(),
                Some(QuestionKind::TrueFalse { .. }) => 2,
                Some(QuestionKind::DragMatch { zones, .. }) => zones.len(),
                _ => 0,
            },
            Page::Courses => self.academy.catalog().courses.len(),
            Page::Scenarios { course } => self
                .academy
                .catalog()
                .course(course)
                .map(|c| c.scenarios.len())
                .unwrap_or(0),
            Page::Briefing | Page::Lesson => 0,
        }
    }

    fn navigate_up(&mut self) {
        let i = self.menu_state.selected().unwrap_or(0);
        if i > 0 {
            self.menu_state.select(Some(i - 1));
        }
    }

    fn navigate_down(&mut self) {
        let max = self.list_len().saturating_sub(1);
        let i = self.menu_state.selected().unwrap_or(0);
        if i < max {
            self.menu_state.select(Some(i + 1));
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        match self.academy.page().clone() {
            Page::Briefing => self.render_briefing(frame),
            Page::Quiz => self.render_quiz(frame),
            Page::Courses => self.render_courses(frame),
            Page::Scenarios { course } => self.render_scenarios(frame, &course),
            Page::Lesson => self.render_lesson(frame),
        }

        // Overlay help if showing
        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_briefing(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9),   // Logo
                Constraint::Min(8),      // Story
                Constraint::Length(1),   // Status bar
            ])
            .split(area);

        let logo = Paragraph::new(LOGO)
            .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        frame.render_widget(logo, chunks[0]);

        let briefing = &self.academy.catalog().briefing;
        let mut lines: Vec<Line> = briefing
            .story
            .iter()
            .flat_map(|para| [Line::from(para.as_str()), Line::from("")])
            .collect();
        lines.push(Line::from(Span::styled(
            "Objectives",
            Style::default().fg(self.theme.warning).add_modifier(Modifier::BOLD),
        )));
        for objective in &briefing.objectives {
            lines.push(Line::from(format!("  ▸ {}", objective)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[Enter] Take the quiz   [C] Skip to courses   [Q] Quit",
            Style::default().fg(self.theme.success),
        )));

        let story = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(styled_block(&briefing.title, &self.theme));
        frame.render_widget(story, chunks[1]);

        self.render_status_bar(frame, chunks[2]);
    }

    fn render_quiz(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let layout = create_main_layout(area);

        let quiz = self.academy.quiz();
        let title = if quiz.is_completed() || quiz.is_empty() {
            "Quiz results".to_string()
        } else {
            format!("Question {} of {}", quiz.index() + 1, quiz.len())
        };
        self.render_header(frame, layout[0], &title, None);

        if quiz.is_completed() || quiz.is_empty() {
            self.render_quiz_results(frame, layout[1]);
        } else {
            self.render_question(frame, layout[1]);
        }

        self.render_status_bar(frame, layout[2]);
    }

    fn render_question(&mut self, frame: &mut Frame, area: Rect) {
        let quiz = self.academy.quiz();
        let Some(question) = quiz.current() else {
            return;
        };
        let record = quiz.current_record().cloned();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),   // Prompt
                Constraint::Min(6),      // Answer area
                Constraint::Length(6),   // Verdict + explanation
            ])
            .split(area);

        let prompt = Paragraph::new(question.prompt.as_str())
            .wrap(Wrap { trim: true })
            .block(styled_block(question.kind.name(), &self.theme));
        frame.render_widget(prompt, chunks[0]);

        let highlight = Style::default().fg(Color::Black).bg(self.theme.accent);
        match &question.kind {
            QuestionKind::MultipleChoice { choices, .. } => {
                let items: Vec<ListItem> = choices
                    .iter()
                    .enumerate()
                    .map(|(i, c)| ListItem::new(format!("  {}. {}", (b'A' + i as u8) as char, c)))
                    .collect();
                let list = List::new(items)
                    .block(styled_block("Choose one [↑/↓, Enter]", &self.theme))
                    .highlight_style(highlight);
                frame.render_stateful_widget(list, chunks[1], &mut self.menu_state);
            }
            QuestionKind::TrueFalse { .. } => {
                let list = List::new(vec![ListItem::new("  True"), ListItem::new("  False")])
                    .block(styled_block("True or false? [↑/↓, Enter]", &self.theme))
                    .highlight_style(highlight);
                frame.render_stateful_widget(list, chunks[1], &mut self.menu_state);
            }
            QuestionKind::FreeText { .. } => {
                let text = match &record {
                    Some(r) => match &r.answer {
                        Answer::Text(t) => t.clone(),
                        _ => String::new(),
                    },
                    None => format!("{}█", self.input_buffer),
                };
                let input = Paragraph::new(format!("> {}", text))
                    .style(Style::default().fg(self.theme.success))
                    .block(styled_block("Type your answer [Enter]", &self.theme));
                frame.render_widget(input, chunks[1]);
            }
            QuestionKind::DragMatch { items, zones } => {
                let halves = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                    .split(chunks[1]);

                let pool: Vec<ListItem> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| ListItem::new(format!("  [{}] {}", i + 1, item.label)))
                    .collect();
                frame.render_widget(List::new(pool).block(styled_block("Items", &self.theme)), halves[0]);

                let placement = quiz.placement().cloned().unwrap_or_default();
                let rows: Vec<ListItem> = zones
                    .iter()
                    .map(|zone| {
                        let placed = placement
                            .get(&zone.id)
                            .and_then(|id| items.iter().find(|i| &i.id == id))
                            .map_or("(empty)", |i| i.label.as_str());
                        ListItem::new(format!("  {} ← {}", zone.label, placed))
                    })
                    .collect();
                let list = List::new(rows)
                    .block(styled_block("Drop zones [↑/↓, 1-9 place, Bksp clear]", &self.theme))
                    .highlight_style(highlight);
                frame.render_stateful_widget(list, halves[1], &mut self.menu_state);
            }
        }

        let verdict = match &record {
            None => vec![Line::from(Span::styled(
                "Awaiting your answer",
                Style::default().fg(self.theme.border),
            ))],
            Some(r) => {
                let (label, color) = if r.correct {
                    ("✔ Correct", self.theme.success)
                } else {
                    ("✖ Incorrect", self.theme.alert)
                };
                let mut lines = vec![Line::from(Span::styled(
                    label,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))];
                if !r.correct {
                    lines.push(Line::from(format!("Answer: {}", question.correct_answer_text())));
                }
                lines.push(Line::from(question.explanation.as_str()));
                lines.push(Line::from(Span::styled(
                    "[Enter] Next question",
                    Style::default().fg(self.theme.accent),
                )));
                lines
            }
        };
        let panel = Paragraph::new(verdict)
            .wrap(Wrap { trim: true })
            .block(styled_block("Feedback", &self.theme));
        frame.render_widget(panel, chunks[2]);
    }

    fn render_quiz_results(&self, frame: &mut Frame, area: Rect) {
        let quiz = self.academy.quiz();
        let tier = quiz.tier();
        let color = match tier {
            RewardTier::High => self.theme.success,
            RewardTier::Medium => self.theme.warning,
            RewardTier::Low => self.theme.alert,
        };
        let lines = vec![
            String::new(),
            tier.badge().to_string(),
            String::new(),
            quiz.completion_message(),
            String::new(),
            "[Enter] Continue to courses   [R] Retake   [Esc] Briefing".to_string(),
        ];
        let popup = centered_rect(70, 9, area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            DramaticBox::new("QUIZ COMPLETE").content(lines).border_color(color),
            popup,
        );
    }

    fn render_courses(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let layout = create_main_layout(area);
        self.render_header(frame, layout[0], "Courses", None);

        let chunks = create_content_layout(layout[1]);
        let catalog = self.academy.catalog();
        let items: Vec<ListItem> = catalog
            .courses
            .iter()
            .map(|c| {
                let done = c
                    .scenarios
                    .iter()
                    .filter(|id| {
                        self.academy
                            .outcome(id)
                            .is_some_and(|o| o.phase == Phase::Completed)
                    })
                    .count();
                ListItem::new(format!("  {} ({}/{})", c.title, done, c.scenarios.len()))
            })
            .collect();
        let list = List::new(items)
            .block(styled_block("Select a course", &self.theme))
            .highlight_style(Style::default().fg(Color::Black).bg(self.theme.accent));

        let summary = self
            .menu_state
            .selected()
            .and_then(|i| catalog.courses.get(i))
            .map(|c| c.summary.clone())
            .unwrap_or_default();
        let details = Paragraph::new(summary)
            .wrap(Wrap { trim: true })
            .block(styled_block("About", &self.theme));

        frame.render_stateful_widget(list, chunks[0], &mut self.menu_state);
        frame.render_widget(details, chunks[1]);
        self.render_status_bar(frame, layout[2]);
    }

    fn render_scenarios(&mut self, frame: &mut Frame, course: &str) {
        let area = frame.area();
        let layout = create_main_layout(area);
        let catalog = self.academy.catalog();
        let title = catalog.course(course).map_or(course.to_string(), |c| c.title.clone());
        self.render_header(frame, layout[0], &title, None);

        let chunks = create_content_layout(layout[1]);
        let ids: Vec<String> = catalog.course(course).map(|c| c.scenarios.clone()).unwrap_or_default();
        let items: Vec<ListItem> = ids
            .iter()
            .map(|id| {
                let Ok(scenario) = catalog.scenario(id) else {
                    return ListItem::new(format!("  ? {}", id));
                };
                let mark = match self.academy.outcome(id) {
                    Some(o) if o.phase == Phase::Completed => format!(" ✔ {}", o.score),
                    Some(_) => " ✖ timed out".to_string(),
                    None => String::new(),
                };
                let kind = if catalog.is_interactive(id) { "drill" } else { "read" };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("  [{}] ", scenario.priority.label()),
                        Style::default().fg(priority_color(scenario.priority)),
                    ),
                    Span::raw(format!("{} ({}){}", scenario.title, kind, mark)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(styled_block("Scenarios", &self.theme))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let details = self
            .menu_state
            .selected()
            .and_then(|i| ids.get(i))
            .and_then(|id| catalog.scenario(id).ok())
            .map(|s| {
                vec![
                    Line::from(Span::styled(
                        format!("{} | {}", s.priority, s.role),
                        Style::default().fg(priority_color(s.priority)),
                    )),
                    Line::from(""),
                    Line::from(s.situation.as_str()),
                ]
            })
            .unwrap_or_default();
        let details = Paragraph::new(details)
            .wrap(Wrap { trim: true })
            .block(styled_block("Situation", &self.theme));

        frame.render_stateful_widget(list, chunks[0], &mut self.menu_state);
        frame.render_widget(details, chunks[1]);
        self.render_status_bar(frame, layout[2]);
    }

    fn render_lesson(&mut self, frame: &mut Frame) {
        match self.academy.lesson() {
            Some(Lesson::Interactive(_)) => self.render_drill(frame),
            Some(Lesson::Briefing(_)) => self.render_reading(frame),
            None => {}
        }
    }

    /// Scenario without steps: narrative, attribution and hints
    fn render_reading(&self, frame: &mut Frame) {
        let Some(lesson) = self.academy.lesson() else {
            return;
        };
        let scenario = lesson.scenario();
        let area = frame.area();
        let layout = create_main_layout(area);
        self.render_header(frame, layout[0], &scenario.title, Some(scenario.priority));

        let chunks = create_content_layout(layout[1]);
        let heading = |text: &'static str| {
            Line::from(Span::styled(
                text,
                Style::default().fg(self.theme.warning).add_modifier(Modifier::BOLD),
            ))
        };
        let mut lines = vec![
            heading("Situation"),
            Line::from(scenario.situation.as_str()),
            Line::from(""),
            heading("How it unfolded"),
            Line::from(scenario.flow.as_str()),
            Line::from(""),
            heading("Result"),
            Line::from(scenario.result.as_str()),
        ];
        if !scenario.hints.is_empty() {
            lines.push(Line::from(""));
            lines.push(heading("Lessons"));
            lines.extend(scenario.hints.iter().map(|h| Line::from(format!("  ▸ {}", h))));
        }
        let story = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(styled_block(&format!("Case file: {}", scenario.role), &self.theme));
        frame.render_widget(story, chunks[0]);

        let rows: Vec<Line> = match &scenario.attribution {
            Some(attribution) => attribution
                .rows()
                .into_iter()
                .flat_map(|(label, value)| {
                    [
                        Line::from(Span::styled(label, Style::default().fg(self.theme.accent))),
                        Line::from(format!("  {}", value)),
                    ]
                })
                .collect(),
            None => vec![Line::from("No attribution on record.")],
        };
        let attribution = Paragraph::new(rows)
            .wrap(Wrap { trim: true })
            .block(styled_block("Attribution", &self.theme));
        frame.render_widget(attribution, chunks[1]);

        self.render_status_bar(frame, layout[2]);
    }

    fn render_drill(&self, frame: &mut Frame) {
        let Some(engine) = self.academy.engine() else {
            return;
        };
        let area = frame.area();
        let layout = create_main_layout(area);
        let scenario = engine.scenario();
        let timer = format!("⏱ {}", engine.timer().display());
        self.render_header(frame, layout[0], &format!("{}   {}", scenario.title, timer), Some(scenario.priority));

        let content = create_content_layout(layout[1]);
        let side = create_side_layout(content[0]);
        self.render_step_panel(frame, side[0], engine);
        self.render_consoles(frame, side[1], engine.phase() == Phase::Running);

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(4)])
            .split(content[1]);
        self.render_chat(frame, main[0], engine);
        self.render_meters(frame, main[1], engine);

        self.render_status_bar(frame, layout[2]);

        match engine.phase() {
            Phase::NotStarted => self.render_start_overlay(frame, engine),
            Phase::Completed | Phase::TimedOut => self.render_drill_over(frame, engine),
            Phase::Running if engine.is_paused() => self.render_pause_overlay(frame),
            Phase::Running => {}
        }
    }

    fn render_step_panel(&self, frame: &mut Frame, area: Rect, engine: &StepEngine) {
        let mut lines = Vec::new();
        if let Some(step) = engine.current_step() {
            lines.push(Line::from(Span::styled(
                format!("Step {}/{}: {}", step.id, engine.steps().len(), step.title),
                Style::default().fg(self.theme.warning).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(step.description.as_str()));
            lines.push(Line::from(""));
            if let Some(tool) = engine.expected_tool() {
                lines.push(Line::from(vec![
                    Span::raw("Hint: work in the "),
                    Span::styled(tool.name(), Style::default().fg(self.theme.accent)),
                    Span::raw(" console"),
                ]));
            }
            if engine.is_answered() {
                lines.push(Line::from(Span::styled(
                    "✔ Done. Next step incoming...",
                    Style::default().fg(self.theme.success),
                )));
            }
            if !step.payload.is_empty() {
                lines.push(Line::from(""));
                for (key, value) in &step.payload {
                    lines.push(Line::from(vec![
                        Span::styled(format!("{}: ", key), Style::default().fg(self.theme.border)),
                        Span::raw(value.to_string()),
                    ]));
                }
            }
        }
        let panel = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(styled_block("Current step", &self.theme));
        frame.render_widget(panel, area);
    }

    fn render_consoles(&self, frame: &mut Frame, area: Rect, active: bool) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let selected = Tool::ALL.iter().position(|t| *t == self.tool).unwrap_or(0);
        let tabs = Tabs::new(Tool::ALL.iter().map(|t| t.name()).collect::<Vec<_>>())
            .select(selected)
            .block(styled_block("Console [Tab]", &self.theme))
            .highlight_style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, chunks[0]);

        let items: Vec<ListItem> = ActionKind::ALL
            .iter()
            .map(|a| ListItem::new(format!("  {}", a.name())))
            .collect();
        let border = if active { self.theme.accent } else { self.theme.border };
        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!(" {}: {} ", self.tool.name(), self.tool.description()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = self.action_state.clone();
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn render_chat(&self, frame: &mut Frame, area: Rect, engine: &StepEngine) {
        let lines: Vec<Line> = engine
            .chat()
            .messages()
            .iter()
            .map(|m| {
                Line::from(vec![
                    Span::styled(
                        format!("[{}] ", m.timestamp.format("%H:%M:%S")),
                        Style::default().fg(self.theme.border),
                    ),
                    Span::styled(format!("{} ", m.tone.symbol()), Style::default().fg(tone_color(m.tone))),
                    Span::styled(format!("{}: ", m.sender), Style::default().fg(self.theme.accent)),
                    Span::raw(m.text.as_str()),
                ])
            })
            .collect();

        let block = styled_block("Incident channel", &self.theme);
        let inner = block.inner(area);
        let chat = Paragraph::new(lines).wrap(Wrap { trim: false });
        let scroll = chat_scroll_offset(chat.line_count(inner.width), inner.height, self.chat_scroll);
        let chat = chat.scroll((scroll, 0)).block(block);
        frame.render_widget(chat, area);
    }

    fn render_meters(&self, frame: &mut Frame, area: Rect, engine: &StepEngine) {
        let block = styled_block("Status", &self.theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height < 2 {
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);
        let total = engine.steps().len() as u32;
        frame.render_widget(
            MeterBar::new("Progress", engine.completed_steps() as u32, total).color(self.theme.success),
            rows[0],
        );
        let timer = engine.timer();
        frame.render_widget(
            MeterBar::new("Time    ", timer.remaining_secs(), timer.total_secs())
                .color(self.theme.accent)
                .warning_below(timer.total_secs() / 4)
                .danger_below(timer.total_secs() / 10),
            rows[1],
        );
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, title: &str, priority: Option<Priority>) {
        let header_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(19),
                Constraint::Min(20),
                Constraint::Length(16),
            ])
            .split(area);

        let logo = Paragraph::new(SMALL_LOGO)
            .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.border)));
        frame.render_widget(logo, header_layout[0]);

        let title = Paragraph::new(title.to_string())
            .style(Style::default().fg(self.theme.warning))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.border)));
        frame.render_widget(title, header_layout[1]);

        let (label, color) = match priority {
            Some(p) => (format!(" {} ", p.label()), priority_color(p)),
            None => (format!(" quiz {}/{} ", self.academy.quiz().score(), self.academy.quiz().len()), self.theme.fg),
        };
        let badge = Paragraph::new(label)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Right)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.border)));
        frame.render_widget(badge, header_layout[2]);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(notice) = self.academy.notice() {
            frame.render_widget(AlertIndicator::new(notice, Tone::Error), area);
            return;
        }

        let status_text = match self.academy.engine() {
            Some(engine) => format!(
                " Score: {}/{} | {:.0}% complete | [S] Start [Enter] Act [Esc] Pause [R] Restart | ? help ",
                engine.score(),
                engine.max_score(),
                engine.progress() * 100.0,
            ),
            None => " [↑/↓] Navigate | [Enter] Select | [Esc] Back | Press ? for help ".to_string(),
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().fg(self.theme.fg).bg(Color::DarkGray));
        frame.render_widget(status, area);
    }

    fn render_start_overlay(&self, frame: &mut Frame, engine: &StepEngine) {
        let scenario = engine.scenario();
        let popup_area = centered_rect(64, 16, frame.area());
        frame.render_widget(Clear, popup_area);

        let mut text = vec![
            Line::from(Span::styled(
                scenario.title.as_str(),
                Style::default().fg(priority_color(scenario.priority)).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(scenario.situation.as_str()),
            Line::from(""),
            Line::from(format!(
                "{} steps, {} on the clock",
                engine.steps().len(),
                engine.timer().display()
            )),
        ];
        for hint in &scenario.hints {
            text.push(Line::from(Span::styled(
                format!("Tip: {}", hint),
                Style::default().fg(self.theme.info),
            )));
        }
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            "Press S to start, Esc to go back",
            Style::default().fg(self.theme.success),
        )));
        let popup = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.accent))
                    .title(format!(" {} ", scenario.priority)),
            );
        frame.render_widget(popup, popup_area);
    }

    fn render_drill_over(&self, frame: &mut Frame, engine: &StepEngine) {
        let (title, color, summary) = match engine.phase() {
            Phase::Completed => ("INCIDENT RESOLVED", self.theme.success, engine.scenario().result.clone()),
            _ => (
                "TIME IS UP",
                self.theme.alert,
                format!("Stopped at step {} of {}", engine.current_index() + 1, engine.steps().len()),
            ),
        };
        let lines = vec![
            String::new(),
            summary,
            String::new(),
            format!("Score: {} / {}", engine.score(), engine.max_score()),
            format!("Time left: {}", engine.timer().display()),
            String::new(),
            "[R] Try again   [B] Back to course".to_string(),
        ];
        let popup = centered_rect(70, 10, frame.area());
        frame.render_widget(Clear, popup);
        frame.render_widget(DramaticBox::new(title).content(lines).border_color(color), popup);
    }

    fn render_pause_overlay(&self, frame: &mut Frame) {
        let popup_area = centered_rect(40, 8, frame.area());
        frame.render_widget(Clear, popup_area);

        let pause_text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("PAUSED", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            ]),
            Line::from(""),
            Line::from("Press ESC to resume"),
            Line::from("Press B to leave the drill"),
        ];

        let pause = Paragraph::new(pause_text)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Drill Paused ")
            );
        frame.render_widget(pause, popup_area);
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let popup_area = centered_rect(67, 31, frame.area());
        frame.render_widget(Clear, popup_area);

        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(self.theme.fg))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.accent)));
        frame.render_widget(help, popup_area);
    }
}

/// First visible row so the newest wrapped row sits on the bottom edge,
/// minus however far the trainee scrolled back
fn chat_scroll_offset(rows: usize, height: u16, scrolled_back: u16) -> u16 {
    let rows = u16::try_from(rows).unwrap_or(u16::MAX);
    rows.saturating_sub(height).saturating_sub(scrolled_back)
}

fn next_tool(tool: Tool, step: usize) -> Tool {
    let i = Tool::ALL.iter().position(|t| *t == tool).unwrap_or(0);
    Tool::ALL[(i + step) % Tool::ALL.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::content::Catalog;
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        App::new(Academy::new(Catalog::builtin(), Settings::default()))
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            app.handle_key(*key);
        }
    }

    #[test]
    fn q_quits_from_briefing() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('q')]);
        assert!(!app.running);
    }

    #[test]
    fn free_text_captures_letters() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter]);
        // Skip to the first free-text question
        while !app.is_typing() {
            press(&mut app, &[KeyCode::Right]);
        }
        press(&mut app, &[KeyCode::Char('q'), KeyCode::Char('?'), KeyCode::Backspace]);
        assert_eq!(app.input_buffer, "q");
        assert!(app.running);
        assert!(!app.show_help);
    }

    #[test]
    fn choosing_an_answer_records_it() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Down, KeyCode::Enter]);
        assert!(app.academy.quiz().is_answered());
        // Enter again moves on
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.academy.quiz().index(), 1);
    }

    #[test]
    fn drill_runs_from_keyboard() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('c'), KeyCode::Enter, KeyCode::Enter]);
        assert_eq!(app.academy.page(), &Page::Lesson);
        press(&mut app, &[KeyCode::Char('s')]);

        let step = app.academy.engine().unwrap().current_step().unwrap().clone();
        app.tool = step.tool;
        let index = ActionKind::ALL.iter().position(|a| *a == step.action).unwrap();
        app.action_state.select(Some(index));
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.academy.engine().unwrap().score(), 100);

        app.on_tick(Duration::from_secs(3));
        assert_eq!(app.academy.engine().unwrap().current_index(), 1);
    }

    #[test]
    fn escape_pauses_and_resumes_drill() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('c'), KeyCode::Enter, KeyCode::Enter, KeyCode::Char('s')]);
        press(&mut app, &[KeyCode::Esc]);
        assert!(app.academy.engine().unwrap().is_paused());
        press(&mut app, &[KeyCode::Esc]);
        assert!(!app.academy.engine().unwrap().is_paused());
    }

    #[test]
    fn chat_follows_wrapped_rows() {
        let long = "x".repeat(50);
        let chat = Paragraph::new(vec![Line::from(long.as_str()), Line::from("last")])
            .wrap(Wrap { trim: false });
        // 50 columns at width 10 wrap onto 5 rows, plus the final message
        let rows = chat.line_count(10);
        assert_eq!(rows, 6);
        assert_eq!(chat_scroll_offset(rows, 3, 0), 3);
        assert_eq!(chat_scroll_offset(rows, 3, 2), 1);
        assert_eq!(chat_scroll_offset(rows, 10, 0), 0);
    }

    #[test]
    fn tab_cycles_consoles() {
        assert_eq!(next_tool(Tool::Communication, 1), Tool::Siem);
        assert_eq!(next_tool(Tool::Siem, Tool::ALL.len() - 1), Tool::Communication);
    }

    #[test]
    fn every_page_renders() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let keys = [
            KeyCode::Char('?'),
            KeyCode::Char('?'),
            KeyCode::Enter,
            KeyCode::Esc,
            KeyCode::Char('c'),
            KeyCode::Enter,
            KeyCode::Enter,
            KeyCode::Char('s'),
        ];
        terminal.draw(|f| app.render(f)).unwrap();
        for key in keys {
            app.handle_key(key);
            terminal.draw(|f| app.render(f)).unwrap();
        }
    }
}
