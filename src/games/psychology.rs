use std::time::Instant;

use crossterm::event::KeyCode;
use rand::rngs::SmallRng;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::games::{Completion, MiniGame, choice_index, render_centered};
use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

struct Question {
    prompt: &'static str,
    options: [(&'static str, u32); 3],
}

const QUESTIONS: &[Question] = &[
    Question {
        prompt: "Your team is losing and teammates start arguing. You...",
        options: [
            ("Join the argument", 0),
            ("Mute chat and focus on your play", 10),
            ("Try to calm everyone down", 8),
        ],
    },
    Question {
        prompt: "A mistake in a key teamfight wiped your team. Next game you...",
        options: [
            ("Stay frustrated and it shows in your play", 0),
            ("Breathe, then review what went wrong", 10),
            ("Blame your support", 0),
        ],
    },
    Question {
        prompt: "How many dull repetitions will you put into one combo?",
        options: [
            ("A few dozen", 2),
            ("A few hundred", 5),
            ("Until it is muscle memory", 10),
        ],
    },
];

const MAX_POINTS: u32 = 30;

/// Short mindset questionnaire; each answer carries a fixed number of points.
pub struct PsychologyGame {
    question: usize,
    points: u32,
    done: Completion,
}

pub fn create(_rng: &mut SmallRng, _now: Instant) -> Box<dyn MiniGame> {
    Box::new(PsychologyGame::new())
}

impl PsychologyGame {
    pub fn new() -> Self {
        Self {
            question: 0,
            points: 0,
            done: Completion::default(),
        }
    }
}

impl Default for PsychologyGame {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniGame for PsychologyGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        if self.done.is_finished() {
            return;
        }
        let Some(question) = QUESTIONS.get(self.question) else {
            return;
        };
        let Some(choice) = choice_index(key, question.options.len()) else {
            return;
        };
        self.points += question.options[choice].1;
        self.question += 1;
        if self.question == QUESTIONS.len() {
            self.done.finish_at(
                now,
                TestOutcome::new(
                    self.points as f64,
                    format!("{}/{MAX_POINTS}", self.points),
                    "pts",
                ),
            );
        }
    }

    fn on_tick(&mut self, _now: Instant) {}

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, _now: Instant) {
        let colors = &theme.colors;
        let idx = self.question.min(QUESTIONS.len() - 1);
        let question = &QUESTIONS[idx];

        let mut lines = vec![
            Line::from(Span::styled(
                format!("Question {} / {}", idx + 1, QUESTIONS.len()),
                Style::default().fg(colors.accent()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                question.prompt,
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (i, (text, _)) in question.options.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("[{}] ", i + 1), Style::default().fg(colors.accent())),
                Span::styled(*text, Style::default().fg(colors.fg())),
            ]));
        }
        render_centered(lines, area, buf);
    }

    fn hints(&self) -> &'static str {
        "[1-3] Answer"
    }
}
