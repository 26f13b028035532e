use std::time::Instant;

use crossterm::event::KeyCode;
use rand::rngs::SmallRng;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::games::{Completion, MiniGame, choice_index, render_centered};
use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hue {
    Red,
    Blue,
    Yellow,
    Green,
}

impl Hue {
    const ALL: [Hue; 4] = [Hue::Red, Hue::Blue, Hue::Yellow, Hue::Green];

    pub fn role(self) -> &'static str {
        match self {
            Hue::Red => "Commander",
            Hue::Blue => "Strategist",
            Hue::Yellow => "Playmaker",
            Hue::Green => "Anchor",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Hue::Red => "Red",
            Hue::Blue => "Blue",
            Hue::Yellow => "Yellow",
            Hue::Green => "Green",
        }
    }

    fn color(self) -> Color {
        match self {
            Hue::Red => Color::Rgb(239, 68, 68),
            Hue::Blue => Color::Rgb(59, 130, 246),
            Hue::Yellow => Color::Rgb(234, 179, 8),
            Hue::Green => Color::Rgb(34, 197, 94),
        }
    }
}

/// Options are listed in `Hue::ALL` order.
const QUESTIONS: &[(&str, [&str; 4])] = &[
    (
        "Mid-game, the plan falls apart. You...",
        [
            "Make the call and lead the next push",
            "Pause and work out a better plan",
            "Improvise something flashy",
            "Back up whoever is making the call",
        ],
    ),
    (
        "After a loss, the team chat should...",
        [
            "Get straight to what we do next",
            "Go through the replay in detail",
            "Keep the mood up",
            "Check everyone is okay",
        ],
    ),
    (
        "Your favourite kind of play is...",
        [
            "Initiating the decisive fight",
            "Out-rotating the enemy",
            "A risky outplay",
            "Saving a teammate at the last second",
        ],
    ),
    (
        "New patch drops. You...",
        [
            "Decide what the team will run",
            "Read every line of the notes",
            "Try every new toy right away",
            "Ask the team what they need you on",
        ],
    ),
];

/// Four-color role questionnaire: every answer votes for one hue and the
/// dominant hue names the player's team role.
pub struct PersonalityGame {
    question: usize,
    votes: [u32; 4],
    done: Completion,
}

pub fn create(_rng: &mut SmallRng, _now: Instant) -> Box<dyn MiniGame> {
    Box::new(PersonalityGame::new())
}

impl PersonalityGame {
    pub fn new() -> Self {
        Self {
            question: 0,
            votes: [0; 4],
            done: Completion::default(),
        }
    }

    /// Ties go to the hue listed first.
    fn dominant(&self) -> (Hue, u32) {
        let mut best = (Hue::Red, self.votes[0]);
        for (i, &hue) in Hue::ALL.iter().enumerate().skip(1) {
            if self.votes[i] > best.1 {
                best = (hue, self.votes[i]);
            }
        }
        best
    }
}

impl Default for PersonalityGame {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniGame for PersonalityGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        if self.done.is_finished() || self.question >= QUESTIONS.len() {
            return;
        }
        let Some(choice) = choice_index(key, Hue::ALL.len()) else {
            return;
        };
        self.votes[choice] += 1;
        self.question += 1;
        if self.question == QUESTIONS.len() {
            let (hue, count) = self.dominant();
            let score = count * 100 / QUESTIONS.len() as u32;
            self.done.finish_at(
                now,
                TestOutcome::new(
                    score as f64,
                    format!("{} ({})", hue.role(), hue.name()),
                    "type",
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
        let (prompt, options) = QUESTIONS[idx];

        let mut lines = vec![
            Line::from(Span::styled(
                format!("Question {} / {}", idx + 1, QUESTIONS.len()),
                Style::default().fg(colors.accent()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                prompt,
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (i, text) in options.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("[{}] ", i + 1),
                    Style::default().fg(Hue::ALL[i].color()),
                ),
                Span::styled(*text, Style::default().fg(colors.fg())),
            ]));
        }
        render_centered(lines, area, buf);
    }

    fn hints(&self) -> &'static str {
        "[1-4] Answer"
    }
}
