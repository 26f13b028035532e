use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::Rng;
use rand::rngs::SmallRng;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::games::{Completion, MiniGame, child_rng, percent, render_centered};
use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

const ROUNDS: usize = 3;
const DIGITS: usize = 6;
const MEMORIZE: Duration = Duration::from_millis(2000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Memorize { until: Instant },
    Input,
}

/// Memorize a six-digit number, then type it back.
pub struct SequenceMemoryGame {
    rng: SmallRng,
    phase: Phase,
    round: usize,
    sequence: String,
    input: String,
    correct: usize,
    done: Completion,
}

pub fn create(rng: &mut SmallRng, now: Instant) -> Box<dyn MiniGame> {
    Box::new(SequenceMemoryGame::new(child_rng(rng), now))
}

impl SequenceMemoryGame {
    pub fn new(rng: SmallRng, now: Instant) -> Self {
        let mut game = Self {
            rng,
            phase: Phase::Input,
            round: 1,
            sequence: String::new(),
            input: String::new(),
            correct: 0,
            done: Completion::default(),
        };
        game.start_round(now);
        game
    }

    fn start_round(&mut self, now: Instant) {
        self.sequence = self.rng.gen_range(100_000u32..=999_999).to_string();
        self.input.clear();
        self.phase = Phase::Memorize {
            until: now + MEMORIZE,
        };
    }

    fn submit(&mut self, now: Instant) {
        if self.input == self.sequence {
            self.correct += 1;
        }
        if self.round >= ROUNDS {
            self.done.finish_at(
                now,
                TestOutcome::new(
                    percent(self.correct, ROUNDS) as f64,
                    format!("{}/{ROUNDS}", self.correct),
                    "rounds",
                ),
            );
        } else {
            self.round += 1;
            self.start_round(now);
        }
    }
}

impl MiniGame for SequenceMemoryGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        if self.done.is_finished() || self.phase != Phase::Input {
            return;
        }
        match key {
            KeyCode::Char(ch) if ch.is_ascii_digit() && self.input.len() < DIGITS => {
                self.input.push(ch);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => self.submit(now),
            _ => {}
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if let Phase::Memorize { until } = self.phase
            && now >= until
        {
            self.phase = Phase::Input;
        }
    }

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, _now: Instant) {
        let colors = &theme.colors;
        let mut lines = vec![
            Line::from(Span::styled(
                format!("Round {} / {ROUNDS}", self.round),
                Style::default().fg(colors.accent()),
            )),
            Line::from(""),
        ];
        match self.phase {
            Phase::Memorize { .. } => {
                let spaced: String = self
                    .sequence
                    .chars()
                    .flat_map(|c| [c, ' '])
                    .collect();
                lines.push(Line::from(Span::styled(
                    spaced.trim_end().to_string(),
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                )));
            }
            Phase::Input => {
                lines.push(Line::from(Span::styled(
                    "Type the number and press Enter",
                    Style::default().fg(colors.text_dim()),
                )));
                lines.push(Line::from(""));
                let shown: String = (0..DIGITS)
                    .map(|i| self.input.chars().nth(i).unwrap_or('_'))
                    .flat_map(|c| [c, ' '])
                    .collect();
                lines.push(Line::from(Span::styled(
                    shown.trim_end().to_string(),
                    Style::default().fg(colors.cursor()).add_modifier(Modifier::BOLD),
                )));
            }
        }
        render_centered(lines, area, buf);
    }

    fn hints(&self) -> &'static str {
        "[0-9] Type  [Backspace] Delete  [Enter] Submit"
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn type_str(game: &mut SequenceMemoryGame, text: &str, now: Instant) {
        for ch in text.chars() {
            game.on_key(KeyCode::Char(ch), now);
        }
    }

    #[test]
    fn sequence_has_six_digits() {
        let game = SequenceMemoryGame::new(SmallRng::seed_from_u64(30), Instant::now());
        assert_eq!(game.sequence.len(), DIGITS);
        assert!(game.sequence.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn typing_is_blocked_while_memorizing() {
        let t0 = Instant::now();
        let mut game = SequenceMemoryGame::new(SmallRng::seed_from_u64(30), t0);
        type_str(&mut game, "123", t0);
        assert!(game.input.is_empty());
    }

    #[test]
    fn input_is_digits_only_and_capped() {
        let t0 = Instant::now();
        let mut game = SequenceMemoryGame::new(SmallRng::seed_from_u64(30), t0);
        game.on_tick(t0 + MEMORIZE);
        type_str(&mut game, "12a34567", t0 + MEMORIZE);
        assert_eq!(game.input, "123456");
        game.on_key(KeyCode::Backspace, t0 + MEMORIZE);
        assert_eq!(game.input, "12345");
    }

    #[test]
    fn scores_correct_rounds() {
        let mut now = Instant::now();
        let mut game = SequenceMemoryGame::new(SmallRng::seed_from_u64(31), now);
        for correct in [true, true, false] {
            now += MEMORIZE;
            game.on_tick(now);
            let answer = if correct {
                game.sequence.clone()
            } else {
                "000000".to_string()
            };
            type_str(&mut game, &answer, now);
            game.on_key(KeyCode::Enter, now);
        }
        let outcome = game.poll_outcome(now).unwrap();
        assert_eq!(outcome.score, 67.0);
        assert_eq!(outcome.display, "2/3");
        assert_eq!(outcome.unit, "rounds");
    }
}
