use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::games::{Completion, MiniGame, child_rng, choice_index, percent, render_centered};
use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const ROUNDS: usize = 3;
const SHOW: Duration = Duration::from_millis(800);
const HIDE: Duration = Duration::from_millis(500);
const GAP: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Show { until: Instant },
    Hide { until: Instant },
    Ask,
    Gap { until: Instant },
}

/// Three characters flash briefly; afterwards name the middle one.
pub struct FlashMemoryGame {
    rng: SmallRng,
    phase: Phase,
    round: usize,
    shown: [char; 3],
    options: [char; 3],
    correct: usize,
    done: Completion,
}

pub fn create(rng: &mut SmallRng, now: Instant) -> Box<dyn MiniGame> {
    Box::new(FlashMemoryGame::new(child_rng(rng), now))
}

impl FlashMemoryGame {
    pub fn new(rng: SmallRng, now: Instant) -> Self {
        let mut game = Self {
            rng,
            phase: Phase::Ask,
            round: 1,
            shown: [' '; 3],
            options: [' '; 3],
            correct: 0,
            done: Completion::default(),
        };
        game.start_round(now);
        game
    }

    /// Draws `count` distinct characters, none of them in `exclude`.
    fn draw_distinct(&mut self, count: usize, exclude: &[char]) -> Vec<char> {
        let mut out: Vec<char> = Vec::with_capacity(count);
        while out.len() < count {
            let ch = CHARSET[self.rng.gen_range(0..CHARSET.len())] as char;
            if !out.contains(&ch) && !exclude.contains(&ch) {
                out.push(ch);
            }
        }
        out
    }

    fn start_round(&mut self, now: Instant) {
        let seq = self.draw_distinct(3, &[]);
        self.shown = [seq[0], seq[1], seq[2]];
        let decoys = self.draw_distinct(2, &[self.shown[1]]);
        let mut options = [self.shown[1], decoys[0], decoys[1]];
        options.shuffle(&mut self.rng);
        self.options = options;
        self.phase = Phase::Show { until: now + SHOW };
    }

    fn answer(&mut self, choice: usize, now: Instant) {
        if self.options[choice] == self.shown[1] {
            self.correct += 1;
        }
        if self.round >= ROUNDS {
            self.done.finish_at(
                now,
                TestOutcome::new(
                    percent(self.correct, ROUNDS) as f64,
                    format!("{}/{ROUNDS}", self.correct),
                    "correct",
                ),
            );
        } else {
            self.round += 1;
            self.phase = Phase::Gap { until: now + GAP };
        }
    }
}

impl MiniGame for FlashMemoryGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        if self.done.is_finished() || self.phase != Phase::Ask {
            return;
        }
        if let Some(choice) = choice_index(key, self.options.len()) {
            self.answer(choice, now);
        }
    }

    fn on_tick(&mut self, now: Instant) {
        match self.phase {
            Phase::Show { until } if now >= until => {
                self.phase = Phase::Hide { until: now + HIDE };
            }
            Phase::Hide { until } if now >= until => self.phase = Phase::Ask,
            Phase::Gap { until } if now >= until => self.start_round(now),
            _ => {}
        }
    }

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, _now: Instant) {
        let colors = &theme.colors;
        let big = Style::default()
            .fg(colors.warning())
            .add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(Span::styled(
                format!("Round {} / {ROUNDS}", self.round),
                Style::default().fg(colors.accent()),
            )),
            Line::from(""),
        ];
        match self.phase {
            Phase::Show { .. } => {
                let text: String = self
                    .shown
                    .iter()
                    .map(|c| format!(" {c} "))
                    .collect::<Vec<_>>()
                    .join("  ");
                lines.push(Line::from(Span::styled(text, big)));
            }
            Phase::Hide { .. } | Phase::Gap { .. } => {
                lines.push(Line::from(Span::styled(
                    "... remember ...",
                    Style::default().fg(colors.text_dim()),
                )));
            }
            Phase::Ask => {
                lines.push(Line::from(Span::styled(
                    "Which character was in the middle?",
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
                let mut spans = Vec::new();
                for (i, opt) in self.options.iter().enumerate() {
                    spans.push(Span::styled(
                        format!("[{}] {opt}", i + 1),
                        Style::default().fg(colors.fg()),
                    ));
                    spans.push(Span::raw("    "));
                }
                lines.push(Line::from(spans));
            }
        }
        render_centered(lines, area, buf);
    }

    fn hints(&self) -> &'static str {
        "[1-3] Choose"
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    /// Steps the clock through show and hide so the question is open.
    fn reach_question(game: &mut FlashMemoryGame, now: &mut Instant) {
        *now += SHOW;
        game.on_tick(*now);
        *now += HIDE;
        game.on_tick(*now);
        assert_eq!(game.phase, Phase::Ask);
    }

    fn key_for(game: &FlashMemoryGame, correct: bool) -> KeyCode {
        let idx = game
            .options
            .iter()
            .position(|&c| (c == game.shown[1]) == correct)
            .unwrap();
        KeyCode::Char(char::from_digit(idx as u32 + 1, 10).unwrap())
    }

    #[test]
    fn rounds_use_distinct_characters() {
        let t0 = Instant::now();
        let game = FlashMemoryGame::new(SmallRng::seed_from_u64(4), t0);
        let [a, b, c] = game.shown;
        assert!(a != b && b != c && a != c);
        let [x, y, z] = game.options;
        assert!(x != y && y != z && x != z);
        assert!(game.options.contains(&game.shown[1]));
    }

    #[test]
    fn answers_are_ignored_while_flashing() {
        let t0 = Instant::now();
        let mut game = FlashMemoryGame::new(SmallRng::seed_from_u64(4), t0);
        game.on_key(KeyCode::Char('1'), t0);
        assert_eq!(game.round, 1);
        assert_eq!(game.correct, 0);
    }

    #[test]
    fn two_of_three_scores_sixty_seven() {
        let mut now = Instant::now();
        let mut game = FlashMemoryGame::new(SmallRng::seed_from_u64(8), now);
        for correct in [true, false, true] {
            reach_question(&mut game, &mut now);
            let key = key_for(&game, correct);
            game.on_key(key, now);
            now += GAP;
            game.on_tick(now);
        }
        let outcome = game.poll_outcome(now).unwrap();
        assert_eq!(outcome.score, 67.0);
        assert_eq!(outcome.display, "2/3");
        assert_eq!(outcome.unit, "correct");
    }
}
