use std::time::Instant;

use crossterm::event::KeyCode;
use rand::Rng;
use rand::rngs::SmallRng;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::games::{Completion, MiniGame, child_rng, render_centered};
use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

const PROMPTS: usize = 5;
const POINTS_PER_HIT: usize = 20;

const INKS: [(&str, Color); 3] = [
    ("RED", Color::Rgb(239, 68, 68)),
    ("BLUE", Color::Rgb(59, 130, 246)),
    ("GREEN", Color::Rgb(34, 197, 94)),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Prompt {
    word: usize,
    ink: usize,
}

impl Prompt {
    fn matches(self) -> bool {
        self.word == self.ink
    }
}

/// Color-word interference: say whether the word and its ink agree.
pub struct StroopGame {
    rng: SmallRng,
    prompt: Prompt,
    answered: usize,
    correct: usize,
    done: Completion,
}

pub fn create(rng: &mut SmallRng, _now: Instant) -> Box<dyn MiniGame> {
    Box::new(StroopGame::new(child_rng(rng)))
}

impl StroopGame {
    pub fn new(mut rng: SmallRng) -> Self {
        let prompt = Self::roll(&mut rng);
        Self {
            rng,
            prompt,
            answered: 0,
            correct: 0,
            done: Completion::default(),
        }
    }

    fn roll(rng: &mut SmallRng) -> Prompt {
        Prompt {
            word: rng.gen_range(0..INKS.len()),
            ink: rng.gen_range(0..INKS.len()),
        }
    }

    fn answer(&mut self, says_match: bool, now: Instant) {
        if says_match == self.prompt.matches() {
            self.correct += 1;
        }
        self.answered += 1;
        if self.answered >= PROMPTS {
            let score = self.correct * POINTS_PER_HIT;
            self.done
                .finish_at(now, TestOutcome::new(score as f64, format!("{score}"), "pts"));
        } else {
            self.prompt = Self::roll(&mut self.rng);
        }
    }
}

impl MiniGame for StroopGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        if self.done.is_finished() {
            return;
        }
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Left => self.answer(true, now),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Right => self.answer(false, now),
            _ => {}
        }
    }

    fn on_tick(&mut self, _now: Instant) {}

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, _now: Instant) {
        let colors = &theme.colors;
        let (word, _) = INKS[self.prompt.word];
        let (_, ink) = INKS[self.prompt.ink];
        let lines = vec![
            Line::from(Span::styled(
                "Does the word match its color?",
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                word,
                Style::default().fg(ink).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("[y] Match", Style::default().fg(colors.go())),
                Span::raw("    "),
                Span::styled("[n] Mismatch", Style::default().fg(colors.stop())),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("Progress: {}/{PROMPTS}", self.answered),
                Style::default().fg(colors.text_dim()),
            )),
        ];
        render_centered(lines, area, buf);
    }

    fn hints(&self) -> &'static str {
        "[y/\u{2190}] Match  [n/\u{2192}] Mismatch"
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn answer_correctly(game: &mut StroopGame, now: Instant) {
        let key = if game.prompt.matches() { 'y' } else { 'n' };
        game.on_key(KeyCode::Char(key), now);
    }

    #[test]
    fn perfect_run_scores_hundred() {
        let t0 = Instant::now();
        let mut game = StroopGame::new(SmallRng::seed_from_u64(3));
        for _ in 0..PROMPTS {
            answer_correctly(&mut game, t0);
        }
        let outcome = game.poll_outcome(t0).unwrap();
        assert_eq!(outcome.score, 100.0);
        assert_eq!(outcome.display, "100");
    }

    #[test]
    fn wrong_answers_cost_twenty_each() {
        let t0 = Instant::now();
        let mut game = StroopGame::new(SmallRng::seed_from_u64(11));
        for i in 0..PROMPTS {
            if i < 2 {
                let key = if game.prompt.matches() { 'n' } else { 'y' };
                game.on_key(KeyCode::Char(key), t0);
            } else {
                answer_correctly(&mut game, t0);
            }
        }
        assert_eq!(game.poll_outcome(t0).unwrap().score, 60.0);
    }

    #[test]
    fn other_keys_do_not_count() {
        let t0 = Instant::now();
        let mut game = StroopGame::new(SmallRng::seed_from_u64(1));
        game.on_key(KeyCode::Char('x'), t0);
        assert_eq!(game.answered, 0);
    }
}
