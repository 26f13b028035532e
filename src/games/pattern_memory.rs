use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::rngs::SmallRng;
use rand::seq::index;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::games::{Completion, GRID_KEYS, MiniGame, child_rng, grid_index, percent};
use crate::session::record::TestOutcome;
use crate::ui::components::cell_grid::{Cell, CellGrid};
use crate::ui::theme::Theme;

const CELLS: usize = 16;
const TARGETS: usize = 5;
const MEMORIZE: Duration = Duration::from_millis(2000);
const RESULT_HOLD: Duration = Duration::from_millis(500);

/// Five cells light up on a 4x4 grid; pick the same five from memory.
pub struct PatternMemoryGame {
    targets: Vec<usize>,
    picked: Vec<usize>,
    recall_from: Instant,
    done: Completion,
}

pub fn create(rng: &mut SmallRng, now: Instant) -> Box<dyn MiniGame> {
    Box::new(PatternMemoryGame::new(child_rng(rng), now))
}

impl PatternMemoryGame {
    pub fn new(mut rng: SmallRng, now: Instant) -> Self {
        Self {
            targets: index::sample(&mut rng, CELLS, TARGETS).into_vec(),
            picked: Vec::with_capacity(TARGETS),
            recall_from: now + MEMORIZE,
            done: Completion::default(),
        }
    }

    fn recalling(&self, now: Instant) -> bool {
        now >= self.recall_from
    }

    fn correct(&self) -> usize {
        self.picked
            .iter()
            .filter(|i| self.targets.contains(i))
            .count()
    }
}

impl MiniGame for PatternMemoryGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        if self.done.is_finished() || !self.recalling(now) {
            return;
        }
        let Some(idx) = grid_index(key) else {
            return;
        };
        if self.picked.contains(&idx) {
            return;
        }
        self.picked.push(idx);
        if self.picked.len() == TARGETS {
            let c = self.correct();
            self.done.finish_after(
                now,
                RESULT_HOLD,
                TestOutcome::new(
                    percent(c, TARGETS) as f64,
                    format!("{c}/{TARGETS}"),
                    "cells",
                ),
            );
        }
    }

    fn on_tick(&mut self, _now: Instant) {}

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, now: Instant) {
        let colors = &theme.colors;
        let recalling = self.recalling(now);
        let [status, grid] = Layout::vertical([Constraint::Length(2), Constraint::Min(4)]).areas(area);
        let msg = if recalling {
            format!("Repeat the pattern  ({} / {TARGETS})", self.picked.len())
        } else {
            "Memorize the lit cells".to_string()
        };
        Paragraph::new(Line::from(Span::styled(msg, Style::default().fg(colors.accent()))))
            .centered()
            .render(status, buf);

        let cells: Vec<Cell> = (0..CELLS)
            .map(|i| {
                let is_target = self.targets.contains(&i);
                let fill = if !recalling && is_target {
                    colors.cell_lit()
                } else if recalling && self.picked.contains(&i) {
                    if is_target { colors.success() } else { colors.error() }
                } else {
                    colors.cell_idle()
                };
                Cell::new(fill).label(GRID_KEYS[i].to_ascii_uppercase())
            })
            .collect();
        CellGrid::new(&cells, 4, theme).render(grid, buf);
    }

    fn hints(&self) -> &'static str {
        "[1234 / QWER / ASDF / ZXCV] Pick cell"
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn key(idx: usize) -> KeyCode {
        KeyCode::Char(GRID_KEYS[idx])
    }

    #[test]
    fn targets_are_distinct() {
        let game = PatternMemoryGame::new(SmallRng::seed_from_u64(40), Instant::now());
        let mut t = game.targets.clone();
        t.sort_unstable();
        t.dedup();
        assert_eq!(t.len(), TARGETS);
    }

    #[test]
    fn picks_before_recall_are_ignored() {
        let t0 = Instant::now();
        let mut game = PatternMemoryGame::new(SmallRng::seed_from_u64(40), t0);
        game.on_key(key(game.targets[0]), t0);
        assert!(game.picked.is_empty());
    }

    #[test]
    fn full_recall_reports_after_hold() {
        let t0 = Instant::now();
        let mut game = PatternMemoryGame::new(SmallRng::seed_from_u64(40), t0);
        let now = t0 + MEMORIZE;
        for idx in game.targets.clone() {
            game.on_key(key(idx), now);
        }
        assert!(game.poll_outcome(now).is_none());
        let outcome = game.poll_outcome(now + RESULT_HOLD).unwrap();
        assert_eq!(outcome.score, 100.0);
        assert_eq!(outcome.display, "5/5");
        assert_eq!(outcome.unit, "cells");
    }

    #[test]
    fn repeated_and_wrong_picks() {
        let t0 = Instant::now();
        let mut game = PatternMemoryGame::new(SmallRng::seed_from_u64(41), t0);
        let now = t0 + MEMORIZE;
        let targets = game.targets.clone();
        let wrong: Vec<usize> = (0..CELLS).filter(|i| !targets.contains(i)).collect();

        game.on_key(key(targets[0]), now);
        game.on_key(key(targets[0]), now);
        assert_eq!(game.picked.len(), 1);

        for &idx in targets.iter().skip(1).take(2) {
            game.on_key(key(idx), now);
        }
        game.on_key(key(wrong[0]), now);
        game.on_key(key(wrong[1]), now);

        let outcome = game.poll_outcome(now + RESULT_HOLD).unwrap();
        assert_eq!(outcome.display, "3/5");
        assert_eq!(outcome.score, 60.0);
    }
}
