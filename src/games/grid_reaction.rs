use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::Rng;
use rand::rngs::SmallRng;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::games::{Completion, GRID_KEYS, MiniGame, child_rng, grid_index};
use crate::session::record::TestOutcome;
use crate::ui::components::cell_grid::{Cell, CellGrid};
use crate::ui::theme::Theme;

const CELLS: usize = 16;
const ROUND: Duration = Duration::from_secs(10);
const SPAWN_EVERY: Duration = Duration::from_millis(350);
const SPAWN_CHANCE: f64 = 0.6;

/// Whack-a-mole on a 4x4 grid: lit cells are cleared by their key.
pub struct GridReactionGame {
    rng: SmallRng,
    lit: [bool; CELLS],
    hits: u32,
    started: Instant,
    next_spawn: Instant,
    done: Completion,
}

pub fn create(rng: &mut SmallRng, now: Instant) -> Box<dyn MiniGame> {
    Box::new(GridReactionGame::new(child_rng(rng), now))
}

impl GridReactionGame {
    pub fn new(rng: SmallRng, now: Instant) -> Self {
        Self {
            rng,
            lit: [false; CELLS],
            hits: 0,
            started: now,
            next_spawn: now + SPAWN_EVERY,
            done: Completion::default(),
        }
    }

    fn spawn(&mut self) {
        if !self.rng.gen_bool(SPAWN_CHANCE) {
            return;
        }
        let unlit: Vec<usize> = (0..CELLS).filter(|&i| !self.lit[i]).collect();
        if unlit.is_empty() {
            return;
        }
        let pick = unlit[self.rng.gen_range(0..unlit.len())];
        self.lit[pick] = true;
    }

    fn remaining(&self, now: Instant) -> Duration {
        ROUND.saturating_sub(now.saturating_duration_since(self.started))
    }
}

impl MiniGame for GridReactionGame {
    fn on_key(&mut self, key: KeyCode, _now: Instant) {
        if self.done.is_finished() {
            return;
        }
        if let Some(idx) = grid_index(key)
            && self.lit[idx]
        {
            self.lit[idx] = false;
            self.hits += 1;
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if self.done.is_finished() {
            return;
        }
        let end = self.started + ROUND;
        while self.next_spawn <= now && self.next_spawn < end {
            self.spawn();
            self.next_spawn += SPAWN_EVERY;
        }
        if now >= end {
            self.lit = [false; CELLS];
            self.done.finish_at(
                now,
                TestOutcome::new(self.hits as f64, format!("{}", self.hits), "hits"),
            );
        }
    }

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, now: Instant) {
        let colors = &theme.colors;
        let [status, grid] = Layout::vertical([Constraint::Length(2), Constraint::Min(4)]).areas(area);

        let secs = self.remaining(now).as_secs_f64();
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("Time {secs:.1}s"),
                Style::default().fg(colors.accent()),
            ),
            Span::raw("   "),
            Span::styled(
                format!("Hits {}", self.hits),
                Style::default().fg(colors.success()).add_modifier(Modifier::BOLD),
            ),
        ]))
        .centered()
        .render(status, buf);

        let cells: Vec<Cell> = (0..CELLS)
            .map(|i| {
                let fill = if self.lit[i] {
                    colors.cell_lit()
                } else {
                    colors.cell_idle()
                };
                Cell::new(fill).label(GRID_KEYS[i].to_ascii_uppercase())
            })
            .collect();
        CellGrid::new(&cells, 4, theme).render(grid, buf);
    }

    fn hints(&self) -> &'static str {
        "[1234 / QWER / ASDF / ZXCV] Hit lit cell"
    }
}
