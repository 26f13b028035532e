//! Mini-games. Each test in the catalog is backed by one module here, looked
//! up through [`registry`]. A game owns its own clock handling and randomness
//! and hands back exactly one [`TestOutcome`] through [`MiniGame::poll_outcome`].

pub mod aim;
pub mod dynamic_vision;
pub mod flash_memory;
pub mod focus;
pub mod grid_reaction;
pub mod pattern_memory;
pub mod personality;
pub mod psychology;
pub mod reaction;
pub mod reflex;
pub mod registry;
pub mod sequence_memory;
pub mod static_vision;
pub mod stroop;
pub mod tracking;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};

use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

pub trait MiniGame {
    fn on_key(&mut self, key: KeyCode, now: Instant);

    fn on_tick(&mut self, now: Instant);

    /// Yields the result once, when it is due. Every later call returns `None`.
    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome>;

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, now: Instant);

    fn hints(&self) -> &'static str;
}

/// Latch for a game's single result, optionally released after a short
/// cosmetic delay so the final state stays on screen.
#[derive(Debug, Default)]
pub struct Completion {
    pending: Option<(Instant, TestOutcome)>,
    reported: bool,
}

impl Completion {
    pub fn finish_at(&mut self, due: Instant, outcome: TestOutcome) {
        if self.pending.is_none() && !self.reported {
            self.pending = Some((due, outcome));
        }
    }

    pub fn finish_after(&mut self, now: Instant, delay: Duration, outcome: TestOutcome) {
        self.finish_at(now + delay, outcome);
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_some() || self.reported
    }

    pub fn poll(&mut self, now: Instant) -> Option<TestOutcome> {
        match &self.pending {
            Some((due, _)) if now >= *due => {
                self.reported = true;
                self.pending.take().map(|(_, outcome)| outcome)
            }
            _ => None,
        }
    }
}

/// Keys for 4x4 grids, row by row.
pub const GRID_KEYS: [char; 16] = [
    '1', '2', '3', '4', 'q', 'w', 'e', 'r', 'a', 's', 'd', 'f', 'z', 'x', 'c', 'v',
];

pub fn grid_index(key: KeyCode) -> Option<usize> {
    match key {
        KeyCode::Char(ch) => GRID_KEYS
            .iter()
            .position(|&k| k == ch.to_ascii_lowercase()),
        _ => None,
    }
}

pub fn is_action(key: KeyCode) -> bool {
    matches!(key, KeyCode::Char(' ') | KeyCode::Enter)
}

/// Maps '1'..='9' to a zero-based choice below `count`.
pub fn choice_index(key: KeyCode, count: usize) -> Option<usize> {
    match key {
        KeyCode::Char(ch) => {
            let idx = ch.to_digit(10)? as usize;
            (1..=count).contains(&idx).then(|| idx - 1)
        }
        _ => None,
    }
}

/// Arrow keys and hjkl as a (dx, dy) step.
pub fn direction(key: KeyCode) -> Option<(i32, i32)> {
    match key {
        KeyCode::Left | KeyCode::Char('h') => Some((-1, 0)),
        KeyCode::Right | KeyCode::Char('l') => Some((1, 0)),
        KeyCode::Up | KeyCode::Char('k') => Some((0, -1)),
        KeyCode::Down | KeyCode::Char('j') => Some((0, 1)),
        _ => None,
    }
}

pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

pub fn child_rng(rng: &mut SmallRng) -> SmallRng {
    SmallRng::seed_from_u64(rng.next_u64())
}

pub fn render_centered(lines: Vec<Line<'_>>, area: Rect, buf: &mut Buffer) {
    let height = (lines.len() as u16).min(area.height);
    let top = area.y + (area.height - height) / 2;
    let inner = Rect::new(area.x, top, area.width, height);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(inner, buf);
}
