use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::games::{Completion, MiniGame, child_rng, choice_index};
use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

const ORBS: usize = 5;
const HITS_NEEDED: u32 = 5;
const RESHUFFLE: Duration = Duration::from_millis(1200);
const MISS_PENALTY: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Orb {
    /// Position in 0..1 on both axes of the field.
    x: f64,
    y: f64,
    label: u8,
}

/// Several labelled orbs jump around; only the highlighted one counts.
pub struct FocusGame {
    rng: SmallRng,
    orbs: [Orb; ORBS],
    target: usize,
    hits: u32,
    misses: u32,
    next_shuffle: Instant,
    done: Completion,
}

pub fn create(rng: &mut SmallRng, now: Instant) -> Box<dyn MiniGame> {
    Box::new(FocusGame::new(child_rng(rng), now))
}

impl FocusGame {
    pub fn new(rng: SmallRng, now: Instant) -> Self {
        let blank = Orb {
            x: 0.0,
            y: 0.0,
            label: 0,
        };
        let mut game = Self {
            rng,
            orbs: [blank; ORBS],
            target: 0,
            hits: 0,
            misses: 0,
            next_shuffle: now,
            done: Completion::default(),
        };
        game.shuffle(now);
        game
    }

    fn shuffle(&mut self, now: Instant) {
        let mut labels: Vec<u8> = (1..=ORBS as u8).collect();
        labels.shuffle(&mut self.rng);
        for (orb, label) in self.orbs.iter_mut().zip(labels) {
            orb.x = self.rng.gen_range(0.0..1.0);
            orb.y = self.rng.gen_range(0.0..1.0);
            orb.label = label;
        }
        self.target = self.rng.gen_range(0..ORBS);
        self.next_shuffle = now + RESHUFFLE;
    }

    fn target_label(&self) -> u8 {
        self.orbs[self.target].label
    }

    fn outcome(&self) -> TestOutcome {
        let score = 100u32.saturating_sub(MISS_PENALTY * self.misses);
        let rating = match score {
            100 => "Excellent",
            60.. => "Good",
            _ => "Fair",
        };
        TestOutcome::new(score as f64, rating, "rating")
    }
}

impl MiniGame for FocusGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        if self.done.is_finished() {
            return;
        }
        let Some(choice) = choice_index(key, ORBS) else {
            return;
        };
        if choice as u8 + 1 == self.target_label() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        if self.hits >= HITS_NEEDED {
            self.done.finish_at(now, self.outcome());
        } else {
            self.shuffle(now);
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if !self.done.is_finished() && now >= self.next_shuffle {
            self.shuffle(now);
        }
    }

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, _now: Instant) {
        let colors = &theme.colors;
        let [status, field] = Layout::vertical([Constraint::Length(2), Constraint::Min(5)]).areas(area);
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("Hits {} / {HITS_NEEDED}", self.hits),
                Style::default().fg(colors.success()),
            ),
            Span::raw("   "),
            Span::styled(
                format!("Misses {}", self.misses),
                Style::default().fg(colors.warning()),
            ),
        ]))
        .centered()
        .render(status, buf);

        let block = Block::bordered().border_style(Style::default().fg(colors.border()));
        let inner = block.inner(field);
        block.render(field, buf);
        // Orbs are drawn 3 columns wide: "(n)".
        if inner.width < 3 || inner.height == 0 {
            return;
        }
        let span_w = (inner.width - 3) as f64;
        let span_h = (inner.height - 1) as f64;
        for (i, orb) in self.orbs.iter().enumerate() {
            let x = inner.x + (orb.x * span_w).round() as u16;
            let y = inner.y + (orb.y * span_h).round() as u16;
            let style = if i == self.target {
                Style::default()
                    .fg(colors.bg())
                    .bg(colors.warning())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text_dim()).bg(colors.cell_idle())
            };
            buf.set_string(x, y, format!("({})", orb.label), style);
        }
    }

    fn hints(&self) -> &'static str {
        "[1-5] Hit the highlighted orb's number"
    }
}
