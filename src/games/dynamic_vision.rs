use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::rngs::SmallRng;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::games::{Completion, MiniGame, is_action};
use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

/// Track units per millisecond; the track is 100 units long.
const SPEED: f64 = 0.09;
const TRACK: f64 = 100.0;
const ZONE: (f64, f64) = (75.0, 85.0);
const ZONE_CENTER: f64 = 80.0;
const RESULT_HOLD: Duration = Duration::from_millis(1000);

/// A marker sweeps the track; stop it inside the green zone.
pub struct DynamicVisionGame {
    started: Instant,
    stopped_at: Option<f64>,
    done: Completion,
}

pub fn create(_rng: &mut SmallRng, now: Instant) -> Box<dyn MiniGame> {
    Box::new(DynamicVisionGame::new(now))
}

impl DynamicVisionGame {
    pub fn new(now: Instant) -> Self {
        Self {
            started: now,
            stopped_at: None,
            done: Completion::default(),
        }
    }

    pub fn position(&self, now: Instant) -> f64 {
        if let Some(pos) = self.stopped_at {
            return pos;
        }
        let ms = now.saturating_duration_since(self.started).as_secs_f64() * 1000.0;
        (ms * SPEED) % TRACK
    }

    pub fn score_for(pos: f64) -> u32 {
        let diff = (pos - ZONE_CENTER).abs();
        if diff < 5.0 {
            100
        } else if diff < 10.0 {
            80
        } else if diff < 20.0 {
            50
        } else {
            0
        }
    }
}

impl MiniGame for DynamicVisionGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        if !is_action(key) || self.stopped_at.is_some() {
            return;
        }
        let pos = self.position(now);
        self.stopped_at = Some(pos);
        let score = Self::score_for(pos);
        self.done.finish_after(
            now,
            RESULT_HOLD,
            TestOutcome::new(score as f64, format!("{score}"), "pts"),
        );
    }

    fn on_tick(&mut self, _now: Instant) {}

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, now: Instant) {
        let colors = &theme.colors;
        let [_, track_area, _, msg_area, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);

        let block = Block::bordered().border_style(Style::default().fg(colors.border()));
        let inner = block.inner(track_area);
        block.render(track_area, buf);

        let width = inner.width.max(1) as f64;
        let to_col = |pos: f64| inner.x + ((pos / TRACK) * (width - 1.0)).round() as u16;
        let (zone_from, zone_to) = (to_col(ZONE.0), to_col(ZONE.1));
        for x in inner.left()..inner.right() {
            let bg = if (zone_from..=zone_to).contains(&x) {
                colors.go()
            } else {
                colors.bar_empty()
            };
            buf[(x, inner.y)].set_char(' ').set_style(Style::default().bg(bg));
        }
        if inner.width > 0 {
            let marker = to_col(self.position(now)).min(inner.right().saturating_sub(1));
            buf[(marker, inner.y)]
                .set_char('\u{2588}')
                .set_style(Style::default().fg(colors.fg()));
        }

        let msg = match self.stopped_at {
            None => Line::from(Span::styled(
                "Stop the marker inside the green zone",
                Style::default().fg(colors.fg()),
            )),
            Some(pos) => Line::from(Span::styled(
                format!("Stopped at {pos:.1}  \u{2192}  {} pts", Self::score_for(pos)),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
        };
        Paragraph::new(msg).centered().render(msg_area, buf);
    }

    fn hints(&self) -> &'static str {
        "[Space/Enter] Stop"
    }
}
