use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::Rng;
use rand::rngs::SmallRng;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::games::{Completion, MiniGame, child_rng, direction, is_action, percent, render_centered};
use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

const FIELD_W: i32 = 40;
const FIELD_H: i32 = 12;
const ROUND: Duration = Duration::from_secs(30);
const SPAWN_EVERY: Duration = Duration::from_millis(400);
const MAX_TARGETS: usize = 6;
const STEP_X: i32 = 2;
const STEP_Y: i32 = 1;
const RESULT_HOLD: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Ready,
    Playing { ends_at: Instant, next_spawn: Instant },
    Over,
}

/// Targets pop up on a small field; move the crosshair and fire for
/// thirty seconds.
pub struct AimGame {
    rng: SmallRng,
    phase: Phase,
    targets: Vec<(i32, i32)>,
    crosshair: (i32, i32),
    hits: u32,
    shots: u32,
    done: Completion,
}

pub fn create(rng: &mut SmallRng, _now: Instant) -> Box<dyn MiniGame> {
    Box::new(AimGame::new(child_rng(rng)))
}

impl AimGame {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            rng,
            phase: Phase::Ready,
            targets: Vec::with_capacity(MAX_TARGETS),
            crosshair: (FIELD_W / 2, FIELD_H / 2),
            hits: 0,
            shots: 0,
            done: Completion::default(),
        }
    }

    fn accuracy(&self) -> u32 {
        percent(self.hits as usize, self.shots as usize)
    }

    fn spawn(&mut self) {
        if self.targets.len() >= MAX_TARGETS {
            return;
        }
        let x = self.rng.gen_range(0..FIELD_W);
        let y = self.rng.gen_range(0..FIELD_H);
        self.targets.push((x, y));
    }

    fn fire(&mut self) {
        self.shots += 1;
        let (cx, cy) = self.crosshair;
        let hit = self
            .targets
            .iter()
            .enumerate()
            .filter(|(_, (x, y))| *y == cy && (x - cx).abs() <= 1)
            .min_by_key(|(_, (x, _))| (x - cx).abs())
            .map(|(i, _)| i);
        if let Some(i) = hit {
            self.targets.swap_remove(i);
            self.hits += 1;
        }
    }
}

impl MiniGame for AimGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        match self.phase {
            Phase::Ready if is_action(key) => {
                self.phase = Phase::Playing {
                    ends_at: now + ROUND,
                    next_spawn: now + SPAWN_EVERY,
                };
            }
            Phase::Playing { .. } => {
                if let Some((dx, dy)) = direction(key) {
                    self.crosshair.0 = (self.crosshair.0 + dx * STEP_X).clamp(0, FIELD_W - 1);
                    self.crosshair.1 = (self.crosshair.1 + dy * STEP_Y).clamp(0, FIELD_H - 1);
                } else if is_action(key) {
                    self.fire();
                }
            }
            _ => {}
        }
    }

    fn on_tick(&mut self, now: Instant) {
        let Phase::Playing {
            ends_at,
            mut next_spawn,
        } = self.phase
        else {
            return;
        };
        while next_spawn <= now && next_spawn < ends_at {
            self.spawn();
            next_spawn += SPAWN_EVERY;
        }
        if now >= ends_at {
            self.phase = Phase::Over;
            self.targets.clear();
            let acc = self.accuracy();
            self.done.finish_after(
                now,
                RESULT_HOLD,
                TestOutcome::new(
                    self.hits as f64,
                    format!("{} hits ({acc}%)", self.hits),
                    "score",
                ),
            );
        } else {
            self.phase = Phase::Playing {
                ends_at,
                next_spawn,
            };
        }
    }

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, now: Instant) {
        let colors = &theme.colors;
        if self.phase == Phase::Ready {
            let lines = vec![
                Line::from(Span::styled(
                    "FPS aim drill (30s)",
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press [Space] to start",
                    Style::default().fg(colors.fg()),
                )),
            ];
            render_centered(lines, area, buf);
            return;
        }

        let [hud, field_area] = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(area);
        let secs_left = match self.phase {
            Phase::Playing { ends_at, .. } => ends_at.saturating_duration_since(now).as_secs(),
            _ => 0,
        };
        let time_style = if secs_left <= 5 {
            Style::default().fg(colors.error()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.accent())
        };
        Paragraph::new(Line::from(vec![
            Span::styled(format!("TIME {secs_left}s"), time_style),
            Span::raw("   "),
            Span::styled(format!("HITS {}", self.hits), Style::default().fg(colors.fg())),
            Span::raw("   "),
            Span::styled(
                format!("ACC {}%", self.accuracy()),
                Style::default().fg(colors.text_dim()),
            ),
        ]))
        .centered()
        .render(hud, buf);

        let [_, field, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(FIELD_W as u16 + 2),
            Constraint::Fill(1),
        ])
        .areas(field_area);
        let field = Rect {
            height: field.height.min(FIELD_H as u16 + 2),
            ..field
        };
        let block = Block::bordered().border_style(Style::default().fg(colors.border()));
        let inner = block.inner(field);
        block.render(field, buf);

        let mut put = |x: i32, y: i32, ch: char, style: Style| {
            let (x, y) = (x as u16, y as u16);
            if x < inner.width && y < inner.height {
                buf[(inner.x + x, inner.y + y)].set_char(ch).set_style(style);
            }
        };
        for &(x, y) in &self.targets {
            put(x, y, '\u{25c9}', Style::default().fg(colors.warning()));
        }
        let (cx, cy) = self.crosshair;
        put(
            cx,
            cy,
            '+',
            Style::default().fg(colors.cursor()).add_modifier(Modifier::BOLD),
        );
    }

    fn hints(&self) -> &'static str {
        "[\u{2190}\u{2191}\u{2192}\u{2193}/hjkl] Aim  [Space] Start / Fire"
    }
}
