use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::Rng;
use rand::rngs::SmallRng;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Widget};

use crate::games::{Completion, MiniGame, child_rng, is_action, render_centered};
use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

const ROUNDS: usize = 3;
const MIN_DELAY_MS: u64 = 2000;
const MAX_DELAY_MS: u64 = 5000;
const RESULT_HOLD: Duration = Duration::from_millis(1500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Waiting { too_early: bool },
    Armed { go_at: Instant },
    Go { shown_at: Instant },
    Clicked,
}

/// Red panel, random wait, green panel: measures the press latency over
/// three rounds. Pressing while red throws the round away.
pub struct ReactionGame {
    rng: SmallRng,
    phase: Phase,
    times_ms: Vec<u64>,
    done: Completion,
}

pub fn create(rng: &mut SmallRng, _now: Instant) -> Box<dyn MiniGame> {
    Box::new(ReactionGame::new(child_rng(rng)))
}

impl ReactionGame {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            rng,
            phase: Phase::Waiting { too_early: false },
            times_ms: Vec::with_capacity(ROUNDS),
            done: Completion::default(),
        }
    }

    fn arm(&mut self, now: Instant) {
        let delay = self.rng.gen_range(MIN_DELAY_MS..=MAX_DELAY_MS);
        self.phase = Phase::Armed {
            go_at: now + Duration::from_millis(delay),
        };
    }

    fn average_ms(&self) -> u64 {
        if self.times_ms.is_empty() {
            return 0;
        }
        self.times_ms.iter().sum::<u64>() / self.times_ms.len() as u64
    }
}

impl MiniGame for ReactionGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        if !is_action(key) || self.done.is_finished() {
            return;
        }
        match self.phase {
            Phase::Waiting { .. } | Phase::Clicked => self.arm(now),
            Phase::Armed { .. } => self.phase = Phase::Waiting { too_early: true },
            Phase::Go { shown_at } => {
                let ms = now.saturating_duration_since(shown_at).as_millis() as u64;
                self.times_ms.push(ms);
                self.phase = Phase::Clicked;
                if self.times_ms.len() >= ROUNDS {
                    let avg = self.average_ms();
                    self.done.finish_after(
                        now,
                        RESULT_HOLD,
                        TestOutcome::new(avg as f64, format!("{avg}"), "ms (avg)"),
                    );
                }
            }
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if let Phase::Armed { go_at } = self.phase
            && now >= go_at
        {
            // Timed from when the green panel can first be drawn.
            self.phase = Phase::Go { shown_at: now };
        }
    }

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, _now: Instant) {
        let colors = &theme.colors;
        let panel_bg = match self.phase {
            Phase::Armed { .. } => colors.stop(),
            Phase::Go { .. } => colors.go(),
            _ => colors.bg(),
        };
        Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(panel_bg))
            .render(area, buf);

        let round = (self.times_ms.len() + 1).min(ROUNDS);
        let bold = Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD);
        let lines = match self.phase {
            Phase::Waiting { too_early } => {
                let mut lines = vec![
                    Line::from(Span::styled(
                        format!("Round {round} / {ROUNDS}"),
                        Style::default().fg(colors.accent()),
                    )),
                    Line::from(""),
                ];
                if too_early {
                    lines.push(Line::from(Span::styled(
                        "Too early! Wait for green.",
                        Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(""));
                }
                let prompt = if self.times_ms.is_empty() {
                    "Press [Space] to begin"
                } else {
                    "Press [Space] for the next round"
                };
                lines.push(Line::from(Span::styled(prompt, bold)));
                lines
            }
            Phase::Armed { .. } => vec![Line::from(Span::styled("Wait for green...", bold))],
            Phase::Go { .. } => vec![Line::from(Span::styled("PRESS!", bold))],
            Phase::Clicked => {
                let last = self.times_ms.last().copied().unwrap_or(0);
                let follow = if self.times_ms.len() < ROUNDS {
                    "[Space] Next round"
                } else {
                    "Done! Averaging..."
                };
                vec![
                    Line::from(Span::styled(format!("{last} ms"), bold)),
                    Line::from(""),
                    Line::from(Span::styled(follow, Style::default().fg(colors.success()))),
                ]
            }
        };
        render_centered(lines, area, buf);
    }

    fn hints(&self) -> &'static str {
        "[Space] Start / React"
    }
}
