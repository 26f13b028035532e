use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::Rng;
use rand::rngs::SmallRng;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::games::{Completion, MiniGame, child_rng, is_action};
use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

const MIN_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 3000;

/// One light, one press. Jumping the gun restarts the wait.
pub struct ReflexGame {
    rng: SmallRng,
    lights_at: Instant,
    lit_since: Option<Instant>,
    false_starts: u32,
    result_ms: Option<u64>,
    done: Completion,
}

pub fn create(rng: &mut SmallRng, now: Instant) -> Box<dyn MiniGame> {
    Box::new(ReflexGame::new(child_rng(rng), now))
}

impl ReflexGame {
    pub fn new(mut rng: SmallRng, now: Instant) -> Self {
        let lights_at = now + Self::delay(&mut rng);
        Self {
            rng,
            lights_at,
            lit_since: None,
            false_starts: 0,
            result_ms: None,
            done: Completion::default(),
        }
    }

    fn delay(rng: &mut SmallRng) -> Duration {
        Duration::from_millis(rng.gen_range(MIN_DELAY_MS..=MAX_DELAY_MS))
    }
}

impl MiniGame for ReflexGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        if !is_action(key) || self.done.is_finished() {
            return;
        }
        match self.lit_since {
            Some(lit) => {
                let ms = now.saturating_duration_since(lit).as_millis() as u64;
                self.result_ms = Some(ms);
                self.done
                    .finish_at(now, TestOutcome::new(ms as f64, format!("{ms}"), "ms"));
            }
            None => {
                self.false_starts += 1;
                self.lights_at = now + Self::delay(&mut self.rng);
            }
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if self.lit_since.is_none() && now >= self.lights_at {
            self.lit_since = Some(now);
        }
    }

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, _now: Instant) {
        let colors = &theme.colors;
        let [_, lamp_area, _, msg_area, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Fill(1),
        ])
        .areas(area);
        let [_, lamp, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Fill(1),
        ])
        .areas(lamp_area);

        let on = self.lit_since.is_some() && self.result_ms.is_none();
        let fill = if on { colors.warning() } else { colors.cell_idle() };
        Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(fill))
            .render(lamp, buf);

        let bold = Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD);
        let mut lines = vec![match (self.result_ms, on) {
            (Some(ms), _) => Line::from(Span::styled(format!("{ms} ms"), bold)),
            (None, true) => Line::from(Span::styled("NOW!", bold)),
            (None, false) => Line::from(Span::styled(
                "Press when the light turns on",
                Style::default().fg(colors.fg()),
            )),
        }];
        if self.false_starts > 0 {
            lines.push(Line::from(Span::styled(
                format!("False starts: {}", self.false_starts),
                Style::default().fg(colors.error()),
            )));
        }
        Paragraph::new(lines).centered().render(msg_area, buf);
    }

    fn hints(&self) -> &'static str {
        "[Space/Enter] React"
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn reports_latency_immediately() {
        let t0 = Instant::now();
        let mut game = ReflexGame::new(SmallRng::seed_from_u64(21), t0);
        let lit = game.lights_at;
        assert!(lit >= t0 + Duration::from_millis(MIN_DELAY_MS));
        assert!(lit <= t0 + Duration::from_millis(MAX_DELAY_MS));
        game.on_tick(lit);
        let press = lit + Duration::from_millis(231);
        game.on_key(KeyCode::Char(' '), press);
        let outcome = game.poll_outcome(press).unwrap();
        assert_eq!(outcome.score, 231.0);
        assert_eq!(outcome.display, "231");
        assert_eq!(outcome.unit, "ms");
    }

    #[test]
    fn early_press_rearms() {
        let t0 = Instant::now();
        let mut game = ReflexGame::new(SmallRng::seed_from_u64(21), t0);
        let early = t0 + Duration::from_millis(500);
        game.on_key(KeyCode::Enter, early);
        assert_eq!(game.false_starts, 1);
        assert!(game.lights_at >= early + Duration::from_millis(MIN_DELAY_MS));
        assert!(game.poll_outcome(early).is_none());
    }

    #[test]
    fn light_stays_off_before_delay() {
        let t0 = Instant::now();
        let mut game = ReflexGame::new(SmallRng::seed_from_u64(2), t0);
        game.on_tick(t0 + Duration::from_millis(999));
        assert!(game.lit_since.is_none());
    }
}
