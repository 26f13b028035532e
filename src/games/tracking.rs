use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::Rng;
use rand::rngs::SmallRng;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::games::{Completion, MiniGame, child_rng, direction, percent};
use crate::session::record::TestOutcome;
use crate::ui::theme::Theme;

/// Field units per millisecond on a 0-100 square field.
const SPEED: f64 = 0.04;
const WAYPOINT_RANGE: (f64, f64) = (10.0, 90.0);
const CROSSHAIR_STEP: f64 = 4.0;
const LOCK_RADIUS: f64 = 8.0;
const SAMPLE_EVERY: Duration = Duration::from_millis(50);
const ROUND: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

impl Point {
    fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Keep the crosshair on a target that glides between random waypoints.
pub struct TrackingGame {
    rng: SmallRng,
    target: Point,
    waypoint: Point,
    crosshair: Point,
    started: Instant,
    last_tick: Instant,
    next_sample: Instant,
    samples: usize,
    locked: usize,
    done: Completion,
}

pub fn create(rng: &mut SmallRng, now: Instant) -> Box<dyn MiniGame> {
    Box::new(TrackingGame::new(child_rng(rng), now))
}

impl TrackingGame {
    pub fn new(mut rng: SmallRng, now: Instant) -> Self {
        let waypoint = Self::random_waypoint(&mut rng);
        let center = Point { x: 50.0, y: 50.0 };
        Self {
            rng,
            target: center,
            waypoint,
            crosshair: center,
            started: now,
            last_tick: now,
            next_sample: now + SAMPLE_EVERY,
            samples: 0,
            locked: 0,
            done: Completion::default(),
        }
    }

    fn random_waypoint(rng: &mut SmallRng) -> Point {
        Point {
            x: rng.gen_range(WAYPOINT_RANGE.0..WAYPOINT_RANGE.1),
            y: rng.gen_range(WAYPOINT_RANGE.0..WAYPOINT_RANGE.1),
        }
    }

    fn advance_target(&mut self, elapsed: Duration) {
        let step = SPEED * elapsed.as_secs_f64() * 1000.0;
        let dist = self.target.distance(self.waypoint);
        if dist <= step {
            self.target = self.waypoint;
            self.waypoint = Self::random_waypoint(&mut self.rng);
        } else {
            self.target.x += (self.waypoint.x - self.target.x) / dist * step;
            self.target.y += (self.waypoint.y - self.target.y) / dist * step;
        }
    }

    fn is_locked(&self) -> bool {
        self.target.distance(self.crosshair) <= LOCK_RADIUS
    }

    fn coverage(&self) -> u32 {
        percent(self.locked, self.samples)
    }
}

impl MiniGame for TrackingGame {
    fn on_key(&mut self, key: KeyCode, _now: Instant) {
        if self.done.is_finished() {
            return;
        }
        if let Some((dx, dy)) = direction(key) {
            self.crosshair.x = (self.crosshair.x + dx as f64 * CROSSHAIR_STEP).clamp(0.0, 100.0);
            self.crosshair.y = (self.crosshair.y + dy as f64 * CROSSHAIR_STEP).clamp(0.0, 100.0);
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if self.done.is_finished() {
            return;
        }
        let end = self.started + ROUND;
        let now = now.min(end);
        self.advance_target(now.saturating_duration_since(self.last_tick));
        self.last_tick = now;

        while self.next_sample <= now {
            self.samples += 1;
            if self.is_locked() {
                self.locked += 1;
            }
            self.next_sample += SAMPLE_EVERY;
        }

        if now >= end {
            let p = self.coverage();
            self.done
                .finish_at(now, TestOutcome::new(p as f64, format!("{p}%"), "coverage"));
        }
    }

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, now: Instant) {
        let colors = &theme.colors;
        let [status, field] = Layout::vertical([Constraint::Length(2), Constraint::Min(5)]).areas(area);
        let left = ROUND.saturating_sub(now.saturating_duration_since(self.started));
        let lock_style = if self.is_locked() {
            Style::default().fg(colors.success()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.text_dim())
        };
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("Time {:.1}s", left.as_secs_f64()),
                Style::default().fg(colors.accent()),
            ),
            Span::raw("   "),
            Span::styled(format!("Coverage {}%", self.coverage()), lock_style),
        ]))
        .centered()
        .render(status, buf);

        let block = Block::bordered().border_style(Style::default().fg(colors.border()));
        let inner = block.inner(field);
        block.render(field, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }
        let to_cell = |p: Point| {
            (
                inner.x + (p.x / 100.0 * (inner.width - 1) as f64).round() as u16,
                inner.y + (p.y / 100.0 * (inner.height - 1) as f64).round() as u16,
            )
        };
        let (tx, ty) = to_cell(self.target);
        buf[(tx, ty)]
            .set_char('\u{25cf}')
            .set_style(Style::default().fg(colors.stop()));
        let (cx, cy) = to_cell(self.crosshair);
        buf[(cx, cy)]
            .set_char('+')
            .set_style(Style::default().fg(colors.cursor()).add_modifier(Modifier::BOLD));
    }

    fn hints(&self) -> &'static str {
        "[\u{2190}\u{2191}\u{2192}\u{2193}/hjkl] Move crosshair"
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn target_moves_at_fixed_speed() {
        let t0 = Instant::now();
        let mut game = TrackingGame::new(SmallRng::seed_from_u64(10), t0);
        let start = game.target;
        let waypoint = game.waypoint;
        game.on_tick(t0 + Duration::from_millis(50));
        let moved = start.distance(game.target);
        if start.distance(waypoint) > 2.0 {
            assert!((moved - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn crosshair_steps_and_clamps() {
        let t0 = Instant::now();
        let mut game = TrackingGame::new(SmallRng::seed_from_u64(10), t0);
        game.on_key(KeyCode::Right, t0);
        assert_eq!(game.crosshair.x, 54.0);
        for _ in 0..30 {
            game.on_key(KeyCode::Char('k'), t0);
        }
        assert_eq!(game.crosshair.y, 0.0);
    }

    #[test]
    fn idle_crosshair_scores_from_start_lock() {
        let t0 = Instant::now();
        let mut game = TrackingGame::new(SmallRng::seed_from_u64(12), t0);
        // Locked at first: target and crosshair both start centered.
        game.on_tick(t0 + SAMPLE_EVERY);
        assert_eq!((game.samples, game.locked), (1, 1));

        let mut now = t0 + SAMPLE_EVERY;
        while now < t0 + ROUND {
            now += SAMPLE_EVERY;
            game.on_tick(now);
        }
        assert_eq!(game.samples, 200);
        let outcome = game.poll_outcome(now).unwrap();
        assert_eq!(outcome.unit, "coverage");
        assert!(outcome.score > 0.0 && outcome.score <= 100.0);
        assert_eq!(outcome.display, format!("{}%", outcome.score as u32));
        assert!(game.poll_outcome(now).is_none());
    }
}
