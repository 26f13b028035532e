use std::time::Instant;

use crossterm::event::KeyCode;
use rand::Rng;
use rand::rngs::SmallRng;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::games::{Completion, MiniGame, child_rng, direction, is_action};
use crate::session::record::TestOutcome;
use crate::ui::components::cell_grid::{Cell, CellGrid};
use crate::ui::theme::Theme;

const SIDE: usize = 5;
const STAGES: u32 = 5;

/// Used when the theme background is not an RGB color.
const FALLBACK_BG: (u8, u8, u8) = (15, 23, 42);

/// Find the tile that is slightly washed out. Each stage picks a new hue and
/// the odd tile gets closer to the others.
pub struct StaticVisionGame {
    rng: SmallRng,
    stage: u32,
    hue: f64,
    target: usize,
    cursor: (usize, usize),
    misses: u32,
    done: Completion,
}

pub fn create(rng: &mut SmallRng, _now: Instant) -> Box<dyn MiniGame> {
    Box::new(StaticVisionGame::new(child_rng(rng)))
}

impl StaticVisionGame {
    pub fn new(mut rng: SmallRng) -> Self {
        let hue = rng.gen_range(0.0..360.0);
        let target = rng.gen_range(0..SIDE * SIDE);
        Self {
            rng,
            stage: 1,
            hue,
            target,
            cursor: (SIDE / 2, SIDE / 2),
            misses: 0,
            done: Completion::default(),
        }
    }

    /// Opacity of the odd tile over the background.
    pub fn opacity(stage: u32) -> f64 {
        0.5 + stage as f64 * 0.08
    }

    fn grade(misses: u32) -> (f64, &'static str) {
        match misses {
            0 => (100.0, "S"),
            1 => (85.0, "A"),
            2 | 3 => (70.0, "B"),
            _ => (50.0, "C"),
        }
    }

    fn pick(&mut self, now: Instant) {
        let idx = self.cursor.1 * SIDE + self.cursor.0;
        if idx != self.target {
            self.misses += 1;
            return;
        }
        if self.stage < STAGES {
            self.stage += 1;
            self.hue = self.rng.gen_range(0.0..360.0);
            self.target = self.rng.gen_range(0..SIDE * SIDE);
        } else {
            let (score, grade) = Self::grade(self.misses);
            self.done
                .finish_at(now, TestOutcome::new(score, grade, "grade"));
        }
    }

    fn colors(&self, theme: &Theme) -> (Color, Color) {
        let base = hsl_to_rgb(self.hue, 0.7, 0.6);
        let bg = match theme.colors.bg() {
            Color::Rgb(r, g, b) => (r, g, b),
            _ => FALLBACK_BG,
        };
        let odd = blend(bg, base, Self::opacity(self.stage));
        (
            Color::Rgb(base.0, base.1, base.2),
            Color::Rgb(odd.0, odd.1, odd.2),
        )
    }
}

impl MiniGame for StaticVisionGame {
    fn on_key(&mut self, key: KeyCode, now: Instant) {
        if self.done.is_finished() {
            return;
        }
        if let Some((dx, dy)) = direction(key) {
            let max = SIDE as i32 - 1;
            self.cursor.0 = (self.cursor.0 as i32 + dx).clamp(0, max) as usize;
            self.cursor.1 = (self.cursor.1 as i32 + dy).clamp(0, max) as usize;
        } else if is_action(key) {
            self.pick(now);
        }
    }

    fn on_tick(&mut self, _now: Instant) {}

    fn poll_outcome(&mut self, now: Instant) -> Option<TestOutcome> {
        self.done.poll(now)
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, _now: Instant) {
        let colors = &theme.colors;
        let [status, grid] = Layout::vertical([Constraint::Length(2), Constraint::Min(5)]).areas(area);
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("Stage {} / {STAGES}", self.stage),
                Style::default().fg(colors.accent()),
            ),
            Span::raw("   "),
            Span::styled(
                format!("Misses {}", self.misses),
                Style::default().fg(colors.warning()),
            ),
        ]))
        .centered()
        .render(status, buf);

        let (base, odd) = self.colors(theme);
        let cursor = self.cursor.1 * SIDE + self.cursor.0;
        let cells: Vec<Cell> = (0..SIDE * SIDE)
            .map(|i| {
                let fill = if i == self.target { odd } else { base };
                Cell::new(fill).selected(i == cursor)
            })
            .collect();
        CellGrid::new(&cells, SIDE as u16, theme).render(grid, buf);
    }

    fn hints(&self) -> &'static str {
        "[\u{2190}\u{2191}\u{2192}\u{2193}/hjkl] Move  [Space/Enter] Pick"
    }
}

/// `h` in degrees, `s` and `l` in 0..=1.
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_u8(r), to_u8(g), to_u8(b))
}

/// `fg` painted over `bg` at `alpha`.
fn blend(bg: (u8, u8, u8), fg: (u8, u8, u8), alpha: f64) -> (u8, u8, u8) {
    let mix = |b: u8, f: u8| (b as f64 + (f as f64 - b as f64) * alpha).round() as u8;
    (mix(bg.0, fg.0), mix(bg.1, fg.1), mix(bg.2, fg.2))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn move_to(game: &mut StaticVisionGame, idx: usize) {
        game.cursor = (idx % SIDE, idx / SIDE);
    }

    fn pick_target(game: &mut StaticVisionGame, now: Instant) {
        move_to(game, game.target);
        game.on_key(KeyCode::Enter, now);
    }

    fn pick_wrong(game: &mut StaticVisionGame, now: Instant) {
        let wrong = (game.target + 1) % (SIDE * SIDE);
        move_to(game, wrong);
        game.on_key(KeyCode::Char(' '), now);
    }

    #[test]
    fn clean_run_grades_s() {
        let t0 = Instant::now();
        let mut game = StaticVisionGame::new(SmallRng::seed_from_u64(2));
        for _ in 0..STAGES {
            pick_target(&mut game, t0);
        }
        let outcome = game.poll_outcome(t0).unwrap();
        assert_eq!(outcome.score, 100.0);
        assert_eq!(outcome.display, "S");
        assert_eq!(outcome.unit, "grade");
    }

    #[test]
    fn misses_lower_the_grade() {
        let t0 = Instant::now();
        let mut game = StaticVisionGame::new(SmallRng::seed_from_u64(2));
        pick_wrong(&mut game, t0);
        pick_wrong(&mut game, t0);
        for _ in 0..STAGES {
            pick_target(&mut game, t0);
        }
        let outcome = game.poll_outcome(t0).unwrap();
        assert_eq!(outcome.score, 70.0);
        assert_eq!(outcome.display, "B");
    }

    #[test]
    fn grade_table() {
        assert_eq!(StaticVisionGame::grade(1), (85.0, "A"));
        assert_eq!(StaticVisionGame::grade(3), (70.0, "B"));
        assert_eq!(StaticVisionGame::grade(4), (50.0, "C"));
    }

    #[test]
    fn odd_tile_gets_harder_each_stage() {
        assert!(StaticVisionGame::opacity(1) < StaticVisionGame::opacity(5));
        assert!((StaticVisionGame::opacity(5) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn cursor_stays_on_the_board() {
        let t0 = Instant::now();
        let mut game = StaticVisionGame::new(SmallRng::seed_from_u64(1));
        for _ in 0..10 {
            game.on_key(KeyCode::Left, t0);
            game.on_key(KeyCode::Char('k'), t0);
        }
        assert_eq!(game.cursor, (0, 0));
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), (255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), (0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), (0, 0, 255));
    }

    #[test]
    fn blend_halfway() {
        assert_eq!(blend((0, 0, 0), (200, 100, 50), 0.5), (100, 50, 25));
    }
}
