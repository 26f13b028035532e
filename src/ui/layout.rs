use ratatui::layout::{Constraint, Layout, Rect};

/// Screen regions while a test is running.
pub struct RunLayout {
    pub header: Rect,
    pub progress: Rect,
    pub title: Rect,
    pub game: Rect,
    pub footer: Rect,
}

impl RunLayout {
    pub fn new(area: Rect, footer_lines: u16) -> Self {
        // Short terminals drop the bordered progress bar to a single line.
        let progress_h = if area.height >= 24 { 3 } else { 1 };
        let [header, progress, title, game, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(progress_h),
            Constraint::Length(2),
            Constraint::Min(6),
            Constraint::Length(footer_lines.max(1)),
        ])
        .areas(area);
        Self {
            header,
            progress,
            title,
            game,
            footer,
        }
    }
}

/// Greedily packs hints into as few lines as fit `width`.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    const PREFIX: &str = " ";
    const SEPARATOR: &str = "  ";
    if width == 0 {
        return Vec::new();
    }

    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    for hint in hints.iter().filter(|h| !h.is_empty()) {
        if current.is_empty() {
            current = format!("{PREFIX}{hint}");
            continue;
        }
        let candidate = format!("{current}{SEPARATOR}{hint}");
        if candidate.chars().count() <= width {
            current = candidate;
        } else {
            out.push(std::mem::replace(&mut current, format!("{PREFIX}{hint}")));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// A `percent_x` by `percent_y` box centered in `area`, never smaller than
/// `min_w` x `min_h` unless the area itself is.
pub fn centered_rect(percent_x: u16, percent_y: u16, min_w: u16, min_h: u16, area: Rect) -> Rect {
    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;
    let w = requested_w.max(min_w).min(area.width);
    let h = requested_h.max(min_h).min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_pack_into_width() {
        let lines = pack_hint_lines(&["[a] One", "[b] Two", "[c] Three"], 18);
        assert_eq!(lines, vec![" [a] One  [b] Two", " [c] Three"]);
    }

    #[test]
    fn hints_skip_empty_and_zero_width() {
        assert!(pack_hint_lines(&["x"], 0).is_empty());
        assert_eq!(pack_hint_lines(&["", "x", ""], 10), vec![" x"]);
    }

    #[test]
    fn centered_rect_respects_minimum_and_bounds() {
        let area = Rect::new(0, 0, 100, 40);
        let r = centered_rect(50, 50, 60, 10, area);
        assert_eq!(r, Rect::new(20, 10, 60, 20));

        let small = Rect::new(0, 0, 30, 8);
        let r = centered_rect(50, 50, 60, 10, small);
        assert_eq!(r, small);
    }

    #[test]
    fn run_layout_fills_area() {
        let area = Rect::new(0, 0, 80, 30);
        let l = RunLayout::new(area, 2);
        assert_eq!(l.header.height, 1);
        assert_eq!(l.progress.height, 3);
        assert_eq!(l.footer.height, 2);
        assert_eq!(
            l.header.height + l.progress.height + l.title.height + l.game.height + l.footer.height,
            30
        );
    }
}
