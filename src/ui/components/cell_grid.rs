use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug)]
pub struct Cell {
    pub fill: Color,
    pub label: Option<char>,
    pub selected: bool,
}

impl Cell {
    pub fn new(fill: Color) -> Self {
        Self {
            fill,
            label: None,
            selected: false,
        }
    }

    pub fn label(mut self, label: char) -> Self {
        self.label = Some(label);
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

/// Square-ish tiles laid out row-major and centered in the area.
pub struct CellGrid<'a> {
    cells: &'a [Cell],
    cols: u16,
    cell_w: u16,
    cell_h: u16,
    theme: &'a Theme,
}

impl<'a> CellGrid<'a> {
    pub fn new(cells: &'a [Cell], cols: u16, theme: &'a Theme) -> Self {
        Self {
            cells,
            cols: cols.max(1),
            cell_w: 6,
            cell_h: 3,
            theme,
        }
    }

    fn rows(&self) -> u16 {
        (self.cells.len() as u16).div_ceil(self.cols)
    }

    /// Shrinks tiles until the grid fits.
    fn fit(&mut self, area: Rect) {
        let rows = self.rows();
        while self.cell_w > 2 && self.cols * (self.cell_w + 1) > area.width {
            self.cell_w -= 1;
        }
        while self.cell_h > 1 && rows * (self.cell_h + 1) > area.height {
            self.cell_h -= 1;
        }
    }
}

impl Widget for CellGrid<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        self.fit(area);
        let colors = &self.theme.colors;
        let rows = self.rows();
        let total_w = (self.cols * (self.cell_w + 1)).saturating_sub(1).min(area.width);
        let total_h = (rows * (self.cell_h + 1)).saturating_sub(1).min(area.height);
        let left = area.x + (area.width - total_w) / 2;
        let top = area.y + (area.height - total_h) / 2;

        for (i, cell) in self.cells.iter().enumerate() {
            let row = i as u16 / self.cols;
            let col = i as u16 % self.cols;
            let x = left + col * (self.cell_w + 1);
            let y = top + row * (self.cell_h + 1);
            if x + self.cell_w > area.right() || y + self.cell_h > area.bottom() {
                continue;
            }

            for cy in y..y + self.cell_h {
                for cx in x..x + self.cell_w {
                    buf[(cx, cy)].set_char(' ').set_style(Style::default().bg(cell.fill));
                }
            }

            if cell.selected {
                let style = Style::default()
                    .fg(colors.cursor())
                    .bg(cell.fill)
                    .add_modifier(Modifier::BOLD);
                buf.set_string(x, y, "\u{250c}", style);
                buf.set_string(x + self.cell_w - 1, y, "\u{2510}", style);
                buf.set_string(x, y + self.cell_h - 1, "\u{2514}", style);
                buf.set_string(x + self.cell_w - 1, y + self.cell_h - 1, "\u{2518}", style);
            }

            if let Some(label) = cell.label {
                let lx = x + self.cell_w / 2;
                let ly = y + self.cell_h / 2;
                buf[(lx, ly)]
                    .set_char(label)
                    .set_style(Style::default().fg(colors.text_dim()).bg(cell.fill));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fill_and_label() {
        let theme = Theme::default();
        let cells = vec![
            Cell::new(Color::Red).label('1'),
            Cell::new(Color::Blue),
            Cell::new(Color::Green),
            Cell::new(Color::Yellow).selected(true),
        ];
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        CellGrid::new(&cells, 2, &theme).render(area, &mut buf);

        let reds = buf
            .content()
            .iter()
            .filter(|c| c.bg == Color::Red)
            .count();
        assert_eq!(reds, 18);
        assert!(buf.content().iter().any(|c| c.symbol() == "1"));
        assert!(buf.content().iter().any(|c| c.symbol() == "\u{250c}"));
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let theme = Theme::default();
        let cells = vec![Cell::new(Color::Red); 25];
        let area = Rect::new(0, 0, 7, 3);
        let mut buf = Buffer::empty(area);
        CellGrid::new(&cells, 5, &theme).render(area, &mut buf);
    }
}
