use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Horizontal fill bar with a percentage label. Gets a titled border when
/// there is room for one.
pub struct ProgressBar<'a> {
    label: String,
    ratio: f64,
    theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(label: impl Into<String>, ratio: f64, theme: &'a Theme) -> Self {
        let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            label: label.into(),
            ratio,
            theme,
        }
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let inner = if area.height >= 3 {
            let block = Block::bordered()
                .title(format!(" {} ", self.label))
                .border_style(Style::default().fg(colors.border()));
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64).round() as u16;
        for x in inner.left()..inner.right() {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_char(' ').set_style(style);
        }

        let pct = format!("{:.0}%", self.ratio * 100.0);
        let label = if area.height >= 3 {
            pct
        } else {
            format!("{} {pct}", self.label)
        };
        let label_w = (label.chars().count() as u16).min(inner.width);
        let label_x = inner.x + (inner.width - label_w) / 2;
        for (i, ch) in label.chars().take(label_w as usize).enumerate() {
            let x = label_x + i as u16;
            buf[(x, inner.y)].set_char(ch).set_fg(if x < inner.x + filled_width {
                colors.bg()
            } else {
                colors.fg()
            });
        }
    }
}
