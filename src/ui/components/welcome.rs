use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::catalog::Catalog;
use crate::ui::Notice;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Title, name field and an outline of the levels ahead.
pub struct WelcomeForm<'a> {
    input: &'a LineInput,
    catalog: &'a Catalog,
    notice: Option<&'a Notice>,
    theme: &'a Theme,
}

impl<'a> WelcomeForm<'a> {
    pub fn new(input: &'a LineInput, catalog: &'a Catalog, theme: &'a Theme) -> Self {
        Self {
            input,
            catalog,
            notice: None,
            theme,
        }
    }

    pub fn notice(mut self, notice: Option<&'a Notice>) -> Self {
        self.notice = notice;
        self
    }
}

impl Widget for WelcomeForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let [title, field, notice, levels, help] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        Paragraph::new(vec![
            Line::from(Span::styled(
                "PRO EVAL",
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Esports aptitude assessment",
                Style::default().fg(colors.text_dim()),
            )),
        ])
        .alignment(Alignment::Center)
        .render(title, buf);

        let field_block = Block::bordered()
            .title(" Player name ")
            .border_style(Style::default().fg(colors.accent_dim()));
        let field_inner = field_block.inner(field);
        field_block.render(field, buf);
        let (before, cursor_ch, after) = self.input.render_parts();
        let cursor_style = Style::default().fg(colors.bg()).bg(colors.cursor());
        let mut spans = vec![Span::styled(before, Style::default().fg(colors.fg()))];
        match cursor_ch {
            Some(ch) => {
                spans.push(Span::styled(ch.to_string(), cursor_style));
                spans.push(Span::styled(after, Style::default().fg(colors.fg())));
            }
            None => spans.push(Span::styled(" ", cursor_style)),
        }
        Paragraph::new(Line::from(spans)).render(field_inner, buf);

        if let Some(n) = self.notice {
            let color = if n.is_error { colors.error() } else { colors.success() };
            Paragraph::new(Line::from(Span::styled(n.text.as_str(), Style::default().fg(color))))
                .alignment(Alignment::Center)
                .render(notice, buf);
        }

        let mut lines = vec![Line::from(Span::styled(
            format!("{} tests across {} levels:", self.catalog.total_tests(), self.catalog.levels().len()),
            Style::default().fg(colors.text_dim()),
        ))];
        for (i, level) in self.catalog.levels().iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}. ", i + 1), Style::default().fg(colors.accent_dim())),
                Span::styled(level.name, Style::default().fg(colors.fg())),
                Span::styled(
                    format!("  ({})", level.tests.len()),
                    Style::default().fg(colors.text_dim()),
                ),
            ]));
        }
        Paragraph::new(lines).render(levels, buf);

        Paragraph::new(Line::from(Span::styled(
            "  [Enter] Start  [Esc] Quit",
            Style::default().fg(colors.accent()),
        )))
        .render(help, buf);
    }
}
