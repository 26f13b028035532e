use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

const FIRST_MESSAGE: &str = "Initializing data...";
const MESSAGES: &[&str] = &[
    "Analyzing APM peaks...",
    "Measuring neural response latency...",
    "Calibrating dynamic vision model...",
    "Building the skill radar...",
    "Archiving results...",
];
const MESSAGE_EVERY_MS: u128 = 800;
const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

pub fn status_message(elapsed: Duration) -> &'static str {
    match (elapsed.as_millis() / MESSAGE_EVERY_MS) as usize {
        0 => FIRST_MESSAGE,
        n => MESSAGES[(n - 1) % MESSAGES.len()],
    }
}

/// Non-interactive interlude between the last test and the results.
pub struct AnalysisView<'a> {
    elapsed: Duration,
    progress: f64,
    theme: &'a Theme,
}

impl<'a> AnalysisView<'a> {
    pub fn new(elapsed: Duration, progress: f64, theme: &'a Theme) -> Self {
        Self {
            elapsed,
            progress,
            theme,
        }
    }
}

impl Widget for AnalysisView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let [_, spinner, message, _, bar, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .areas(area);
        let [_, bar, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Max(60),
            Constraint::Fill(1),
        ])
        .areas(bar);

        let frame = (self.elapsed.as_millis() / 120) as usize % SPINNER.len();
        Paragraph::new(Line::from(Span::styled(
            SPINNER[frame].to_string(),
            Style::default().fg(colors.accent()),
        )))
        .alignment(Alignment::Center)
        .render(spinner, buf);

        Paragraph::new(Line::from(Span::styled(
            status_message(self.elapsed),
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(message, buf);

        ProgressBar::new("Analysis", self.progress, self.theme).render(bar, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_rotate_every_800ms() {
        assert_eq!(status_message(Duration::from_millis(0)), FIRST_MESSAGE);
        assert_eq!(status_message(Duration::from_millis(799)), FIRST_MESSAGE);
        assert_eq!(status_message(Duration::from_millis(800)), MESSAGES[0]);
        assert_eq!(status_message(Duration::from_millis(1600)), MESSAGES[1]);
        assert_eq!(
            status_message(Duration::from_millis(800 * (MESSAGES.len() as u64 + 1))),
            MESSAGES[0]
        );
    }

    #[test]
    fn renders_message_and_bar() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 70, 12);
        let mut buf = Buffer::empty(area);
        AnalysisView::new(Duration::from_millis(900), 0.25, &theme).render(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains(MESSAGES[0]));
        assert!(text.contains("25%"));
    }
}
