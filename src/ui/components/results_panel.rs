use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::controller::ArchiveCheck;
use crate::session::record::{ScoreRecord, User};
use crate::ui::Notice;
use crate::ui::theme::Theme;

const LEVEL_COL: usize = 24;
const TEST_COL: usize = 22;

pub const DISCLAIMER: &str =
    "No composite score is computed: each test is reported on its own scale.";

pub struct ResultsPanel<'a> {
    user: Option<&'a User>,
    records: &'a [ScoreRecord],
    archive: Option<&'a ArchiveCheck>,
    failed_submissions: usize,
    notice: Option<&'a Notice>,
    scroll: usize,
    theme: &'a Theme,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(user: Option<&'a User>, records: &'a [ScoreRecord], theme: &'a Theme) -> Self {
        Self {
            user,
            records,
            archive: None,
            failed_submissions: 0,
            notice: None,
            scroll: 0,
            theme,
        }
    }

    pub fn archive(mut self, archive: Option<&'a ArchiveCheck>) -> Self {
        self.archive = archive;
        self
    }

    pub fn failed_submissions(mut self, count: usize) -> Self {
        self.failed_submissions = count;
        self
    }

    pub fn notice(mut self, notice: Option<&'a Notice>) -> Self {
        self.notice = notice;
        self
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

pub fn archive_note(check: &ArchiveCheck) -> String {
    match check {
        ArchiveCheck::Verified(n) => format!("Archive verified: {n} records stored."),
        ArchiveCheck::Mismatch { local, stored } => {
            format!("Archive mismatch: {local} results this session, {stored} stored.")
        }
        ArchiveCheck::Unavailable(err) => format!("Archive unavailable: {err}"),
    }
}

fn pad(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width + 2 - len));
    out
}

impl Widget for ResultsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Assessment Results ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let [title_area, table_area, notes_area, help_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .areas(inner);

        let name = self.user.map(|u| u.username.as_str()).unwrap_or("-");
        Paragraph::new(Line::from(vec![
            Span::styled(
                name,
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  \u{00b7}  {} tests completed", self.records.len()),
                Style::default().fg(colors.text_dim()),
            ),
        ]))
        .alignment(Alignment::Center)
        .render(title_area, buf);

        let header_style = Style::default()
            .fg(colors.text_dim())
            .add_modifier(Modifier::BOLD);
        let mut rows = vec![Line::from(Span::styled(
            format!("  {}{}Score", pad("Level", LEVEL_COL), pad("Test", TEST_COL)),
            header_style,
        ))];
        let visible = (table_area.height as usize).saturating_sub(1);
        let scroll = self.scroll.min(self.records.len().saturating_sub(visible));
        for record in self.records.iter().skip(scroll).take(visible) {
            rows.push(Line::from(vec![
                Span::styled(
                    format!("  {}", pad(&record.level_name, LEVEL_COL)),
                    Style::default().fg(colors.text_dim()),
                ),
                Span::styled(pad(&record.test_name, TEST_COL), Style::default().fg(colors.fg())),
                Span::styled(
                    record.display_score.clone(),
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {}", record.unit),
                    Style::default().fg(colors.text_dim()),
                ),
            ]));
        }
        Paragraph::new(rows).render(table_area, buf);

        let mut notes = vec![Line::from(Span::styled(
            DISCLAIMER,
            Style::default().fg(colors.text_dim()),
        ))];
        if let Some(check) = self.archive {
            let color = match check {
                ArchiveCheck::Verified(_) => colors.success(),
                _ => colors.warning(),
            };
            notes.push(Line::from(Span::styled(archive_note(check), Style::default().fg(color))));
        }
        if self.failed_submissions > 0 {
            notes.push(Line::from(Span::styled(
                format!(
                    "{} score submission(s) failed; results above are from this session.",
                    self.failed_submissions
                ),
                Style::default().fg(colors.warning()),
            )));
        }
        if let Some(notice) = self.notice {
            let color = if notice.is_error { colors.error() } else { colors.success() };
            notes.push(Line::from(Span::styled(notice.text.as_str(), Style::default().fg(color))));
        }
        Paragraph::new(notes)
            .wrap(Wrap { trim: true })
            .render(notes_area, buf);

        Paragraph::new(Line::from(Span::styled(
            "  [e] Export report  [r] Restart  [j/k] Scroll  [q] Quit",
            Style::default().fg(colors.accent()),
        )))
        .render(help_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(test: &str, display: &str) -> ScoreRecord {
        ScoreRecord {
            level_id: 2,
            level_name: "Reaction".to_string(),
            test_id: test.to_string(),
            test_name: test.to_string(),
            score: 1.0,
            display_score: display.to_string(),
            unit: "ms".to_string(),
        }
    }

    fn text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn renders_rows_and_notes() {
        let theme = Theme::default();
        let user = User::new("ace");
        let records = vec![record("Pure Reaction", "231"), record("Rapid Clear", "17")];
        let check = ArchiveCheck::Verified(2);
        let notice = Notice::info("Saved report");
        let area = Rect::new(0, 0, 90, 20);
        let mut buf = Buffer::empty(area);
        ResultsPanel::new(Some(&user), &records, &theme)
            .archive(Some(&check))
            .failed_submissions(1)
            .notice(Some(&notice))
            .render(area, &mut buf);

        let out = text(&buf);
        assert!(out.contains("ace"));
        assert!(out.contains("Pure Reaction"));
        assert!(out.contains("231 ms"));
        assert!(out.contains("No composite score"));
        assert!(out.contains("Archive verified: 2"));
        assert!(out.contains("1 score submission(s) failed"));
        assert!(out.contains("Saved report"));
    }

    #[test]
    fn scroll_is_clamped() {
        let theme = Theme::default();
        let records: Vec<ScoreRecord> = (0..3).map(|i| record(&format!("T{i}"), "1")).collect();
        let area = Rect::new(0, 0, 80, 16);
        let mut buf = Buffer::empty(area);
        ResultsPanel::new(None, &records, &theme)
            .scroll(99)
            .render(area, &mut buf);
        assert!(text(&buf).contains("T0"));
    }

    #[test]
    fn archive_notes() {
        assert_eq!(
            archive_note(&ArchiveCheck::Mismatch { local: 3, stored: 1 }),
            "Archive mismatch: 3 results this session, 1 stored."
        );
        assert!(archive_note(&ArchiveCheck::Unavailable("io".into())).contains("io"));
    }
}
