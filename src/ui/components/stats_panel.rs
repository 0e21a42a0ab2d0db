use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::api::types::StatsSummary;
use crate::session::stats_view::ActivityLine;
use crate::ui::theme::Theme;

/// Headline statistics plus the recent-activity log.
pub struct StatsPanel<'a> {
    pub stats: Option<&'a StatsSummary>,
    pub activities: &'a [ActivityLine],
    pub theme: &'a Theme,
}

impl<'a> StatsPanel<'a> {
    pub fn new(
        stats: Option<&'a StatsSummary>,
        activities: &'a [ActivityLine],
        theme: &'a Theme,
    ) -> Self {
        Self {
            stats,
            activities,
            theme,
        }
    }

    fn headline_lines(&self) -> Vec<Line<'_>> {
        let colors = &self.theme.colors;
        let Some(stats) = self.stats else {
            return vec![Line::from(Span::styled(
                "Loading statistics...",
                Style::default().fg(colors.accent_dim()),
            ))];
        };

        let entry = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{label:<22}"), Style::default().fg(colors.fg())),
                Span::styled(
                    value,
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        };

        vec![
            entry("Total sessions", format!("{}", stats.total_sessions)),
            entry(
                "Key accuracy",
                format!("{:.1}%", stats.key_practice_accuracy),
            ),
            entry("Treble accuracy", format!("{:.1}%", stats.treble_accuracy)),
            entry("Bass accuracy", format!("{:.1}%", stats.bass_accuracy)),
            entry(
                "Avg response",
                format!("{:.0}ms", stats.avg_response_time),
            ),
            entry(
                "Melodies generated",
                format!("{}", stats.sight_reading_generated),
            ),
            entry("PDFs exported", format!("{}", stats.pdfs_exported)),
        ]
    }

    fn activity_lines(&self) -> Vec<Line<'_>> {
        let colors = &self.theme.colors;
        if self.activities.is_empty() {
            return vec![Line::from(Span::styled(
                "No recent activity",
                Style::default().fg(colors.accent_dim()),
            ))];
        }
        self.activities
            .iter()
            .map(|a| {
                let mut spans = vec![
                    Span::styled(
                        format!("{} ", a.timestamp),
                        Style::default().fg(colors.accent_dim()),
                    ),
                    Span::styled(
                        format!("{:<13}", a.label),
                        Style::default().fg(colors.accent()),
                    ),
                ];
                if !a.detail.is_empty() {
                    spans.push(Span::styled(
                        a.detail.clone(),
                        Style::default().fg(colors.fg()),
                    ));
                }
                Line::from(spans)
            })
            .collect()
    }
}

impl Widget for StatsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(3)])
            .split(area);

        let summary = Paragraph::new(self.headline_lines()).block(
            Block::bordered()
                .title(" Summary ")
                .border_style(Style::default().fg(colors.border())),
        );
        summary.render(rows[0], buf);

        let activity = Paragraph::new(self.activity_lines()).block(
            Block::bordered()
                .title(" Recent Activity ")
                .border_style(Style::default().fg(colors.border())),
        );
        activity.render(rows[1], buf);
    }
}
