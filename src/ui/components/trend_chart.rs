use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::Line;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Widget};

use crate::api::types::GraphPoint;
use crate::ui::theme::Theme;

/// Off-screen render size for chart snapshots saved to disk.
const SNAPSHOT_WIDTH: u16 = 120;
const SNAPSHOT_HEIGHT: u16 = 36;

/// Per-session accuracy and response-time trend. Both series share the
/// 0–100 vertical scale: accuracy natively, response time normalized into
/// it with its real range named in the title.
pub struct TrendChart<'a> {
    pub points: &'a [GraphPoint],
    pub theme: &'a Theme,
}

impl<'a> TrendChart<'a> {
    pub fn new(points: &'a [GraphPoint], theme: &'a Theme) -> Self {
        Self { points, theme }
    }

    /// Render into an off-screen buffer and return the rows as text, for
    /// saving a chart snapshot alongside the PDF exports.
    pub fn snapshot_lines(points: &[GraphPoint], theme: &Theme) -> Vec<String> {
        let area = Rect::new(0, 0, SNAPSHOT_WIDTH, SNAPSHOT_HEIGHT);
        let mut buf = Buffer::empty(area);
        TrendChart::new(points, theme).render(area, &mut buf);

        (0..area.height)
            .map(|y| {
                let row: String = (0..area.width)
                    .map(|x| buf[(x, y)].symbol().chars().next().unwrap_or(' '))
                    .collect();
                row.trim_end().to_string()
            })
            .collect()
    }

    fn response_range(&self) -> (f64, f64) {
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for p in self.points {
            min = min.min(p.response_time);
            max = max.max(p.response_time);
        }
        if min > max { (0.0, 0.0) } else { (min, max) }
    }
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        if self.points.is_empty() {
            let block = Block::bordered()
                .title(" Practice Trend ")
                .border_style(Style::default().fg(colors.border()));
            let inner = block.inner(area);
            block.render(area, buf);
            if inner.height > 0 {
                buf.set_string(
                    inner.x + 2,
                    inner.y + inner.height / 2,
                    "No sessions recorded yet",
                    Style::default().fg(colors.accent_dim()),
                );
            }
            return;
        }

        let (rt_min, rt_max) = self.response_range();
        let rt_span = (rt_max - rt_min).max(f64::EPSILON);

        let accuracy: Vec<(f64, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64 + 1.0, p.accuracy.clamp(0.0, 100.0)))
            .collect();
        let response: Vec<(f64, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64 + 1.0, (p.response_time - rt_min) / rt_span * 100.0))
            .collect();

        let datasets = vec![
            Dataset::default()
                .name("Accuracy %")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors.chart_accuracy()))
                .data(&accuracy),
            Dataset::default()
                .name(format!("Response {:.0}–{:.0}ms", rt_min, rt_max))
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors.chart_response()))
                .data(&response),
        ];

        let max_x = self.points.len().max(2) as f64;
        let chart = Chart::new(datasets)
            .block(
                Block::bordered()
                    .title(" Practice Trend ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .x_axis(
                Axis::default()
                    .title("Session")
                    .style(Style::default().fg(colors.accent_dim()))
                    .bounds([1.0, max_x])
                    .labels(vec![
                        Line::from("1"),
                        Line::from(format!("{}", self.points.len())),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(colors.accent_dim()))
                    .bounds([0.0, 100.0])
                    .labels(vec![Line::from("0"), Line::from("50"), Line::from("100")]),
            );

        chart.render(area, buf);
    }
}
