use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::session::state::{SESSION_LENGTH, SessionState};
use crate::ui::theme::Theme;

/// Session progress toward the ten-question goal, labelled `n/10`.
pub struct SessionProgress<'a> {
    pub session: &'a SessionState,
    pub theme: &'a Theme,
}

impl<'a> SessionProgress<'a> {
    pub fn new(session: &'a SessionState, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

impl Widget for SessionProgress<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Session Progress ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let ratio = self.session.progress_ratio().clamp(0.0, 1.0);
        let filled_width = (ratio * inner.width as f64) as u16;
        let label = format!("{}/{}", self.session.current_progress, SESSION_LENGTH);

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}
