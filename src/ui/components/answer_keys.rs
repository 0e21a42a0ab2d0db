use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::key_practice::ANSWER_KEYS;
use crate::ui::theme::Theme;

/// The seven note-name answer controls. At most one carries a
/// correct/incorrect marking, set from the last answer's verdict and
/// cleared when the next prompt arrives.
pub struct AnswerKeys<'a> {
    pub marked: Option<(char, bool)>,
    pub enabled: bool,
    pub theme: &'a Theme,
}

impl<'a> AnswerKeys<'a> {
    pub fn new(marked: Option<(char, bool)>, enabled: bool, theme: &'a Theme) -> Self {
        Self {
            marked,
            enabled,
            theme,
        }
    }
}

impl Widget for AnswerKeys<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                ANSWER_KEYS
                    .iter()
                    .map(|_| Constraint::Ratio(1, ANSWER_KEYS.len() as u32))
                    .collect::<Vec<_>>(),
            )
            .split(area);

        for (i, key) in ANSWER_KEYS.iter().enumerate() {
            let (fg, bold) = match self.marked {
                Some((marked, true)) if marked == *key => (colors.correct(), true),
                Some((marked, false)) if marked == *key => (colors.incorrect(), true),
                _ if self.enabled => (colors.fg(), false),
                _ => (colors.accent_dim(), false),
            };

            let mut style = Style::default().fg(fg);
            if bold {
                style = style.add_modifier(Modifier::BOLD);
            }

            let block = Block::bordered().border_style(Style::default().fg(colors.border()));
            let inner = block.inner(cells[i]);
            block.render(cells[i], buf);
            Paragraph::new(Line::from(Span::styled(key.to_string(), style)))
                .centered()
                .render(inner, buf);
        }
    }
}
