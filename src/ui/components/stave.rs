use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

use crate::api::types::Clef;
use crate::notation::layout::{MeasureLayout, NoteLayout, StaveLayout};
use crate::ui::theme::Theme;

/// Highest staff step the widget can paint (ledger space above the stave).
const TOP_STEP: i8 = 12;
/// Lowest staff step the widget can paint.
const BOTTOM_STEP: i8 = -4;

/// Rows needed to paint a full stave with ledger space on both sides.
pub const STAVE_HEIGHT: u16 = (TOP_STEP - BOTTOM_STEP) as u16 + 1;

/// Paints a positioned [`StaveLayout`]: five lines, clef, time signature,
/// barlines, noteheads with stems and accidentals. One row per staff step,
/// so lines land on even steps and spaces on odd ones.
pub struct Stave<'a> {
    pub layout: &'a StaveLayout,
    pub dimmed: bool,
    pub theme: &'a Theme,
}

impl<'a> Stave<'a> {
    pub fn new(layout: &'a StaveLayout, dimmed: bool, theme: &'a Theme) -> Self {
        Self {
            layout,
            dimmed,
            theme,
        }
    }

    fn stave_color(&self) -> Color {
        if self.dimmed {
            self.theme.colors.accent_dim()
        } else {
            self.theme.colors.stave()
        }
    }

    fn note_color(&self) -> Color {
        if self.dimmed {
            self.theme.colors.accent_dim()
        } else {
            self.theme.colors.note()
        }
    }
}

fn step_row(area: Rect, step: i8) -> Option<u16> {
    let offset = TOP_STEP - step.clamp(BOTTOM_STEP, TOP_STEP);
    let y = area.y + offset as u16;
    if y < area.y + area.height { Some(y) } else { None }
}

fn put(buf: &mut Buffer, area: Rect, x: u16, y: u16, ch: char, color: Color) {
    if x >= area.x + area.width || y >= area.y + area.height {
        return;
    }
    buf[(x, y)].set_char(ch).set_style(Style::default().fg(color));
}

impl Widget for Stave<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height < STAVE_HEIGHT {
            return;
        }
        let stave_color = self.stave_color();
        let note_color = self.note_color();

        let left = self.layout.measures.first().map(|m| area.x + m.x);
        let right = self
            .layout
            .measures
            .last()
            .map(|m| area.x + m.x + m.width);
        let (Some(left), Some(right)) = (left, right) else {
            return;
        };

        // Five stave lines on even steps 0..=8.
        for step in [0i8, 2, 4, 6, 8] {
            if let Some(y) = step_row(area, step) {
                for x in left..right.min(area.x + area.width) {
                    put(buf, area, x, y, '─', stave_color);
                }
            }
        }

        for measure in &self.layout.measures {
            self.render_measure(measure, area, buf, stave_color, note_color);
        }

        // Closing barline.
        if let (Some(top), Some(bottom)) = (step_row(area, 8), step_row(area, 0)) {
            let x = right.saturating_sub(1);
            for y in top..=bottom {
                put(buf, area, x, y, '│', stave_color);
            }
        }
    }
}

impl Stave<'_> {
    fn render_measure(
        &self,
        measure: &MeasureLayout,
        area: Rect,
        buf: &mut Buffer,
        stave_color: Color,
        note_color: Color,
    ) {
        let base_x = area.x + measure.x;

        // Opening barline.
        if let (Some(top), Some(bottom)) = (step_row(area, 8), step_row(area, 0)) {
            for y in top..=bottom {
                put(buf, area, base_x, y, '│', stave_color);
            }
        }

        if measure.show_clef {
            let glyph = match self.layout.clef {
                Clef::Treble => '𝄞',
                Clef::Bass => '𝄢',
            };
            if let Some(y) = step_row(area, 4) {
                put(buf, area, base_x + 1, y, glyph, stave_color);
            }
        }

        if measure.show_time
            && let Some(signature) = &self.layout.time_signature
            && let Some((numerator, denominator)) = signature.split_once('/')
        {
            // Stacked digits either side of the middle line.
            if let Some(y) = step_row(area, 6)
                && let Some(c) = numerator.chars().next()
            {
                put(buf, area, base_x + 3, y, c, stave_color);
            }
            if let Some(y) = step_row(area, 2)
                && let Some(c) = denominator.chars().next()
            {
                put(buf, area, base_x + 3, y, c, stave_color);
            }
        }

        for note in &measure.notes {
            self.render_note(note, base_x, area, buf, stave_color, note_color);
        }
    }

    fn render_note(
        &self,
        note: &NoteLayout,
        base_x: u16,
        area: Rect,
        buf: &mut Buffer,
        stave_color: Color,
        note_color: Color,
    ) {
        let x = base_x + note.x;
        let Some(y) = step_row(area, note.staff_step) else {
            return;
        };

        // Ledger lines for notes off the stave, on line steps only.
        if !(0..=8).contains(&note.staff_step) && note.staff_step % 2 == 0 {
            for lx in x.saturating_sub(1)..=x + 1 {
                put(buf, area, lx, y, '─', stave_color);
            }
        }

        let head = if note.duration.hollow() { '○' } else { '●' };
        put(buf, area, x, y, head, note_color);

        if let Some(accidental) = note.accidental {
            put(buf, area, x.saturating_sub(1), y, accidental, note_color);
        }

        if note.duration.code() == "qd" {
            put(buf, area, x + 1, y, '·', note_color);
        }

        // Stem and flag; whole notes have neither.
        if note.duration.code() != "w" {
            for dy in 1..=2u16 {
                if y >= area.y + dy {
                    put(buf, area, x, y - dy, '│', note_color);
                }
            }
            if note.duration.flagged() && y >= area.y + 2 {
                put(buf, area, x + 1, y - 2, '╮', note_color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Melody, MelodyNote, Prompt};
    use crate::notation::layout::{self, WidthTier};

    fn prompt(note: &str, accidental: &str, octave: i8, clef: &str) -> Prompt {
        serde_json::from_str(&format!(
            r#"{{"note":"{note}","accidental":"{accidental}","octave":{octave},"clef":"{clef}"}}"#
        ))
        .unwrap()
    }

    fn render(layout: &StaveLayout, dimmed: bool) -> Buffer {
        let area = Rect::new(0, 0, 120, STAVE_HEIGHT);
        let mut buf = Buffer::empty(area);
        let theme = Theme::default();
        Stave::new(layout, dimmed, &theme).render(area, &mut buf);
        buf
    }

    fn row_string(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    #[test]
    fn test_five_lines_and_clef() {
        let stave = layout::layout_prompt(&prompt("E", "", 4, "treble"), WidthTier::Full);
        let buf = render(&stave, false);

        // Lines land on even steps: rows 4, 6, 8, 10, 12 for steps 8..0.
        for y in [4u16, 6, 8, 10, 12] {
            assert!(row_string(&buf, y).contains('─'), "line row {y}");
        }
        // Spaces between them carry no line (barlines aside).
        assert!(!row_string(&buf, 5).contains('─'));
        assert!(row_string(&buf, 8).contains('𝄞'));
    }

    #[test]
    fn test_whole_note_is_hollow_and_stemless() {
        let stave = layout::layout_prompt(&prompt("E", "", 4, "treble"), WidthTier::Full);
        let buf = render(&stave, false);

        // E4 on treble is the bottom line, step 0 → row 12.
        assert!(row_string(&buf, 12).contains('○'));
        let note_x = stave.measures[0].x + stave.measures[0].notes[0].x;
        assert_ne!(buf[(note_x, 11)].symbol(), "│", "whole notes are stemless");
    }

    #[test]
    fn test_accidental_sits_left_of_the_notehead() {
        let stave = layout::layout_prompt(&prompt("F", "#", 5, "treble"), WidthTier::Full);
        let buf = render(&stave, false);
        let note_x = stave.measures[0].x + stave.measures[0].notes[0].x;
        // F5 is the top line, step 8 → row 4.
        assert_eq!(buf[(note_x, 4)].symbol(), "●");
        assert_eq!(buf[(note_x - 1, 4)].symbol(), "♯");
    }

    #[test]
    fn test_ledger_line_below_the_stave() {
        let stave = layout::layout_prompt(&prompt("C", "", 4, "treble"), WidthTier::Full);
        let buf = render(&stave, false);
        // C4 on treble is step -2 → row 14, a ledger line row.
        assert!(row_string(&buf, 14).contains('─'));
    }

    #[test]
    fn test_melody_draws_time_signature_once() {
        let melody = Melody {
            key_signature: "C".to_string(),
            time_signature: "3/4".to_string(),
            clef: crate::api::types::Clef::Treble,
            melody: vec![
                MelodyNote {
                    note: "C".to_string(),
                    measure: 0,
                    rhythm: "quarter".to_string(),
                },
                MelodyNote {
                    note: "D".to_string(),
                    measure: 1,
                    rhythm: "half".to_string(),
                },
            ],
            difficulty: None,
        };
        let stave = layout::layout_melody(&melody, WidthTier::Full);
        let buf = render(&stave, false);

        let first_x = stave.measures[0].x;
        assert_eq!(buf[(first_x + 3, 6)].symbol(), "3");
        assert_eq!(buf[(first_x + 3, 10)].symbol(), "4");
        let second_x = stave.measures[1].x;
        assert_ne!(buf[(second_x + 3, 6)].symbol(), "3");
    }

    #[test]
    fn test_dimmed_render_uses_dim_color() {
        let stave = layout::layout_prompt(&prompt("E", "", 4, "treble"), WidthTier::Full);
        let theme = Theme::default();
        let area = Rect::new(0, 0, 120, STAVE_HEIGHT);
        let mut buf = Buffer::empty(area);
        Stave::new(&stave, true, &theme).render(area, &mut buf);

        let note_x = stave.measures[0].x + stave.measures[0].notes[0].x;
        assert_eq!(
            buf[(note_x, 12)].style().fg,
            Some(theme.colors.accent_dim())
        );
    }
}
