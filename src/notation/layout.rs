//! Stave layout: turns a prompt or melody into a positioned command model
//! (`StaveLayout`) that the stave widget paints. Keeping this pure lets
//! tests assert on positions and glyphs without any display surface.

use crate::api::types::{Clef, Melody, MelodyNote, Prompt};
use crate::notation::rhythm::{self, DurationCode};

/// Melody rendering never shows more than four measures, regardless of how
/// many the server generated or how wide the terminal is.
pub const MAX_MEASURES: usize = 4;

/// Melody notes arrive without an octave; the original client pins them to
/// octave 4 when building note heads.
const MELODY_OCTAVE: i8 = 4;

/// Responsive breakpoint, the terminal analogue of the original client's
/// mobile/desktop split at 768px.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidthTier {
    Compact,
    Full,
}

impl WidthTier {
    pub fn from_width(columns: u16) -> Self {
        if columns <= 76 {
            WidthTier::Compact
        } else {
            WidthTier::Full
        }
    }

    /// Left edge of the single-note stave.
    pub fn stave_x(self) -> u16 {
        match self {
            WidthTier::Compact => 5,
            WidthTier::Full => 8,
        }
    }

    /// Width of the single-note stave.
    pub fn stave_width(self) -> u16 {
        match self {
            WidthTier::Compact => 26,
            WidthTier::Full => 46,
        }
    }

    /// Per-measure width in multi-measure mode.
    pub fn measure_width(self) -> u16 {
        match self {
            WidthTier::Compact => 14,
            WidthTier::Full => 25,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StaveLayout {
    pub clef: Clef,
    pub time_signature: Option<String>,
    pub measures: Vec<MeasureLayout>,
    /// Total width in cells, for centering by the widget.
    pub width: u16,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeasureLayout {
    pub x: u16,
    pub width: u16,
    pub show_clef: bool,
    pub show_time: bool,
    pub notes: Vec<NoteLayout>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NoteLayout {
    /// Column relative to the measure's left edge.
    pub x: u16,
    /// Diatonic position relative to the stave's bottom line: 0 is the
    /// bottom line, each step is the next line or space up, 8 the top line.
    /// Values outside 0..=8 sit on ledger lines.
    pub staff_step: i8,
    pub duration: DurationCode,
    pub accidental: Option<char>,
}

/// Single-note mode: one clef-carrying measure holding one whole note.
pub fn layout_prompt(prompt: &Prompt, tier: WidthTier) -> StaveLayout {
    let width = tier.stave_width();
    let note = NoteLayout {
        x: width / 2,
        staff_step: staff_step(&prompt.note, prompt.octave, prompt.clef),
        duration: DurationCode::Whole,
        accidental: prompt.accidental().and_then(accidental_glyph),
    };

    StaveLayout {
        clef: prompt.clef,
        time_signature: None,
        measures: vec![MeasureLayout {
            x: tier.stave_x(),
            width,
            show_clef: true,
            show_time: false,
            notes: vec![note],
        }],
        width: tier.stave_x() + width,
    }
}

/// Multi-measure mode: bucket melody entries by measure index (order of
/// first appearance), cap at [`MAX_MEASURES`], clef and time signature on
/// the first measure only.
pub fn layout_melody(melody: &Melody, tier: WidthTier) -> StaveLayout {
    let measure_width = tier.measure_width();
    let mut buckets: Vec<(u32, Vec<&MelodyNote>)> = Vec::new();
    for entry in &melody.melody {
        match buckets.iter_mut().find(|(idx, _)| *idx == entry.measure) {
            Some((_, notes)) => notes.push(entry),
            None => buckets.push((entry.measure, vec![entry])),
        }
    }
    buckets.truncate(MAX_MEASURES);

    let mut measures = Vec::with_capacity(buckets.len());
    let mut x = tier.stave_x();
    for (index, (_, entries)) in buckets.iter().enumerate() {
        let first = index == 0;
        // Leave room for the clef and time signature in the first measure.
        let lead: u16 = if first { 6 } else { 2 };
        let usable = measure_width.saturating_sub(lead + 1).max(1);
        let spacing = (usable / entries.len().max(1) as u16).max(1);

        let notes = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| NoteLayout {
                x: lead + i as u16 * spacing,
                staff_step: staff_step(&entry.note, MELODY_OCTAVE, melody.clef),
                duration: rhythm::duration_from_rhythm(&entry.rhythm),
                accidental: accidental_suffix(&entry.note),
            })
            .collect();

        measures.push(MeasureLayout {
            x,
            width: measure_width,
            show_clef: first,
            show_time: first,
            notes,
        });
        x += measure_width;
    }

    StaveLayout {
        clef: melody.clef,
        time_signature: Some(melody.time_signature.clone()),
        measures,
        width: x,
    }
}

/// Diatonic staff position of a note relative to the clef's bottom line
/// (treble: E4, bass: G2). Malformed note names clamp to the bottom line
/// rather than erroring; the caller owns validation.
pub fn staff_step(note: &str, octave: i8, clef: Clef) -> i8 {
    let letter_index = match note.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('C') => 0,
        Some('D') => 1,
        Some('E') => 2,
        Some('F') => 3,
        Some('G') => 4,
        Some('A') => 5,
        Some('B') => 6,
        _ => return 0,
    };
    let absolute = octave as i16 * 7 + letter_index;
    let bottom_line: i16 = match clef {
        Clef::Treble => 4 * 7 + 2, // E4
        Clef::Bass => 2 * 7 + 4,   // G2
    };
    (absolute - bottom_line).clamp(-12, 20) as i8
}

fn accidental_glyph(accidental: &str) -> Option<char> {
    match accidental {
        "#" => Some('♯'),
        "b" => Some('♭'),
        _ => None,
    }
}

/// Melody notes carry the accidental inside the note name ("F#", "Bb").
fn accidental_suffix(note: &str) -> Option<char> {
    accidental_glyph(note.get(1..2).unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn melody_with(entries: &[(&str, u32, &str)]) -> Melody {
        Melody {
            key_signature: "C".to_string(),
            time_signature: "4/4".to_string(),
            clef: Clef::Treble,
            melody: entries
                .iter()
                .map(|(note, measure, rhythm)| MelodyNote {
                    note: note.to_string(),
                    measure: *measure,
                    rhythm: rhythm.to_string(),
                })
                .collect(),
            difficulty: None,
        }
    }

    fn prompt(note: &str, accidental: &str, octave: i8, clef: Clef) -> Prompt {
        serde_json::from_str(&format!(
            r#"{{"note":"{note}","accidental":"{accidental}","octave":{octave},"clef":"{}"}}"#,
            clef.as_str()
        ))
        .unwrap()
    }

    #[test]
    fn test_staff_steps_on_the_treble_stave() {
        assert_eq!(staff_step("E", 4, Clef::Treble), 0); // bottom line
        assert_eq!(staff_step("B", 4, Clef::Treble), 4); // middle line
        assert_eq!(staff_step("F", 5, Clef::Treble), 8); // top line
        assert_eq!(staff_step("C", 4, Clef::Treble), -2); // ledger below
    }

    #[test]
    fn test_staff_steps_on_the_bass_stave() {
        assert_eq!(staff_step("G", 2, Clef::Bass), 0);
        assert_eq!(staff_step("D", 3, Clef::Bass), 4);
        assert_eq!(staff_step("A", 3, Clef::Bass), 8);
    }

    #[test]
    fn test_malformed_note_clamps_to_bottom_line() {
        assert_eq!(staff_step("?", 4, Clef::Treble), 0);
        assert_eq!(staff_step("", 4, Clef::Treble), 0);
    }

    #[test]
    fn test_prompt_layout_is_one_clef_measure_with_one_whole_note() {
        let layout = layout_prompt(&prompt("G", "#", 4, Clef::Treble), WidthTier::Full);
        assert_eq!(layout.measures.len(), 1);
        let measure = &layout.measures[0];
        assert!(measure.show_clef);
        assert!(!measure.show_time);
        assert_eq!(layout.time_signature, None);
        assert_eq!(measure.notes.len(), 1);
        assert_eq!(measure.notes[0].duration, DurationCode::Whole);
        assert_eq!(measure.notes[0].accidental, Some('♯'));
    }

    #[test]
    fn test_prompt_layout_respects_width_tier() {
        let compact = layout_prompt(&prompt("C", "", 4, Clef::Treble), WidthTier::Compact);
        let full = layout_prompt(&prompt("C", "", 4, Clef::Treble), WidthTier::Full);
        assert!(compact.measures[0].width < full.measures[0].width);
        assert!(compact.width < full.width);
    }

    #[test]
    fn test_melody_buckets_by_measure_with_sparse_indices() {
        // Measures {0: [n1, n2], 2: [n3]} draws exactly two measures; the
        // first carries clef + time signature, the second neither.
        let melody = melody_with(&[("C", 0, "quarter"), ("D", 0, "quarter"), ("E", 2, "half")]);
        let layout = layout_melody(&melody, WidthTier::Full);
        assert_eq!(layout.measures.len(), 2);
        assert!(layout.measures[0].show_clef && layout.measures[0].show_time);
        assert!(!layout.measures[1].show_clef && !layout.measures[1].show_time);
        assert_eq!(layout.measures[0].notes.len(), 2);
        assert_eq!(layout.measures[1].notes.len(), 1);
    }

    #[test]
    fn test_melody_measure_order_is_first_appearance() {
        let melody = melody_with(&[("C", 3, "quarter"), ("D", 1, "quarter"), ("E", 3, "quarter")]);
        let layout = layout_melody(&melody, WidthTier::Full);
        assert_eq!(layout.measures.len(), 2);
        // Measure 3 appeared first, so it renders first (and takes the clef).
        assert_eq!(layout.measures[0].notes.len(), 2);
        assert_eq!(layout.measures[1].notes.len(), 1);
        assert!(layout.measures[0].x < layout.measures[1].x);
    }

    #[test]
    fn test_melody_render_cap_is_four_measures() {
        let entries: Vec<(&str, u32, &str)> =
            (0..8).map(|m| ("C", m, "quarter")).collect();
        let layout = layout_melody(&melody_with(&entries), WidthTier::Full);
        assert_eq!(layout.measures.len(), MAX_MEASURES);
        let layout_compact = layout_melody(&melody_with(&entries), WidthTier::Compact);
        assert_eq!(layout_compact.measures.len(), MAX_MEASURES);
    }

    #[test]
    fn test_melody_measures_lay_out_left_to_right_fixed_width() {
        let melody = melody_with(&[("C", 0, "quarter"), ("D", 1, "quarter")]);
        let layout = layout_melody(&melody, WidthTier::Full);
        let width = WidthTier::Full.measure_width();
        assert_eq!(layout.measures[0].width, width);
        assert_eq!(layout.measures[1].x, layout.measures[0].x + width);
    }

    #[test]
    fn test_melody_accidental_comes_from_note_suffix() {
        let melody = melody_with(&[("F#", 0, "quarter"), ("Bb", 0, "quarter")]);
        let layout = layout_melody(&melody, WidthTier::Full);
        assert_eq!(layout.measures[0].notes[0].accidental, Some('♯'));
        assert_eq!(layout.measures[0].notes[1].accidental, Some('♭'));
    }

    #[test]
    fn test_melody_rhythms_flow_through_the_duration_table() {
        let melody = melody_with(&[("C", 0, "dotted_quarter"), ("D", 0, "mystery")]);
        let layout = layout_melody(&melody, WidthTier::Full);
        assert_eq!(layout.measures[0].notes[0].duration, DurationCode::DottedQuarter);
        assert_eq!(layout.measures[0].notes[1].duration, DurationCode::Quarter);
    }
}
