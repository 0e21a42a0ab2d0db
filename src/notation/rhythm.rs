/// Duration codes matching the notation backend's vocabulary
/// (`w`/`h`/`q`/`8`/`16`/`qd`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DurationCode {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    DottedQuarter,
}

impl DurationCode {
    pub fn code(self) -> &'static str {
        match self {
            DurationCode::Whole => "w",
            DurationCode::Half => "h",
            DurationCode::Quarter => "q",
            DurationCode::Eighth => "8",
            DurationCode::Sixteenth => "16",
            DurationCode::DottedQuarter => "qd",
        }
    }

    /// Whole and half notes draw hollow noteheads; everything shorter is
    /// filled.
    pub fn hollow(self) -> bool {
        matches!(self, DurationCode::Whole | DurationCode::Half)
    }

    /// Eighths and shorter carry a flag on the stem.
    pub fn flagged(self) -> bool {
        matches!(self, DurationCode::Eighth | DurationCode::Sixteenth)
    }
}

/// Map a symbolic rhythm name from the melody endpoint to a duration code.
/// Triplets and syncopated figures render as plain eighths; anything
/// unrecognized falls back to a quarter.
pub fn duration_from_rhythm(rhythm: &str) -> DurationCode {
    match rhythm {
        "whole" => DurationCode::Whole,
        "half" => DurationCode::Half,
        "quarter" => DurationCode::Quarter,
        "eighth" => DurationCode::Eighth,
        "sixteenth" => DurationCode::Sixteenth,
        "dotted_quarter" => DurationCode::DottedQuarter,
        "triplet" | "syncopated" => DurationCode::Eighth,
        _ => DurationCode::Quarter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_rhythms_map_to_codes() {
        assert_eq!(duration_from_rhythm("whole").code(), "w");
        assert_eq!(duration_from_rhythm("half").code(), "h");
        assert_eq!(duration_from_rhythm("quarter").code(), "q");
        assert_eq!(duration_from_rhythm("eighth").code(), "8");
        assert_eq!(duration_from_rhythm("sixteenth").code(), "16");
    }

    #[test]
    fn test_dotted_quarter_resolves_to_qd() {
        assert_eq!(duration_from_rhythm("dotted_quarter").code(), "qd");
    }

    #[test]
    fn test_triplet_and_syncopated_render_as_eighths() {
        assert_eq!(duration_from_rhythm("triplet"), DurationCode::Eighth);
        assert_eq!(duration_from_rhythm("syncopated"), DurationCode::Eighth);
    }

    #[test]
    fn test_unknown_rhythm_defaults_to_quarter() {
        assert_eq!(duration_from_rhythm("hemiola"), DurationCode::Quarter);
        assert_eq!(duration_from_rhythm(""), DurationCode::Quarter);
    }

    #[test]
    fn test_hollow_and_flagged_split() {
        assert!(DurationCode::Whole.hollow());
        assert!(DurationCode::Half.hollow());
        assert!(!DurationCode::Quarter.hollow());
        assert!(DurationCode::Eighth.flagged());
        assert!(!DurationCode::DottedQuarter.flagged());
    }
}
