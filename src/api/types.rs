use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    Treble,
    Bass,
}

impl Clef {
    pub fn as_str(self) -> &'static str {
        match self {
            Clef::Treble => "treble",
            Clef::Bass => "bass",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Clef::Treble => Clef::Bass,
            Clef::Bass => Clef::Treble,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            Difficulty::Beginner => Difficulty::Intermediate,
            Difficulty::Intermediate => Difficulty::Advanced,
            Difficulty::Advanced => Difficulty::Beginner,
        }
    }
}

/// One key-identification prompt. Exactly one is active at a time; each
/// `/api/key/new` response replaces the previous prompt wholesale.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompt {
    pub note: String,
    /// `"#"`, `"b"`, or empty (the server sends an empty string for naturals).
    #[serde(default)]
    pub accidental: String,
    pub octave: i8,
    pub clef: Clef,
}

impl Prompt {
    pub fn accidental(&self) -> Option<&str> {
        if self.accidental.is_empty() {
            None
        } else {
            Some(&self.accidental)
        }
    }
}

/// Validation verdict for one submitted answer. Transient; only drives the
/// feedback display.
#[derive(Clone, Debug, Deserialize)]
pub struct AnswerResult {
    pub correct: bool,
    pub correct_answer: String,
    #[serde(default)]
    pub user_answer: Option<String>,
    #[serde(default)]
    pub response_time: Option<f64>,
    #[serde(default)]
    pub session_complete: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MelodyNote {
    pub note: String,
    pub measure: u32,
    pub rhythm: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Melody {
    pub key_signature: String,
    pub time_signature: String,
    pub clef: Clef,
    pub melody: Vec<MelodyNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// Aggregate statistics from `/api/stats`. Every field defaults so partial
/// server responses still decode.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StatsSummary {
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default)]
    pub key_practice_accuracy: f64,
    #[serde(default)]
    pub treble_accuracy: f64,
    #[serde(default)]
    pub bass_accuracy: f64,
    #[serde(default)]
    pub avg_response_time: f64,
    #[serde(default)]
    pub sight_reading_generated: u32,
    #[serde(default)]
    pub pdfs_exported: u32,
    #[serde(default)]
    pub current_session_progress: u32,
    #[serde(default)]
    pub recent_sessions: Vec<ActivityEntry>,
}

/// One row of the server's recent-activity log. The CSV-backed server sends
/// everything stringly; keep the wire shape and interpret at display time.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ActivityEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub score: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub clef: String,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub user_answer: String,
    #[serde(default)]
    pub response_time: String,
}

/// One point of the per-session trend series from `/api/graph-data`.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct GraphPoint {
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub response_time: f64,
}
