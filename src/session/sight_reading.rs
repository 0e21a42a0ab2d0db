use std::path::PathBuf;
use std::time::Instant;

use crate::api::fetch::{ApiRequest, ApiResponse};
use crate::api::types::{Clef, Difficulty, Melody};
use crate::notation::layout::{self, WidthTier};
use crate::notation::transition::{MELODY_FADE, StaveSlot};
use crate::store::downloads::Downloads;

/// Melody generation and export. Stateless between invocations apart from
/// the last generated melody, which is held for rendering and export.
pub struct SightReadingController {
    pub melody: Option<Melody>,
    pub stave: StaveSlot,
    pub difficulty: Difficulty,
    pub clef: Clef,
    pub export_enabled: bool,
    pub last_saved: Option<PathBuf>,
    pub last_error: Option<String>,
    generation: u64,
}

impl SightReadingController {
    pub fn new(difficulty: Difficulty, clef: Clef) -> Self {
        Self {
            melody: None,
            stave: StaveSlot::default(),
            difficulty,
            clef,
            export_enabled: false,
            last_saved: None,
            last_error: None,
            generation: 0,
        }
    }

    pub fn cycle_difficulty(&mut self) {
        self.difficulty = self.difficulty.cycled();
    }

    pub fn cycle_clef(&mut self) {
        self.clef = self.clef.toggled();
    }

    /// Request a melody with the currently selected parameters.
    pub fn generate(&mut self) -> ApiRequest {
        self.generation += 1;
        ApiRequest::GenerateMelody {
            generation: self.generation,
            difficulty: self.difficulty,
            clef: self.clef,
        }
    }

    /// Submit the stored melody for PDF export. No-op without one.
    pub fn export(&mut self) -> Option<ApiRequest> {
        let melody = self.melody.clone()?;
        self.generation += 1;
        Some(ApiRequest::ExportMelody {
            generation: self.generation,
            melody,
        })
    }

    pub fn tick(&mut self, now: Instant) {
        self.stave.tick(now);
    }

    pub fn on_response(
        &mut self,
        response: &ApiResponse,
        downloads: Option<&Downloads>,
        tier: WidthTier,
        now: Instant,
    ) {
        match response {
            ApiResponse::Melody { generation, result } => {
                if *generation != self.generation {
                    return;
                }
                match result {
                    Ok(melody) => {
                        self.stave
                            .replace(layout::layout_melody(melody, tier), MELODY_FADE, now);
                        self.melody = Some(melody.clone());
                        self.export_enabled = true;
                    }
                    Err(err) => self.last_error = Some(err.to_string()),
                }
            }
            ApiResponse::Export { generation, result } => {
                if *generation != self.generation {
                    return;
                }
                match (result, downloads) {
                    (Ok(bytes), Some(downloads)) => match downloads.save_pdf(bytes) {
                        Ok(path) => self.last_saved = Some(path),
                        Err(err) => self.last_error = Some(err.to_string()),
                    },
                    (Ok(_), None) => {
                        self.last_error = Some("download directory unavailable".to_string());
                    }
                    (Err(err), _) => self.last_error = Some(err.to_string()),
                }
            }
            _ => {}
        }
    }
}
