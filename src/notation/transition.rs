use std::time::{Duration, Instant};

use crate::notation::layout::StaveLayout;

/// Fade delay before a single-note render replaces the previous one.
pub const SINGLE_NOTE_FADE: Duration = Duration::from_millis(100);
/// Fade delay before a multi-measure render replaces the previous one.
pub const MELODY_FADE: Duration = Duration::from_millis(150);

/// One stave container. Replacing content dims the slot, waits out the full
/// fade delay, then swaps the pending layout in — the terminal analogue of
/// the original fade-out/clear/redraw transition. A newer pending layout
/// replaces an older pending one wholesale, so successive renders for the
/// same container never interleave.
#[derive(Default)]
pub struct StaveSlot {
    current: Option<StaveLayout>,
    pending: Option<(StaveLayout, Instant)>,
}

impl StaveSlot {
    pub fn replace(&mut self, layout: StaveLayout, fade: Duration, now: Instant) {
        self.pending = Some((layout, now + fade));
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some((_, swap_at)) = &self.pending
            && now >= *swap_at
            && let Some((layout, _)) = self.pending.take()
        {
            self.current = Some(layout);
        }
    }

    pub fn layout(&self) -> Option<&StaveLayout> {
        self.current.as_ref()
    }

    /// True while a pending layout is waiting out its fade delay.
    pub fn dimmed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.pending = None;
    }
}
