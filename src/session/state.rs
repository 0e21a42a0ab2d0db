/// A key-practice session ends once the server has counted this many
/// answered questions.
pub const SESSION_LENGTH: u32 = 10;

/// Running counters for the current practice session. Owned by the app and
/// mutated only by the key-practice flow; `current_progress` mirrors the
/// server's count and is never computed locally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub score: u32,
    pub total_attempts: u32,
    pub current_progress: u32,
}

impl SessionState {
    pub fn record(&mut self, correct: bool) {
        self.total_attempts += 1;
        if correct {
            self.score += 1;
        }
    }

    /// Displayed accuracy: `round(score / total × 100)`, 0 with no attempts.
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_attempts == 0 {
            0
        } else {
            (self.score as f64 / self.total_attempts as f64 * 100.0).round() as u32
        }
    }

    pub fn set_progress(&mut self, progress: u32) {
        self.current_progress = progress.min(SESSION_LENGTH);
    }

    pub fn progress_ratio(&self) -> f64 {
        self.current_progress as f64 / SESSION_LENGTH as f64
    }

    pub fn is_complete(&self) -> bool {
        self.current_progress >= SESSION_LENGTH
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_never_exceeds_attempts() {
        let mut state = SessionState::default();
        for (i, correct) in [true, false, true, true, false].iter().enumerate() {
            state.record(*correct);
            assert!(state.score <= state.total_attempts);
            assert_eq!(state.total_attempts, i as u32 + 1);
        }
        assert_eq!(state.score, 3);
    }

    #[test]
    fn test_accuracy_is_zero_without_attempts() {
        assert_eq!(SessionState::default().accuracy_percent(), 0);
    }

    #[test]
    fn test_accuracy_rounds_to_nearest_percent() {
        let mut state = SessionState::default();
        state.record(true);
        state.record(false);
        state.record(false);
        assert_eq!(state.accuracy_percent(), 33);

        state.record(true);
        assert_eq!(state.accuracy_percent(), 50);

        let mut two_thirds = SessionState::default();
        two_thirds.record(true);
        two_thirds.record(true);
        two_thirds.record(false);
        assert_eq!(two_thirds.accuracy_percent(), 67);
    }

    #[test]
    fn test_progress_is_capped_at_session_length() {
        let mut state = SessionState::default();
        state.set_progress(14);
        assert_eq!(state.current_progress, SESSION_LENGTH);
        assert!(state.is_complete());
        assert_eq!(state.progress_ratio(), 1.0);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut state = SessionState::default();
        state.record(true);
        state.set_progress(7);
        state.reset();
        assert_eq!(state, SessionState::default());
    }
}
