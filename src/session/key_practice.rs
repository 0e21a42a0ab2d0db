use std::time::{Duration, Instant};

use crate::api::fetch::{ApiRequest, ApiResponse};
use crate::api::types::{AnswerResult, Prompt};
use crate::notation::layout::{self, WidthTier};
use crate::notation::transition::{SINGLE_NOTE_FADE, StaveSlot};
use crate::session::state::SessionState;

/// The seven labelled answer controls, and the only letters accepted from
/// the keyboard (case-insensitive).
pub const ANSWER_KEYS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];

/// Fixed pause after feedback before the next prompt is requested without
/// user action. Not configurable and not cancellable.
pub const AUTO_ADVANCE: Duration = Duration::from_millis(2000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PracticeState {
    Idle,
    AwaitingAnswer,
    Feedback,
}

#[derive(Clone, Debug)]
pub struct Feedback {
    pub correct: bool,
    pub message: String,
    pub details: String,
}

/// One drill loop over a single stave container:
/// `Idle → AwaitingAnswer → Feedback → (auto-advance) → AwaitingAnswer`.
///
/// Every outgoing request is stamped with `generation`; responses carrying
/// an older stamp are dropped, so a manual "new key" racing the
/// auto-advance can double-request but only the newest prompt is applied.
pub struct KeyPracticeController {
    pub state: PracticeState,
    pub prompt: Option<Prompt>,
    pub feedback: Option<Feedback>,
    /// Last chosen control and whether it was correct, for button marking.
    pub marked: Option<(char, bool)>,
    pub stave: StaveSlot,
    pub session_complete: bool,
    pub last_error: Option<String>,
    generation: u64,
    submitted: Option<char>,
    advance_at: Option<Instant>,
}

impl KeyPracticeController {
    pub fn new() -> Self {
        Self {
            state: PracticeState::Idle,
            prompt: None,
            feedback: None,
            marked: None,
            stave: StaveSlot::default(),
            session_complete: false,
            last_error: None,
            generation: 0,
            submitted: None,
            advance_at: None,
        }
    }

    /// Ask for a new prompt. Always issues exactly one request and bumps
    /// the generation so any response still in flight becomes stale.
    pub fn request_prompt(&mut self) -> ApiRequest {
        self.generation += 1;
        ApiRequest::NewKey {
            generation: self.generation,
        }
    }

    /// Submit an answer for the active prompt. Input is ignored when no
    /// prompt is active, outside the seven pitch letters, or while the
    /// session-complete summary is up.
    pub fn answer(&mut self, key: char) -> Option<ApiRequest> {
        let key = key.to_ascii_uppercase();
        if !ANSWER_KEYS.contains(&key) || self.prompt.is_none() || self.session_complete {
            return None;
        }
        self.generation += 1;
        self.submitted = Some(key);
        Some(ApiRequest::CheckKey {
            generation: self.generation,
            answer: key,
        })
    }

    pub fn on_prompt(
        &mut self,
        generation: u64,
        result: Result<Prompt, impl std::fmt::Display>,
        tier: WidthTier,
        now: Instant,
    ) {
        if generation != self.generation {
            return;
        }
        match result {
            Ok(prompt) => {
                // Clear previous feedback and button marking before the
                // new prompt appears.
                self.feedback = None;
                self.marked = None;
                self.submitted = None;
                self.stave
                    .replace(layout::layout_prompt(&prompt, tier), SINGLE_NOTE_FADE, now);
                self.prompt = Some(prompt);
                self.state = PracticeState::AwaitingAnswer;
            }
            Err(err) => {
                // No retry: the drill stalls until the user asks again.
                self.last_error = Some(err.to_string());
            }
        }
    }

    /// Apply a validation verdict. Returns true when the caller should
    /// refresh server statistics (the session-complete signal comes from
    /// there, never from local counters).
    pub fn on_answer(
        &mut self,
        generation: u64,
        result: Result<AnswerResult, impl std::fmt::Display>,
        session: &mut SessionState,
        now: Instant,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return false;
            }
        };

        session.record(result.correct);
        self.marked = self.submitted.take().map(|key| (key, result.correct));
        self.feedback = Some(build_feedback(&result));
        self.state = PracticeState::Feedback;
        self.advance_at = Some(now + AUTO_ADVANCE);
        true
    }

    /// Advance deadlines. Returns the auto-advance prompt request when the
    /// 2-second pause has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<ApiRequest> {
        self.stave.tick(now);
        if let Some(advance_at) = self.advance_at
            && now >= advance_at
        {
            self.advance_at = None;
            if !self.session_complete {
                return Some(self.request_prompt());
            }
        }
        None
    }

    /// Called when server statistics report the session progress cap: show
    /// the summary and stop the drill loop.
    pub fn complete_session(&mut self) {
        self.session_complete = true;
        self.advance_at = None;
    }

    /// Start a fresh session: zero the counters and request exactly one
    /// new prompt.
    pub fn reset(&mut self, session: &mut SessionState) -> ApiRequest {
        session.reset();
        self.session_complete = false;
        self.feedback = None;
        self.marked = None;
        self.submitted = None;
        self.advance_at = None;
        self.request_prompt()
    }

    /// Route a fetch response into this controller. Answer verdicts report
    /// back whether a stats refresh is wanted.
    pub fn on_response(
        &mut self,
        response: &ApiResponse,
        session: &mut SessionState,
        tier: WidthTier,
        now: Instant,
    ) -> bool {
        match response {
            ApiResponse::Prompt { generation, result } => {
                self.on_prompt(
                    *generation,
                    result.as_ref().map(|p| p.clone()).map_err(|e| e.to_string()),
                    tier,
                    now,
                );
                false
            }
            ApiResponse::Answer { generation, result } => self.on_answer(
                *generation,
                result.as_ref().map(|r| r.clone()).map_err(|e| e.to_string()),
                session,
                now,
            ),
            _ => false,
        }
    }
}

fn build_feedback(result: &AnswerResult) -> Feedback {
    if result.correct {
        Feedback {
            correct: true,
            message: "Correct!".to_string(),
            details: format!("You got {} right!", result.correct_answer),
        }
    } else {
        let user = result.user_answer.as_deref().unwrap_or("?");
        Feedback {
            correct: false,
            message: "Incorrect".to_string(),
            details: format!(
                "The correct answer was {}, you answered {}",
                result.correct_answer, user
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Clef;

    fn prompt(note: &str, clef: Clef) -> Prompt {
        serde_json::from_str(&format!(
            r#"{{"note":"{note}","accidental":"","octave":4,"clef":"{}"}}"#,
            clef.as_str()
        ))
        .unwrap()
    }

    fn verdict(correct: bool, correct_answer: &str, user: &str) -> AnswerResult {
        AnswerResult {
            correct,
            correct_answer: correct_answer.to_string(),
            user_answer: Some(user.to_string()),
            response_time: Some(640.0),
            session_complete: false,
        }
    }

    fn generation_of(request: &ApiRequest) -> u64 {
        match request {
            ApiRequest::NewKey { generation } => *generation,
            ApiRequest::CheckKey { generation, .. } => *generation,
            _ => panic!("unexpected request kind"),
        }
    }

    #[test]
    fn test_answer_ignored_without_active_prompt() {
        let mut ctrl = KeyPracticeController::new();
        assert!(ctrl.answer('c').is_none());
        assert_eq!(ctrl.state, PracticeState::Idle);
    }

    #[test]
    fn test_answer_restricted_to_pitch_letters() {
        let now = Instant::now();
        let mut ctrl = KeyPracticeController::new();
        let req = ctrl.request_prompt();
        ctrl.on_prompt(
            generation_of(&req),
            Ok::<_, String>(prompt("D", Clef::Treble)),
            WidthTier::Full,
            now,
        );
        assert!(ctrl.answer('h').is_none());
        assert!(ctrl.answer('1').is_none());
        assert!(ctrl.answer('d').is_some(), "lowercase pitch letters count");
    }

    #[test]
    fn test_prompt_arrival_clears_feedback_and_marking() {
        let now = Instant::now();
        let mut ctrl = KeyPracticeController::new();
        let mut session = SessionState::default();

        let req = ctrl.request_prompt();
        ctrl.on_prompt(
            generation_of(&req),
            Ok::<_, String>(prompt("D", Clef::Treble)),
            WidthTier::Full,
            now,
        );
        let check = ctrl.answer('C').unwrap();
        ctrl.on_answer(
            generation_of(&check),
            Ok::<_, String>(verdict(false, "D", "C")),
            &mut session,
            now,
        );
        assert!(ctrl.feedback.is_some());
        assert_eq!(ctrl.marked, Some(('C', false)));

        let next = ctrl.request_prompt();
        ctrl.on_prompt(
            generation_of(&next),
            Ok::<_, String>(prompt("E", Clef::Bass)),
            WidthTier::Full,
            now,
        );
        assert!(ctrl.feedback.is_none());
        assert!(ctrl.marked.is_none());
        assert_eq!(ctrl.state, PracticeState::AwaitingAnswer);
    }

    #[test]
    fn test_incorrect_feedback_names_both_answers() {
        let now = Instant::now();
        let mut ctrl = KeyPracticeController::new();
        let mut session = SessionState::default();

        let req = ctrl.request_prompt();
        ctrl.on_prompt(
            generation_of(&req),
            Ok::<_, String>(prompt("D", Clef::Treble)),
            WidthTier::Full,
            now,
        );
        let check = ctrl.answer('C').unwrap();
        ctrl.on_answer(
            generation_of(&check),
            Ok::<_, String>(verdict(false, "D", "C")),
            &mut session,
            now,
        );

        let feedback = ctrl.feedback.as_ref().unwrap();
        assert!(!feedback.correct);
        assert!(feedback.details.contains('D'));
        assert!(feedback.details.contains('C'));
        assert_eq!(session.total_attempts, 1);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_auto_advance_issues_exactly_one_request_after_delay() {
        let t0 = Instant::now();
        let mut ctrl = KeyPracticeController::new();
        let mut session = SessionState::default();

        let req = ctrl.request_prompt();
        ctrl.on_prompt(
            generation_of(&req),
            Ok::<_, String>(prompt("D", Clef::Treble)),
            WidthTier::Full,
            t0,
        );
        let check = ctrl.answer('D').unwrap();
        ctrl.on_answer(
            generation_of(&check),
            Ok::<_, String>(verdict(true, "D", "D")),
            &mut session,
            t0,
        );

        assert!(ctrl.tick(t0 + Duration::from_millis(1999)).is_none());
        let advance = ctrl.tick(t0 + AUTO_ADVANCE);
        assert!(matches!(advance, Some(ApiRequest::NewKey { .. })));
        // The deadline is consumed; no second request on later ticks.
        assert!(ctrl.tick(t0 + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_stale_prompt_response_is_discarded() {
        let now = Instant::now();
        let mut ctrl = KeyPracticeController::new();

        let old = ctrl.request_prompt();
        let _new = ctrl.request_prompt();
        ctrl.on_prompt(
            generation_of(&old),
            Ok::<_, String>(prompt("G", Clef::Treble)),
            WidthTier::Full,
            now,
        );
        assert!(ctrl.prompt.is_none(), "stale response must not apply");
        assert_eq!(ctrl.state, PracticeState::Idle);
    }

    #[test]
    fn test_failed_prompt_fetch_stalls_without_retry() {
        let now = Instant::now();
        let mut ctrl = KeyPracticeController::new();
        let req = ctrl.request_prompt();
        ctrl.on_prompt(
            generation_of(&req),
            Err::<Prompt, _>("connection refused"),
            WidthTier::Full,
            now,
        );
        assert!(ctrl.prompt.is_none());
        assert_eq!(ctrl.state, PracticeState::Idle);
        assert!(ctrl.last_error.as_deref().unwrap().contains("refused"));
        assert!(ctrl.tick(now + Duration::from_secs(30)).is_none());
    }

    #[test]
    fn test_session_complete_suppresses_auto_advance() {
        let t0 = Instant::now();
        let mut ctrl = KeyPracticeController::new();
        let mut session = SessionState::default();

        let req = ctrl.request_prompt();
        ctrl.on_prompt(
            generation_of(&req),
            Ok::<_, String>(prompt("D", Clef::Treble)),
            WidthTier::Full,
            t0,
        );
        let check = ctrl.answer('D').unwrap();
        ctrl.on_answer(
            generation_of(&check),
            Ok::<_, String>(verdict(true, "D", "D")),
            &mut session,
            t0,
        );
        ctrl.complete_session();
        assert!(ctrl.tick(t0 + Duration::from_secs(5)).is_none());
        assert!(ctrl.answer('C').is_none(), "input ignored while summary is up");
    }

    #[test]
    fn test_reset_zeroes_session_and_requests_one_prompt() {
        let mut ctrl = KeyPracticeController::new();
        let mut session = SessionState {
            score: 7,
            total_attempts: 10,
            current_progress: 10,
        };
        ctrl.complete_session();

        let request = ctrl.reset(&mut session);
        assert_eq!(session, SessionState::default());
        assert!(!ctrl.session_complete);
        assert!(matches!(request, ApiRequest::NewKey { .. }));
    }
}
