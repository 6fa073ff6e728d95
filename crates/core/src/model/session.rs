use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::{AnswerSet, Question, QuestionId, ScoreResult};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("transition not allowed from {from} state")]
    InvalidTransition { from: &'static str },

    #[error("{missing} of {total} questions still unanswered")]
    IncompleteAnswers { missing: usize, total: usize },

    #[error("a submission is already in flight")]
    SubmissionInFlight,
}

/// What went wrong with the last attempt.
///
/// Callers route recovery on this: auth failures go back through login,
/// everything else is retryable in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Server,
    Auth,
    Storage,
}

impl FailureKind {
    #[must_use]
    pub fn requires_reauth(&self) -> bool {
        matches!(self, FailureKind::Auth)
    }
}

/// Explicit state tag for one assessment attempt.
///
/// Replaces the loose loading/error/submitted flag combinations a UI would
/// otherwise juggle; impossible combinations cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Question fetch in flight.
    Loading,
    /// Questions present, answers being collected.
    Answering,
    /// Submission in flight; acts as a mutex against double submits.
    Submitting,
    /// Terminal success; a score result is present and durably cached.
    Scored,
    /// Terminal per attempt; recovery re-enters `Loading` or `Answering`.
    Failed,
}

impl SessionState {
    #[must_use]
    fn name(self) -> &'static str {
        match self {
            SessionState::Loading => "loading",
            SessionState::Answering => "answering",
            SessionState::Submitting => "submitting",
            SessionState::Scored => "scored",
            SessionState::Failed => "failed",
        }
    }
}

/// One assessment attempt from question load to optional export.
///
/// Pure state: all transitions are synchronous and guarded here, while the
/// services layer performs the network and persistence side effects between
/// them. A rejected transition never changes state.
pub struct Session {
    state: SessionState,
    questions: Vec<Question>,
    answers: AnswerSet,
    result: Option<ScoreResult>,
    failure: Option<FailureKind>,
    started_at: DateTime<Utc>,
    scored_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A fresh session in `Loading`, stamped by the services layer clock.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            state: SessionState::Loading,
            questions: Vec::new(),
            answers: AnswerSet::new(),
            result: None,
            failure: None,
            started_at,
            scored_at: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn result(&self) -> Option<&ScoreResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn scored_at(&self) -> Option<DateTime<Utc>> {
        self.scored_at
    }

    #[must_use]
    pub fn is_scored(&self) -> bool {
        matches!(self.state, SessionState::Scored)
    }

    /// Number of questions still unanswered.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.missing_for(&self.questions).len()
    }

    /// `Loading -> Answering` with the fetched question set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the session is `Loading`.
    pub fn questions_loaded(&mut self, questions: Vec<Question>) -> Result<(), SessionStateError> {
        if self.state != SessionState::Loading {
            return Err(self.invalid());
        }
        self.questions = questions;
        self.state = SessionState::Answering;
        Ok(())
    }

    /// Record one answer while in `Answering`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` in any other state.
    pub fn record_answer(&mut self, id: QuestionId, value: bool) -> Result<(), SessionStateError> {
        if self.state != SessionState::Answering {
            return Err(self.invalid());
        }
        self.answers.record(id, value);
        Ok(())
    }

    /// `Answering -> Submitting`, gated on a complete answer set.
    ///
    /// The caller must not touch the network when this fails: an incomplete
    /// set is rejected locally and the state stays `Answering`.
    ///
    /// # Errors
    ///
    /// `SubmissionInFlight` if already `Submitting`, `IncompleteAnswers` if
    /// any question is unanswered, `InvalidTransition` otherwise.
    pub fn begin_submit(&mut self) -> Result<(), SessionStateError> {
        match self.state {
            SessionState::Submitting => return Err(SessionStateError::SubmissionInFlight),
            SessionState::Answering => {}
            _ => return Err(self.invalid()),
        }
        if !self.answers.is_complete_for(&self.questions) {
            return Err(SessionStateError::IncompleteAnswers {
                missing: self.remaining(),
                total: self.questions.len(),
            });
        }
        self.state = SessionState::Submitting;
        Ok(())
    }

    /// `Submitting -> Scored`.
    ///
    /// The services layer persists `result` *before* calling this, so a
    /// `Scored` session is always backed by the result store.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the session is `Submitting`.
    pub fn complete_scored(
        &mut self,
        result: ScoreResult,
        scored_at: DateTime<Utc>,
    ) -> Result<(), SessionStateError> {
        if self.state != SessionState::Submitting {
            return Err(self.invalid());
        }
        self.result = Some(result);
        self.scored_at = Some(scored_at);
        self.failure = None;
        self.state = SessionState::Scored;
        Ok(())
    }

    /// `Loading|Submitting -> Failed`, recording why.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from any other state.
    pub fn fail(&mut self, kind: FailureKind) -> Result<(), SessionStateError> {
        match self.state {
            SessionState::Loading | SessionState::Submitting => {
                self.failure = Some(kind);
                self.state = SessionState::Failed;
                Ok(())
            }
            _ => Err(self.invalid()),
        }
    }

    /// `Failed -> Answering`, keeping questions and collected answers.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the session is `Failed`.
    pub fn retry_answering(&mut self) -> Result<(), SessionStateError> {
        if self.state != SessionState::Failed {
            return Err(self.invalid());
        }
        self.failure = None;
        self.state = SessionState::Answering;
        Ok(())
    }

    /// `Failed -> Loading`, discarding questions and answers for a refetch.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the session is `Failed`.
    pub fn retry_loading(&mut self) -> Result<(), SessionStateError> {
        if self.state != SessionState::Failed {
            return Err(self.invalid());
        }
        self.questions.clear();
        self.answers = AnswerSet::new();
        self.failure = None;
        self.state = SessionState::Loading;
        Ok(())
    }

    fn invalid(&self) -> SessionStateError {
        SessionStateError::InvalidTransition {
            from: self.state.name(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("questions_len", &self.questions.len())
            .field("answered", &self.answers.len())
            .field("has_result", &self.result.is_some())
            .field("failure", &self.failure)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Recommendation, RiskScore};
    use crate::time::fixed_now;

    fn two_questions() -> Vec<Question> {
        vec![
            Question::new(QuestionId::new("q1"), "A"),
            Question::new(QuestionId::new("q2"), "B"),
        ]
    }

    fn sample_result() -> ScoreResult {
        ScoreResult::new(
            RiskScore::new(72).unwrap(),
            vec![Recommendation::new("Enable MFA")],
            vec!["Cryptographic Failures".to_owned()],
        )
    }

    fn answering_session() -> Session {
        let mut session = Session::new(fixed_now());
        session.questions_loaded(two_questions()).unwrap();
        session
    }

    #[test]
    fn starts_loading_and_moves_to_answering() {
        let mut session = Session::new(fixed_now());
        assert_eq!(session.state(), SessionState::Loading);

        session.questions_loaded(two_questions()).unwrap();
        assert_eq!(session.state(), SessionState::Answering);
        assert_eq!(session.questions().len(), 2);
    }

    #[test]
    fn answers_only_accepted_while_answering() {
        let mut session = Session::new(fixed_now());
        let err = session
            .record_answer(QuestionId::new("q1"), true)
            .unwrap_err();
        assert!(matches!(err, SessionStateError::InvalidTransition { .. }));
    }

    #[test]
    fn incomplete_answers_block_submission_and_keep_state() {
        let mut session = answering_session();
        session.record_answer(QuestionId::new("q1"), true).unwrap();

        let err = session.begin_submit().unwrap_err();
        assert_eq!(
            err,
            SessionStateError::IncompleteAnswers {
                missing: 1,
                total: 2
            }
        );
        assert_eq!(session.state(), SessionState::Answering);
    }

    #[test]
    fn complete_answers_enter_submitting_once() {
        let mut session = answering_session();
        session.record_answer(QuestionId::new("q1"), true).unwrap();
        session.record_answer(QuestionId::new("q2"), false).unwrap();

        session.begin_submit().unwrap();
        assert_eq!(session.state(), SessionState::Submitting);

        // Second attempt while in flight is the mutex case.
        let err = session.begin_submit().unwrap_err();
        assert_eq!(err, SessionStateError::SubmissionInFlight);
        assert_eq!(session.state(), SessionState::Submitting);
    }

    #[test]
    fn scoring_completes_the_session() {
        let mut session = answering_session();
        session.record_answer(QuestionId::new("q1"), true).unwrap();
        session.record_answer(QuestionId::new("q2"), false).unwrap();
        session.begin_submit().unwrap();

        session.complete_scored(sample_result(), fixed_now()).unwrap();
        assert!(session.is_scored());
        assert_eq!(session.scored_at(), Some(fixed_now()));
        assert_eq!(
            session.result().unwrap().risk_score().value(),
            72
        );
    }

    #[test]
    fn scored_is_terminal() {
        let mut session = answering_session();
        session.record_answer(QuestionId::new("q1"), true).unwrap();
        session.record_answer(QuestionId::new("q2"), false).unwrap();
        session.begin_submit().unwrap();
        session.complete_scored(sample_result(), fixed_now()).unwrap();

        assert!(session.begin_submit().is_err());
        assert!(session.fail(FailureKind::Network).is_err());
        assert!(session.retry_answering().is_err());
    }

    #[test]
    fn failure_routes_recovery_by_kind() {
        let mut session = answering_session();
        session.record_answer(QuestionId::new("q1"), true).unwrap();
        session.record_answer(QuestionId::new("q2"), false).unwrap();
        session.begin_submit().unwrap();

        session.fail(FailureKind::Auth).unwrap();
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.failure().unwrap().requires_reauth());

        // Retry keeps the already-collected answers.
        session.retry_answering().unwrap();
        assert_eq!(session.state(), SessionState::Answering);
        assert_eq!(session.answers().len(), 2);
        assert!(session.failure().is_none());
    }

    #[test]
    fn retry_loading_discards_collected_state() {
        let mut session = Session::new(fixed_now());
        session.fail(FailureKind::Network).unwrap();

        session.retry_loading().unwrap();
        assert_eq!(session.state(), SessionState::Loading);
        assert!(session.questions().is_empty());
        assert!(session.answers().is_empty());
    }
}
