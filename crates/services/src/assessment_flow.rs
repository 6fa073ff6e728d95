use std::sync::Arc;

use assess_core::Clock;
use assess_core::model::{FailureKind, ScoreResult, Session};
use storage::Storage;

use crate::error::{ApiError, AssessmentError};
use crate::quiz_client::QuizApi;

/// Orchestrates one assessment session end to end.
///
/// The state machine itself lives in `assess_core::model::Session`; this
/// service performs the side effects between transitions: fetching questions,
/// submitting answers, and keeping the result store in lockstep with the
/// in-memory session. Once a session is `Scored`, the store holds the same
/// result.
#[derive(Clone)]
pub struct AssessmentFlow {
    clock: Clock,
    api: Arc<dyn QuizApi>,
    storage: Storage,
}

impl AssessmentFlow {
    #[must_use]
    pub fn new(clock: Clock, api: Arc<dyn QuizApi>, storage: Storage) -> Self {
        Self {
            clock,
            api,
            storage,
        }
    }

    /// A fresh session in `Loading`.
    #[must_use]
    pub fn new_session(&self) -> Session {
        Session::new(self.clock.now())
    }

    /// Fetch the question set and move the session into `Answering`.
    ///
    /// On fetch failure the session ends up `Failed` with the matching kind
    /// and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Api` for fetch failures, or
    /// `AssessmentError::State` if the session is not `Loading`.
    pub async fn load_questions(&self, session: &mut Session) -> Result<(), AssessmentError> {
        match self.api.fetch_questions().await {
            Ok(questions) => {
                session.questions_loaded(questions)?;
                Ok(())
            }
            Err(err) => {
                session.fail(failure_kind(&err))?;
                Err(err.into())
            }
        }
    }

    /// Submit the collected answers and score the session.
    ///
    /// Incomplete answer sets are rejected locally before any network call;
    /// the session stays `Answering`. On success the previous cached result
    /// is cleared and the fresh one saved *before* the session transitions to
    /// `Scored`, so store and session never diverge. A 401 clears the stored
    /// token and leaves the session `Failed` with an auth kind so the caller
    /// routes through re-login.
    ///
    /// # Errors
    ///
    /// `AssessmentError::State` for local precondition failures,
    /// `NotAuthenticated` when no token is stored, `Api` for backend
    /// failures, `Storage` when persisting the result fails (the session is
    /// then `Failed`, not `Scored`).
    pub async fn submit(&self, session: &mut Session) -> Result<ScoreResult, AssessmentError> {
        session.begin_submit()?;

        let token = match self.storage.token.load().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                session.fail(FailureKind::Auth)?;
                return Err(AssessmentError::NotAuthenticated);
            }
            Err(err) => {
                session.fail(FailureKind::Storage)?;
                return Err(err.into());
            }
        };

        let result = match self.api.submit_answers(session.answers(), &token).await {
            Ok(result) => result,
            Err(err) => {
                session.fail(failure_kind(&err))?;
                if matches!(err, ApiError::Auth) {
                    self.storage.token.clear().await?;
                }
                return Err(err.into());
            }
        };

        // Stale keys go first so a failed write can never leave a mix of old
        // and new entries that still parses.
        if let Err(err) = self.persist(&result).await {
            session.fail(FailureKind::Storage)?;
            return Err(err.into());
        }

        session.complete_scored(result.clone(), self.clock.now())?;
        Ok(result)
    }

    /// Throw the session away and start over from `Loading`.
    ///
    /// # Errors
    ///
    /// Same as [`AssessmentFlow::load_questions`].
    pub async fn restart(&self, session: &mut Session) -> Result<(), AssessmentError> {
        *session = self.new_session();
        self.load_questions(session).await
    }

    async fn persist(&self, result: &ScoreResult) -> Result<(), storage::StorageError> {
        self.storage.results.clear().await?;
        self.storage.results.save(result).await
    }
}

fn failure_kind(err: &ApiError) -> FailureKind {
    match err {
        ApiError::Network(_) => FailureKind::Network,
        ApiError::Auth => FailureKind::Auth,
        ApiError::Server { .. } | ApiError::Validation(_) => FailureKind::Server,
    }
}
