use std::sync::Arc;

use lingo_core::model::{LessonId, UserId};

use super::session::{QuizAnswerResult, QuizSession};
use crate::error::QuizError;
use crate::learn::LearnService;
use crate::progress_service::{HeartsOutcome, ProgressService};

/// Orchestrates quiz start and persisted answering.
#[derive(Clone)]
pub struct QuizLoopService {
    learn: Arc<LearnService>,
    progress: Arc<ProgressService>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(learn: Arc<LearnService>, progress: Arc<ProgressService>) -> Self {
        Self { learn, progress }
    }

    /// Start a quiz for `lesson_id`, or for the active lesson when `None`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::LessonNotFound` when the user has no active course
    /// or the lesson is not part of it, `QuizError::EmptyLesson` for a lesson
    /// without challenges, or `QuizError::Learn` on storage failures.
    pub async fn start(
        &self,
        user: &UserId,
        lesson_id: Option<LessonId>,
    ) -> Result<QuizSession, QuizError> {
        let snapshot = self
            .learn
            .snapshot(user)
            .await?
            .ok_or(QuizError::LessonNotFound)?;
        let lesson = self
            .learn
            .lesson_from_snapshot(&snapshot, lesson_id)
            .await?
            .ok_or(QuizError::LessonNotFound)?;

        let session = QuizSession::new(lesson, snapshot.view.progress.hearts())?;
        tracing::debug!(user = %user, ?session, "quiz started");
        Ok(session)
    }

    /// Check the pending selection and persist the outcome.
    ///
    /// The session is left untouched when persistence rejects the answer,
    /// e.g. with `HeartsDepleted`.
    ///
    /// # Errors
    ///
    /// Returns selection errors from the session or `QuizError::Progress`.
    pub async fn check(
        &self,
        user: &UserId,
        session: &mut QuizSession,
    ) -> Result<QuizAnswerResult, QuizError> {
        let (challenge_id, correct) = session.evaluate()?;

        let hearts = if correct {
            self.progress
                .complete_challenge(user, challenge_id)
                .await?
                .progress
                .hearts()
        } else {
            match self.progress.reduce_hearts(user, challenge_id).await? {
                HeartsOutcome::Practice => session.hearts(),
                HeartsOutcome::Lost(progress) => progress.hearts(),
            }
        };

        session.record_answer(correct, hearts)
    }
}
