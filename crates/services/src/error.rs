//! Shared error types for the services crate.

use thiserror::Error;

use lingo_core::model::{ChallengeId, CourseId, LessonId, UserProgressError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CourseService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LearnService` and `LearnScope`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LearnError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("user has not selected a course yet")]
    NoUserProgress,
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error("course {0} has no lessons yet")]
    CourseEmpty(CourseId),
    #[error("challenge {0} not found")]
    ChallengeNotFound(ChallengeId),
    #[error(transparent)]
    Rejected(#[from] UserProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ProgressError {
    /// True when the learner is out of hearts and must refill or practice.
    #[must_use]
    pub fn is_hearts_depleted(&self) -> bool {
        matches!(self, Self::Rejected(UserProgressError::HeartsDepleted))
    }
}

/// Errors emitted by the quiz runner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("lesson not found")]
    LessonNotFound,
    #[error("lesson {0} has no challenges")]
    EmptyLesson(LessonId),
    #[error("quiz already completed")]
    Completed,
    #[error("no option selected")]
    NothingSelected,
    #[error("option does not belong to the current challenge")]
    UnknownOption,
    #[error("answer already checked; continue to the next challenge")]
    AlreadyChecked,
    #[error("current challenge has not been answered correctly yet")]
    NotAnswered,
    #[error(transparent)]
    Learn(#[from] LearnError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
