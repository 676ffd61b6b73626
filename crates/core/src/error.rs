use thiserror::Error;

use crate::model::{
    ChallengeError, CourseError, LessonError, ParseIdError, UnitError, UserProgressError,
};

/// Any validation failure raised by the domain model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Challenge(#[from] ChallengeError),
    #[error(transparent)]
    UserProgress(#[from] UserProgressError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
