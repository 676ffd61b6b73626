mod challenge;
mod course;
mod ids;
mod progress;
mod unit;

pub use ids::{
    ChallengeId, ChallengeOptionId, ChallengeProgressId, CourseId, LessonId, ParseIdError,
    UnitId, UserId,
};

pub use challenge::{Challenge, ChallengeError, ChallengeKind, ChallengeOption};
pub use course::{Course, CourseError};
pub use progress::{
    ChallengeProgress, DEFAULT_USER_IMAGE, DEFAULT_USER_NAME, MAX_HEARTS, POINTS_PER_CHALLENGE,
    POINTS_TO_REFILL, UserProgress, UserProgressError,
};
pub use unit::{Lesson, LessonError, Unit, UnitError};
