use std::sync::Arc;

use lingo_core::model::{Course, LessonId, UserId, UserProgress};
use lingo_core::traversal::{
    CompletedChallenges, CourseOutline, CourseProgress, LessonButtonState, LessonDetail,
    UnitProgress,
};
use storage::repository::{
    ChallengeProgressRepository, CourseRepository, CurriculumRepository, Storage,
    UserProgressRepository,
};

use crate::error::LearnError;

/// User progress together with the course it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProgressView {
    pub progress: UserProgress,
    /// `None` if the active course was removed after it was selected.
    pub active_course: Option<Course>,
}

/// Everything the learn queries need for one user, read in a single pass.
#[derive(Debug, Clone)]
pub struct LearnSnapshot {
    pub view: UserProgressView,
    pub outline: CourseOutline,
    pub completed: CompletedChallenges,
}

impl LearnSnapshot {
    #[must_use]
    pub fn units(&self) -> Vec<UnitProgress> {
        self.outline.units_with_progress(&self.completed)
    }

    #[must_use]
    pub fn course_progress(&self) -> CourseProgress {
        self.outline.course_progress(&self.completed)
    }

    #[must_use]
    pub fn active_lesson_percentage(&self) -> u8 {
        self.course_progress()
            .active_lesson_id()
            .map_or(0, |id| self.outline.lesson_percentage(id, &self.completed))
    }
}

/// Storage-backed read side of the learn flow.
///
/// All queries are scoped to the user's active course.
#[derive(Clone)]
pub struct LearnService {
    courses: Arc<dyn CourseRepository>,
    curriculum: Arc<dyn CurriculumRepository>,
    user_progress: Arc<dyn UserProgressRepository>,
    challenge_progress: Arc<dyn ChallengeProgressRepository>,
}

impl LearnService {
    #[must_use]
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        curriculum: Arc<dyn CurriculumRepository>,
        user_progress: Arc<dyn UserProgressRepository>,
        challenge_progress: Arc<dyn ChallengeProgressRepository>,
    ) -> Self {
        Self {
            courses,
            curriculum,
            user_progress,
            challenge_progress,
        }
    }

    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        Self::new(
            Arc::clone(&storage.courses),
            Arc::clone(&storage.curriculum),
            Arc::clone(&storage.user_progress),
            Arc::clone(&storage.challenge_progress),
        )
    }

    /// The user's progress and active course, or `None` before the first
    /// course selection.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::Storage` if repository access fails.
    pub async fn get_user_progress(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProgressView>, LearnError> {
        let Some(progress) = self.user_progress.get_user_progress(user).await? else {
            return Ok(None);
        };
        let active_course = match progress.active_course_id() {
            Some(id) => self.courses.get_course(id).await?,
            None => None,
        };
        Ok(Some(UserProgressView {
            progress,
            active_course,
        }))
    }

    /// Load the active course tree and the user's completion set.
    ///
    /// Returns `None` when the user has no progress or no active course.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::Storage` if repository access fails.
    pub async fn snapshot(&self, user: &UserId) -> Result<Option<LearnSnapshot>, LearnError> {
        let Some(view) = self.get_user_progress(user).await? else {
            return Ok(None);
        };
        let Some(course_id) = view.active_course.as_ref().map(Course::id) else {
            return Ok(None);
        };

        let units = self.curriculum.units_for_course(course_id).await?;
        let lessons = self.curriculum.lessons_for_course(course_id).await?;
        let challenges = self.curriculum.challenges_for_course(course_id).await?;
        let outline = CourseOutline::new(units, lessons, challenges);

        let records = self
            .challenge_progress
            .progress_for_challenges(user, &outline.challenge_ids())
            .await?;
        let completed = CompletedChallenges::from_records(user, &records);

        tracing::debug!(
            user = %user,
            course = %course_id,
            completed = completed.len(),
            "loaded learn snapshot"
        );

        Ok(Some(LearnSnapshot {
            view,
            outline,
            completed,
        }))
    }

    /// Units of the active course with per-lesson completion; empty without
    /// an active course.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::Storage` if repository access fails.
    pub async fn get_units(&self, user: &UserId) -> Result<Vec<UnitProgress>, LearnError> {
        Ok(self
            .snapshot(user)
            .await?
            .map(|snapshot| snapshot.units())
            .unwrap_or_default())
    }

    /// The active lesson of the active course. `None` without an active course.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::Storage` if repository access fails.
    pub async fn get_course_progress(
        &self,
        user: &UserId,
    ) -> Result<Option<CourseProgress>, LearnError> {
        Ok(self
            .snapshot(user)
            .await?
            .map(|snapshot| snapshot.course_progress()))
    }

    /// A lesson with its challenges, options and completion flags.
    ///
    /// Without `lesson_id` the active lesson is used.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::Storage` if repository access fails.
    pub async fn get_lesson(
        &self,
        user: &UserId,
        lesson_id: Option<LessonId>,
    ) -> Result<Option<LessonDetail>, LearnError> {
        let Some(snapshot) = self.snapshot(user).await? else {
            return Ok(None);
        };
        self.lesson_from_snapshot(&snapshot, lesson_id).await
    }

    pub(crate) async fn lesson_from_snapshot(
        &self,
        snapshot: &LearnSnapshot,
        lesson_id: Option<LessonId>,
    ) -> Result<Option<LessonDetail>, LearnError> {
        let Some(lesson_id) =
            lesson_id.or_else(|| snapshot.course_progress().active_lesson_id())
        else {
            return Ok(None);
        };
        if snapshot.outline.find_lesson(lesson_id).is_none() {
            return Ok(None);
        }

        let challenge_ids: Vec<_> = snapshot
            .outline
            .challenges_in(lesson_id)
            .iter()
            .map(|c| c.id())
            .collect();
        let options = self
            .curriculum
            .options_for_challenges(&challenge_ids)
            .await?;

        Ok(snapshot
            .outline
            .lesson_detail(lesson_id, &options, &snapshot.completed))
    }

    /// Rounded completion of the active lesson, 0 when there is none.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::Storage` if repository access fails.
    pub async fn get_lesson_percentage(&self, user: &UserId) -> Result<u8, LearnError> {
        Ok(self
            .snapshot(user)
            .await?
            .map_or(0, |snapshot| snapshot.active_lesson_percentage()))
    }
}

/// Button state for every lesson, grouped like `units`.
#[must_use]
pub fn lesson_states(
    units: &[UnitProgress],
    course_progress: &CourseProgress,
    active_percentage: u8,
) -> Vec<Vec<LessonButtonState>> {
    let active = course_progress.active_lesson_id();
    units
        .iter()
        .map(|unit| {
            unit.lessons
                .iter()
                .map(|status| LessonButtonState::for_lesson(status, active, active_percentage))
                .collect()
        })
        .collect()
}
