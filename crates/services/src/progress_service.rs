use std::sync::Arc;

use lingo_core::model::{
    ChallengeId, ChallengeProgress, CourseId, UserId, UserProgress, UserProgressError,
};
use lingo_core::traversal::CourseOutline;
use storage::repository::{
    ChallengeProgressRepository, CourseRepository, CurriculumRepository, ProgressPersistence,
    Storage, UserProgressRepository,
};

use crate::Clock;
use crate::error::ProgressError;

/// Outcome of a correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeCompletion {
    pub progress: UserProgress,
    pub record: ChallengeProgress,
    /// The challenge had been attempted before.
    pub practice: bool,
}

/// Outcome of a wrong answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartsOutcome {
    /// Practising an already attempted challenge never costs hearts.
    Practice,
    Lost(UserProgress),
}

/// Write side of learner progress: course selection, challenge results and
/// hearts.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    curriculum: Arc<dyn CurriculumRepository>,
    user_progress: Arc<dyn UserProgressRepository>,
    challenge_progress: Arc<dyn ChallengeProgressRepository>,
    writes: Arc<dyn ProgressPersistence>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, storage: &Storage) -> Self {
        Self {
            clock,
            courses: Arc::clone(&storage.courses),
            curriculum: Arc::clone(&storage.curriculum),
            user_progress: Arc::clone(&storage.user_progress),
            challenge_progress: Arc::clone(&storage.challenge_progress),
            writes: Arc::clone(&storage.progress_writes),
        }
    }

    async fn require_progress(&self, user: &UserId) -> Result<UserProgress, ProgressError> {
        self.user_progress
            .get_user_progress(user)
            .await?
            .ok_or(ProgressError::NoUserProgress)
    }

    async fn require_challenge(&self, challenge_id: ChallengeId) -> Result<(), ProgressError> {
        match self.curriculum.get_challenge(challenge_id).await? {
            Some(_) => Ok(()),
            None => Err(ProgressError::ChallengeNotFound(challenge_id)),
        }
    }

    async fn is_practice(
        &self,
        user: &UserId,
        challenge_id: ChallengeId,
    ) -> Result<bool, ProgressError> {
        Ok(self
            .challenge_progress
            .get_challenge_progress(user, challenge_id)
            .await?
            .is_some())
    }

    /// Make `course_id` the user's active course, creating their progress on
    /// first use. Hearts and points carry over between courses.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::CourseNotFound` for an unknown course,
    /// `ProgressError::CourseEmpty` when it has no lessons yet, or
    /// `ProgressError::Storage` if persistence fails.
    pub async fn select_course(
        &self,
        user: &UserId,
        course_id: CourseId,
        user_name: Option<&str>,
        user_image_src: Option<&str>,
    ) -> Result<UserProgress, ProgressError> {
        if self.courses.get_course(course_id).await?.is_none() {
            tracing::warn!(course = %course_id, "select_course: unknown course");
            return Err(ProgressError::CourseNotFound(course_id));
        }

        let outline = CourseOutline::new(
            self.curriculum.units_for_course(course_id).await?,
            self.curriculum.lessons_for_course(course_id).await?,
            Vec::new(),
        );
        if !outline.has_lessons() {
            tracing::warn!(course = %course_id, "select_course: course has no lessons");
            return Err(ProgressError::CourseEmpty(course_id));
        }

        let progress = match self.user_progress.get_user_progress(user).await? {
            Some(mut existing) => {
                existing.switch_course(course_id, user_name, user_image_src);
                existing
            }
            None => UserProgress::start(user.clone(), user_name, user_image_src, course_id),
        };
        self.user_progress.upsert_user_progress(&progress).await?;

        tracing::info!(user = %user, course = %course_id, "selected course");
        Ok(progress)
    }

    /// Record a correct answer.
    ///
    /// A first attempt awards points; practice on an already attempted
    /// challenge also restores a heart.
    ///
    /// # Errors
    ///
    /// Returns `NoUserProgress`, `ChallengeNotFound`, `Rejected(HeartsDepleted)`
    /// for a first attempt without hearts, or `Storage`.
    pub async fn complete_challenge(
        &self,
        user: &UserId,
        challenge_id: ChallengeId,
    ) -> Result<ChallengeCompletion, ProgressError> {
        let mut progress = self.require_progress(user).await?;
        self.require_challenge(challenge_id).await?;
        let practice = self.is_practice(user, challenge_id).await?;

        if !progress.can_attempt(practice) {
            tracing::warn!(user = %user, challenge = %challenge_id, "no hearts left");
            return Err(UserProgressError::HeartsDepleted.into());
        }

        progress.reward_challenge(practice);
        let record = self
            .writes
            .record_completion(&progress, challenge_id, self.clock.now())
            .await?;

        tracing::info!(
            user = %user,
            challenge = %challenge_id,
            practice,
            hearts = progress.hearts(),
            points = progress.points(),
            "challenge completed"
        );
        Ok(ChallengeCompletion {
            progress,
            record,
            practice,
        })
    }

    /// Record a wrong answer.
    ///
    /// # Errors
    ///
    /// Returns `NoUserProgress`, `ChallengeNotFound`, `Rejected(HeartsDepleted)`
    /// when no hearts are left, or `Storage`.
    pub async fn reduce_hearts(
        &self,
        user: &UserId,
        challenge_id: ChallengeId,
    ) -> Result<HeartsOutcome, ProgressError> {
        let mut progress = self.require_progress(user).await?;
        self.require_challenge(challenge_id).await?;

        if self.is_practice(user, challenge_id).await? {
            tracing::debug!(user = %user, challenge = %challenge_id, "practice miss");
            return Ok(HeartsOutcome::Practice);
        }

        progress.lose_heart().inspect_err(|_| {
            tracing::warn!(user = %user, challenge = %challenge_id, "no hearts left");
        })?;
        self.user_progress.upsert_user_progress(&progress).await?;

        tracing::info!(user = %user, hearts = progress.hearts(), "heart lost");
        Ok(HeartsOutcome::Lost(progress))
    }

    /// Spend points to refill hearts.
    ///
    /// # Errors
    ///
    /// Returns `NoUserProgress`, `Rejected(HeartsFull)`,
    /// `Rejected(NotEnoughPoints)`, or `Storage`.
    pub async fn refill_hearts(&self, user: &UserId) -> Result<UserProgress, ProgressError> {
        let mut progress = self.require_progress(user).await?;
        progress.refill_hearts().inspect_err(|err| {
            tracing::warn!(user = %user, %err, "refill rejected");
        })?;
        self.user_progress.upsert_user_progress(&progress).await?;

        tracing::info!(user = %user, points = progress.points(), "hearts refilled");
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::model::{Course, MAX_HEARTS, POINTS_PER_CHALLENGE, POINTS_TO_REFILL};
    use lingo_core::time::fixed_clock;
    use storage::seed::seed_sample_content;

    async fn service() -> (ProgressService, Storage) {
        let storage = Storage::in_memory();
        seed_sample_content(&storage).await.unwrap();
        (ProgressService::new(fixed_clock(), &storage), storage)
    }

    fn user() -> UserId {
        UserId::new("user_1").unwrap()
    }

    #[tokio::test]
    async fn select_course_creates_progress_with_full_hearts() {
        let (service, _) = service().await;
        let progress = service
            .select_course(&user(), CourseId::new(1), Some("Ana"), None)
            .await
            .unwrap();
        assert_eq!(progress.hearts(), MAX_HEARTS);
        assert_eq!(progress.points(), 0);
        assert_eq!(progress.user_name(), "Ana");
        assert_eq!(progress.active_course_id(), Some(CourseId::new(1)));
    }

    #[tokio::test]
    async fn select_course_rejects_unknown_and_empty_courses() {
        let (service, _) = service().await;
        let err = service
            .select_course(&user(), CourseId::new(99), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::CourseNotFound(id) if id == CourseId::new(99)));

        let err = service
            .select_course(&user(), CourseId::new(2), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::CourseEmpty(_)));
    }

    #[tokio::test]
    async fn switching_course_keeps_points() {
        let (service, storage) = service().await;
        service
            .select_course(&user(), CourseId::new(1), None, None)
            .await
            .unwrap();
        service
            .complete_challenge(&user(), ChallengeId::new(1))
            .await
            .unwrap();

        // Give Italian a lesson so it can be selected.
        let italian = Course::new(CourseId::new(2), "Italian", "/it.svg").unwrap();
        storage.courses.upsert_course(&italian).await.unwrap();
        let unit = lingo_core::model::Unit::new(
            lingo_core::model::UnitId::new(10),
            italian.id(),
            "Unit 1",
            "Basics",
            1,
        )
        .unwrap();
        storage.curriculum.upsert_unit(&unit).await.unwrap();
        let lesson = lingo_core::model::Lesson::new(
            lingo_core::model::LessonId::new(10),
            unit.id(),
            "Nouns",
            1,
        )
        .unwrap();
        storage.curriculum.upsert_lesson(&lesson).await.unwrap();

        let progress = service
            .select_course(&user(), italian.id(), None, None)
            .await
            .unwrap();
        assert_eq!(progress.active_course_id(), Some(italian.id()));
        assert_eq!(progress.points(), POINTS_PER_CHALLENGE);
    }

    #[tokio::test]
    async fn complete_challenge_requires_progress_and_challenge() {
        let (service, _) = service().await;
        let err = service
            .complete_challenge(&user(), ChallengeId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::NoUserProgress));

        service
            .select_course(&user(), CourseId::new(1), None, None)
            .await
            .unwrap();
        let err = service
            .complete_challenge(&user(), ChallengeId::new(404))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::ChallengeNotFound(_)));
    }

    #[tokio::test]
    async fn first_attempt_awards_points_and_practice_restores_heart() {
        let (service, _) = service().await;
        service
            .select_course(&user(), CourseId::new(1), None, None)
            .await
            .unwrap();

        let HeartsOutcome::Lost(_) = service
            .reduce_hearts(&user(), ChallengeId::new(2))
            .await
            .unwrap()
        else {
            panic!("first miss costs a heart");
        };

        let first = service
            .complete_challenge(&user(), ChallengeId::new(1))
            .await
            .unwrap();
        assert!(!first.practice);
        assert_eq!(first.progress.points(), POINTS_PER_CHALLENGE);
        assert_eq!(first.progress.hearts(), MAX_HEARTS - 1);

        let again = service
            .complete_challenge(&user(), ChallengeId::new(1))
            .await
            .unwrap();
        assert!(again.practice);
        assert_eq!(again.progress.points(), 2 * POINTS_PER_CHALLENGE);
        assert_eq!(again.progress.hearts(), MAX_HEARTS);
        assert_eq!(first.record.id, again.record.id);
    }

    #[tokio::test]
    async fn out_of_hearts_blocks_new_challenges_but_not_practice() {
        let (service, _) = service().await;
        service
            .select_course(&user(), CourseId::new(1), None, None)
            .await
            .unwrap();
        service
            .complete_challenge(&user(), ChallengeId::new(1))
            .await
            .unwrap();

        for _ in 0..MAX_HEARTS {
            service
                .reduce_hearts(&user(), ChallengeId::new(2))
                .await
                .unwrap();
        }
        let err = service
            .reduce_hearts(&user(), ChallengeId::new(2))
            .await
            .unwrap_err();
        assert!(err.is_hearts_depleted());

        let err = service
            .complete_challenge(&user(), ChallengeId::new(2))
            .await
            .unwrap_err();
        assert!(err.is_hearts_depleted());

        let outcome = service
            .reduce_hearts(&user(), ChallengeId::new(1))
            .await
            .unwrap();
        assert_eq!(outcome, HeartsOutcome::Practice);

        let practice = service
            .complete_challenge(&user(), ChallengeId::new(1))
            .await
            .unwrap();
        assert_eq!(practice.progress.hearts(), 1);
    }

    #[tokio::test]
    async fn refill_spends_points() {
        let (service, _) = service().await;
        service
            .select_course(&user(), CourseId::new(1), None, None)
            .await
            .unwrap();

        let err = service.refill_hearts(&user()).await.unwrap_err();
        assert!(matches!(
            err,
            ProgressError::Rejected(UserProgressError::HeartsFull)
        ));

        service
            .reduce_hearts(&user(), ChallengeId::new(1))
            .await
            .unwrap();
        let err = service.refill_hearts(&user()).await.unwrap_err();
        assert!(matches!(
            err,
            ProgressError::Rejected(UserProgressError::NotEnoughPoints { .. })
        ));

        service
            .complete_challenge(&user(), ChallengeId::new(2))
            .await
            .unwrap();
        let refilled = service.refill_hearts(&user()).await.unwrap();
        assert_eq!(refilled.hearts(), MAX_HEARTS);
        assert_eq!(refilled.points(), POINTS_PER_CHALLENGE - POINTS_TO_REFILL);
    }
}
