use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lingo_core::model::{
    Challenge, ChallengeId, ChallengeOption, ChallengeOptionId, ChallengeProgress,
    ChallengeProgressId, Course, CourseId, Lesson, LessonId, Unit, UnitId, UserId, UserProgress,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Courses offered by the application.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist or update a course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Fetch a course by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// All courses ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;

    /// Remove every course together with its units, lessons, challenges,
    /// options and the challenge progress recorded against them.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_all_courses(&self) -> Result<(), StorageError>;
}

/// Units, lessons, challenges and options of a course.
///
/// Listing methods return rows unordered; ordering is a domain concern.
#[async_trait]
pub trait CurriculumRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the parent course is missing.
    async fn upsert_unit(&self, unit: &Unit) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the parent unit is missing.
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the parent lesson is missing.
    async fn upsert_challenge(&self, challenge: &Challenge) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the parent challenge is missing.
    async fn upsert_option(&self, option: &ChallengeOption) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn units_for_course(&self, course_id: CourseId) -> Result<Vec<Unit>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn lessons_for_course(&self, course_id: CourseId) -> Result<Vec<Lesson>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn challenges_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<Challenge>, StorageError>;

    /// Options belonging to any of the given challenges.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn options_for_challenges(
        &self,
        ids: &[ChallengeId],
    ) -> Result<Vec<ChallengeOption>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_challenge(&self, id: ChallengeId) -> Result<Option<Challenge>, StorageError>;
}

/// Per-user hearts, points and active course.
#[async_trait]
pub trait UserProgressRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_user_progress(&self, user: &UserId)
    -> Result<Option<UserProgress>, StorageError>;

    /// Insert or replace the progress row for `progress.user_id()`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the active course does not exist.
    async fn upsert_user_progress(&self, progress: &UserProgress) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_all_user_progress(&self) -> Result<(), StorageError>;
}

/// Attempt records per (user, challenge).
#[async_trait]
pub trait ChallengeProgressRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_challenge_progress(
        &self,
        user: &UserId,
        challenge_id: ChallengeId,
    ) -> Result<Option<ChallengeProgress>, StorageError>;

    /// The user's records for any of the given challenges.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn progress_for_challenges(
        &self,
        user: &UserId,
        ids: &[ChallengeId],
    ) -> Result<Vec<ChallengeProgress>, StorageError>;
}

/// Atomic write path for a correctly answered challenge.
#[async_trait]
pub trait ProgressPersistence: Send + Sync {
    /// Store the updated user progress and mark the user's record for
    /// `challenge_id` completed (inserting it if absent) in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the challenge does not exist, or
    /// other storage errors; nothing is written on failure.
    async fn record_completion(
        &self,
        progress: &UserProgress,
        challenge_id: ChallengeId,
        completed_at: DateTime<Utc>,
    ) -> Result<ChallengeProgress, StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

type Shared<K, V> = Arc<Mutex<HashMap<K, V>>>;

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Shared<CourseId, Course>,
    units: Shared<UnitId, Unit>,
    lessons: Shared<LessonId, Lesson>,
    challenges: Shared<ChallengeId, Challenge>,
    options: Shared<ChallengeOptionId, ChallengeOption>,
    user_progress: Shared<UserId, UserProgress>,
    challenge_progress: Shared<ChallengeProgressId, ChallengeProgress>,
    next_progress_id: Arc<AtomicU64>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_progress_id(&self) -> ChallengeProgressId {
        ChallengeProgressId::new(self.next_progress_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        lock(&self.courses)?.insert(course.id(), course.clone());
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        Ok(lock(&self.courses)?.get(&id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let mut courses: Vec<Course> = lock(&self.courses)?.values().cloned().collect();
        courses.sort_by_key(Course::id);
        Ok(courses)
    }

    async fn delete_all_courses(&self) -> Result<(), StorageError> {
        lock(&self.challenge_progress)?.clear();
        lock(&self.options)?.clear();
        lock(&self.challenges)?.clear();
        lock(&self.lessons)?.clear();
        lock(&self.units)?.clear();
        lock(&self.courses)?.clear();
        Ok(())
    }
}

#[async_trait]
impl CurriculumRepository for InMemoryRepository {
    async fn upsert_unit(&self, unit: &Unit) -> Result<(), StorageError> {
        if !lock(&self.courses)?.contains_key(&unit.course_id()) {
            return Err(StorageError::Conflict);
        }
        lock(&self.units)?.insert(unit.id(), unit.clone());
        Ok(())
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        if !lock(&self.units)?.contains_key(&lesson.unit_id()) {
            return Err(StorageError::Conflict);
        }
        lock(&self.lessons)?.insert(lesson.id(), lesson.clone());
        Ok(())
    }

    async fn upsert_challenge(&self, challenge: &Challenge) -> Result<(), StorageError> {
        if !lock(&self.lessons)?.contains_key(&challenge.lesson_id()) {
            return Err(StorageError::Conflict);
        }
        lock(&self.challenges)?.insert(challenge.id(), challenge.clone());
        Ok(())
    }

    async fn upsert_option(&self, option: &ChallengeOption) -> Result<(), StorageError> {
        if !lock(&self.challenges)?.contains_key(&option.challenge_id()) {
            return Err(StorageError::Conflict);
        }
        lock(&self.options)?.insert(option.id(), option.clone());
        Ok(())
    }

    async fn units_for_course(&self, course_id: CourseId) -> Result<Vec<Unit>, StorageError> {
        Ok(lock(&self.units)?
            .values()
            .filter(|unit| unit.course_id() == course_id)
            .cloned()
            .collect())
    }

    async fn lessons_for_course(&self, course_id: CourseId) -> Result<Vec<Lesson>, StorageError> {
        let units = lock(&self.units)?;
        Ok(lock(&self.lessons)?
            .values()
            .filter(|lesson| {
                units
                    .get(&lesson.unit_id())
                    .is_some_and(|unit| unit.course_id() == course_id)
            })
            .cloned()
            .collect())
    }

    async fn challenges_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<Challenge>, StorageError> {
        let units = lock(&self.units)?;
        let lessons = lock(&self.lessons)?;
        Ok(lock(&self.challenges)?
            .values()
            .filter(|challenge| {
                lessons
                    .get(&challenge.lesson_id())
                    .and_then(|lesson| units.get(&lesson.unit_id()))
                    .is_some_and(|unit| unit.course_id() == course_id)
            })
            .cloned()
            .collect())
    }

    async fn options_for_challenges(
        &self,
        ids: &[ChallengeId],
    ) -> Result<Vec<ChallengeOption>, StorageError> {
        Ok(lock(&self.options)?
            .values()
            .filter(|option| ids.contains(&option.challenge_id()))
            .cloned()
            .collect())
    }

    async fn get_challenge(&self, id: ChallengeId) -> Result<Option<Challenge>, StorageError> {
        Ok(lock(&self.challenges)?.get(&id).cloned())
    }
}

#[async_trait]
impl UserProgressRepository for InMemoryRepository {
    async fn get_user_progress(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProgress>, StorageError> {
        Ok(lock(&self.user_progress)?.get(user).cloned())
    }

    async fn upsert_user_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        if let Some(course_id) = progress.active_course_id() {
            if !lock(&self.courses)?.contains_key(&course_id) {
                return Err(StorageError::Conflict);
            }
        }
        lock(&self.user_progress)?.insert(progress.user_id().clone(), progress.clone());
        Ok(())
    }

    async fn delete_all_user_progress(&self) -> Result<(), StorageError> {
        lock(&self.user_progress)?.clear();
        lock(&self.challenge_progress)?.clear();
        Ok(())
    }
}

#[async_trait]
impl ChallengeProgressRepository for InMemoryRepository {
    async fn get_challenge_progress(
        &self,
        user: &UserId,
        challenge_id: ChallengeId,
    ) -> Result<Option<ChallengeProgress>, StorageError> {
        Ok(lock(&self.challenge_progress)?
            .values()
            .find(|record| &record.user_id == user && record.challenge_id == challenge_id)
            .cloned())
    }

    async fn progress_for_challenges(
        &self,
        user: &UserId,
        ids: &[ChallengeId],
    ) -> Result<Vec<ChallengeProgress>, StorageError> {
        Ok(lock(&self.challenge_progress)?
            .values()
            .filter(|record| &record.user_id == user && ids.contains(&record.challenge_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProgressPersistence for InMemoryRepository {
    async fn record_completion(
        &self,
        progress: &UserProgress,
        challenge_id: ChallengeId,
        completed_at: DateTime<Utc>,
    ) -> Result<ChallengeProgress, StorageError> {
        if !lock(&self.challenges)?.contains_key(&challenge_id) {
            return Err(StorageError::Conflict);
        }

        // Both guards are held so readers never observe half of the write.
        let mut users = lock(&self.user_progress)?;
        let mut records = lock(&self.challenge_progress)?;

        let existing = records
            .values_mut()
            .find(|r| &r.user_id == progress.user_id() && r.challenge_id == challenge_id);
        let record = if let Some(record) = existing {
            record.completed = true;
            record.updated_at = completed_at;
            record.clone()
        } else {
            let record = ChallengeProgress {
                id: self.allocate_progress_id(),
                user_id: progress.user_id().clone(),
                challenge_id,
                completed: true,
                updated_at: completed_at,
            };
            records.insert(record.id, record.clone());
            record
        };

        users.insert(progress.user_id().clone(), progress.clone());
        Ok(record)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub curriculum: Arc<dyn CurriculumRepository>,
    pub user_progress: Arc<dyn UserProgressRepository>,
    pub challenge_progress: Arc<dyn ChallengeProgressRepository>,
    pub progress_writes: Arc<dyn ProgressPersistence>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_backend(InMemoryRepository::new())
    }

    pub(crate) fn from_backend<R>(repo: R) -> Self
    where
        R: CourseRepository
            + CurriculumRepository
            + UserProgressRepository
            + ChallengeProgressRepository
            + ProgressPersistence
            + Clone
            + 'static,
    {
        Self {
            courses: Arc::new(repo.clone()),
            curriculum: Arc::new(repo.clone()),
            user_progress: Arc::new(repo.clone()),
            challenge_progress: Arc::new(repo.clone()),
            progress_writes: Arc::new(repo),
        }
    }
}
