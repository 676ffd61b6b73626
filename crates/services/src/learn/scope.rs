use std::sync::Arc;

use lingo_core::model::{LessonId, UserId};
use lingo_core::traversal::{CourseProgress, LessonDetail, UnitProgress};
use tokio::sync::OnceCell;

use super::queries::{LearnService, LearnSnapshot, UserProgressView};
use crate::error::LearnError;

/// Per-render view over `LearnService` for one user.
///
/// The snapshot is read from storage at most once; every derived query
/// afterwards is computed from it. Drop the scope after the render so the
/// next one sees fresh data.
pub struct LearnScope {
    service: Arc<LearnService>,
    user: UserId,
    snapshot: OnceCell<Option<LearnSnapshot>>,
    units: OnceCell<Vec<UnitProgress>>,
    course_progress: OnceCell<Option<CourseProgress>>,
}

impl LearnScope {
    #[must_use]
    pub fn new(service: Arc<LearnService>, user: UserId) -> Self {
        Self {
            service,
            user,
            snapshot: OnceCell::new(),
            units: OnceCell::new(),
            course_progress: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn user(&self) -> &UserId {
        &self.user
    }

    async fn snapshot(&self) -> Result<Option<&LearnSnapshot>, LearnError> {
        let snapshot = self
            .snapshot
            .get_or_try_init(|| self.service.snapshot(&self.user))
            .await?;
        Ok(snapshot.as_ref())
    }

    /// Progress plus active course; `None` unless the user has an active course.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::Storage` if the first load fails.
    pub async fn user_progress(&self) -> Result<Option<&UserProgressView>, LearnError> {
        Ok(self.snapshot().await?.map(|snapshot| &snapshot.view))
    }

    /// # Errors
    ///
    /// Returns `LearnError::Storage` if the first load fails.
    pub async fn units(&self) -> Result<&[UnitProgress], LearnError> {
        let units = self
            .units
            .get_or_try_init(|| async {
                Ok::<_, LearnError>(
                    self.snapshot()
                        .await?
                        .map(LearnSnapshot::units)
                        .unwrap_or_default(),
                )
            })
            .await?;
        Ok(units.as_slice())
    }

    /// # Errors
    ///
    /// Returns `LearnError::Storage` if the first load fails.
    pub async fn course_progress(&self) -> Result<Option<&CourseProgress>, LearnError> {
        let progress = self
            .course_progress
            .get_or_try_init(|| async {
                Ok::<_, LearnError>(self.snapshot().await?.map(LearnSnapshot::course_progress))
            })
            .await?;
        Ok(progress.as_ref())
    }

    /// # Errors
    ///
    /// Returns `LearnError::Storage` if the first load fails.
    pub async fn lesson_percentage(&self) -> Result<u8, LearnError> {
        Ok(self
            .snapshot()
            .await?
            .map_or(0, LearnSnapshot::active_lesson_percentage))
    }

    /// Not memoized: lesson pages ask for one lesson per render.
    ///
    /// # Errors
    ///
    /// Returns `LearnError::Storage` if loading fails.
    pub async fn lesson(
        &self,
        lesson_id: Option<LessonId>,
    ) -> Result<Option<LessonDetail>, LearnError> {
        match self.snapshot().await? {
            Some(snapshot) => self.service.lesson_from_snapshot(snapshot, lesson_id).await,
            None => Ok(None),
        }
    }
}
