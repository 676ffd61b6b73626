use std::sync::Arc;

use lingo_core::model::{Course, CourseId};
use storage::repository::CourseRepository;

use crate::error::CourseServiceError;

/// Read access to the course catalogue.
#[derive(Clone)]
pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
}

impl CourseService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }

    /// All courses, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn get_courses(&self) -> Result<Vec<Course>, CourseServiceError> {
        let courses = self.courses.list_courses().await?;
        tracing::debug!(count = courses.len(), "loaded courses");
        Ok(courses)
    }

    /// Fetch a course by ID. Returns `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn get_course_by_id(
        &self,
        course_id: CourseId,
    ) -> Result<Option<Course>, CourseServiceError> {
        Ok(self.courses.get_course(course_id).await?)
    }
}
