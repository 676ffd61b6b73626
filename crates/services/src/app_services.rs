use std::sync::Arc;

use lingo_core::model::UserId;
use storage::repository::Storage;

use crate::Clock;
use crate::course_service::CourseService;
use crate::error::AppServicesError;
use crate::learn::{LearnScope, LearnService};
use crate::progress_service::ProgressService;
use crate::quiz::QuizLoopService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    courses: Arc<CourseService>,
    learn: Arc<LearnService>,
    progress: Arc<ProgressService>,
    quiz: Arc<QuizLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let courses = Arc::new(CourseService::new(Arc::clone(&storage.courses)));
        let learn = Arc::new(LearnService::from_storage(storage));
        let progress = Arc::new(ProgressService::new(clock, storage));
        let quiz = Arc::new(QuizLoopService::new(
            Arc::clone(&learn),
            Arc::clone(&progress),
        ));

        Self {
            courses,
            learn,
            progress,
            quiz,
        }
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn learn(&self) -> Arc<LearnService> {
        Arc::clone(&self.learn)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz)
    }

    /// Fresh memoizing scope for one page render.
    #[must_use]
    pub fn learn_scope(&self, user: UserId) -> LearnScope {
        LearnScope::new(Arc::clone(&self.learn), user)
    }
}
